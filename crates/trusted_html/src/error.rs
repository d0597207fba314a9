use thiserror::Error;

/// Contract violations surfaced by trusted-value construction.
///
/// Every variant is a programmer or configuration mistake, or a deliberate
/// security rejection. None of them is retried or downgraded internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrustedHtmlError {
    #[error("unknown sanitizer: {id}")]
    UnknownSanitizer { id: String },

    #[error("unsafely_create is not allowed by the configuration")]
    GateClosed,

    #[error("configuration is frozen")]
    RegistryFrozen,

    #[error("interpolation {index} is inserted as markup but is not TrustedHtml")]
    UntrustedMarkup { index: usize },

    #[error("template has {segments} literal segments for {results} interpolations")]
    TemplateShape { segments: usize, results: usize },
}

pub type Result<T> = std::result::Result<T, TrustedHtmlError>;
