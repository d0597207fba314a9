//! Process-wide publication slot for the trusted-markup configuration.
//!
//! The slot is written at most once. Publishing again (for example when two
//! components both initialize the boundary) is a no-op that hands back the
//! configuration that is already live, so every caller sees the same registry
//! and unsafe-create gate.

use std::sync::OnceLock;

use trusted_html::{Configuration, Interpolation, Result, TrustedHtml};

static PUBLISHED: OnceLock<Configuration> = OnceLock::new();

/// Publishes `config` unless a configuration is already published.
///
/// Returns the published configuration either way.
pub fn publish(config: Configuration) -> &'static Configuration {
    let mut installed = false;
    let published = PUBLISHED.get_or_init(|| {
        installed = true;
        config
    });
    if installed {
        log::debug!(target: "trusted_markup.global", "published configuration: {published:?}");
    } else {
        log::debug!(target: "trusted_markup.global", "configuration already published; keeping it");
    }
    published
}

pub fn published() -> Option<&'static Configuration> {
    PUBLISHED.get()
}

/// The published configuration, publishing an open empty one on first use.
pub fn configuration() -> &'static Configuration {
    PUBLISHED.get_or_init(Configuration::new)
}

pub fn escape(raw: &str) -> TrustedHtml {
    TrustedHtml::escape(raw)
}

pub fn sanitize(raw: &str, sanitizer_id: Option<&str>) -> Result<TrustedHtml> {
    TrustedHtml::sanitize(configuration(), raw, sanitizer_id)
}

pub fn register_sanitizer<F>(id: impl Into<String>, sanitizer: F) -> Result<()>
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    configuration().register_sanitizer(id, sanitizer)
}

pub fn unsafely_create(raw: impl Into<String>) -> Result<TrustedHtml> {
    TrustedHtml::unsafely_create(configuration(), raw)
}

pub fn from_template_literal(
    segments: &[&'static str],
    results: &[Interpolation],
) -> Result<TrustedHtml> {
    TrustedHtml::from_template_literal(segments, results)
}

pub fn allow_unsafely_create() -> bool {
    configuration().allow_unsafely_create()
}

pub fn set_allow_unsafely_create(allowed: bool) -> Result<()> {
    configuration().set_allow_unsafely_create(allowed)
}

pub fn freeze_configuration() {
    configuration().freeze();
}
