//! Trusted markup for hosts that inject HTML.
//!
//! Re-exports the `trusted_html` crate API and adds a process-wide publication slot
//! ([`global`]) for applications that want one shared configuration.
//!
//! ```
//! use trusted_markup::{global, trusted_html};
//!
//! global::register_sanitizer("default", |raw| raw.replace("<script>", "")).unwrap();
//! global::freeze_configuration();
//!
//! let comment = global::sanitize("<em>hi</em><script>", None).unwrap();
//! let card = trusted_html!("<div class=\"{}\">{}</div>", "card", comment).unwrap();
//! assert_eq!(card.as_str(), "<div class=\"card\"><em>hi</em></div>");
//! assert!(global::register_sanitizer("late", |raw| raw.to_string()).is_err());
//! ```

pub mod global;

pub use trusted_html::{
    Configuration, ConfigurationBuilder, DEFAULT_SANITIZER, Interpolation, Lifecycle,
    PlaceholderCodec, Result, Sanitizer, TrustedHtml, TrustedHtmlError, config,
    from_template_literal, placeholder, template, trusted_html,
};
