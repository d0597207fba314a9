//! Trusted markup construction.
//!
//! [`TrustedHtml`] marks strings that are safe to inject as HTML. Values come from
//! exactly four places:
//!
//! - [`TrustedHtml::escape`]: escapes the input;
//! - [`TrustedHtml::sanitize`]: runs a sanitizer registered in a [`Configuration`];
//! - [`TrustedHtml::unsafely_create`]: explicit bypass, only when the configuration allows it;
//! - templates ([`TrustedHtml::from_template_literal`], [`trusted_html!`]): interpolations are
//!   resolved by context, and only `TrustedHtml` may be inserted where it would become markup.
//!
//! Configuration is expected to be completed and [frozen](Configuration::freeze) at startup,
//! before any untrusted input is processed.

pub mod config;
pub mod placeholder;
pub mod template;

mod error;
mod trusted;

pub use crate::config::{
    Configuration, ConfigurationBuilder, DEFAULT_SANITIZER, Lifecycle, Sanitizer,
};
pub use crate::error::{Result, TrustedHtmlError};
pub use crate::placeholder::PlaceholderCodec;
pub use crate::template::from_template_literal;
pub use crate::trusted::{Interpolation, TrustedHtml};
