use std::fmt;

use crate::config::Configuration;
use crate::error::{Result, TrustedHtmlError};

/// Markup that is known to be safe to inject into a document.
///
/// The content is fixed at construction and can only be produced by
/// [`TrustedHtml::escape`], [`TrustedHtml::sanitize`],
/// [`TrustedHtml::unsafely_create`] or a template
/// ([`TrustedHtml::from_template_literal`] / [`trusted_html!`](crate::trusted_html)).
/// The private field is the brand: no other code can fabricate a value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TrustedHtml {
    content: String,
}

impl TrustedHtml {
    pub(crate) fn wrap(content: String) -> Self {
        Self { content }
    }

    /// HTML-escapes `& < > " '` and NUL.
    ///
    /// Every character is replaced in a single pass, so entities produced for one
    /// character are never escaped again.
    pub fn escape(raw: &str) -> Self {
        let mut content = String::with_capacity(raw.len());
        for ch in raw.chars() {
            match ch {
                '&' => content.push_str("&amp;"),
                '<' => content.push_str("&lt;"),
                '>' => content.push_str("&gt;"),
                '"' => content.push_str("&quot;"),
                '\'' => content.push_str("&#39;"),
                '\0' => content.push_str("&#0;"),
                _ => content.push(ch),
            }
        }
        Self { content }
    }

    /// Runs `raw` through a registered sanitizer (`"default"` when `sanitizer_id` is `None`).
    ///
    /// The sanitizer's output is trusted as-is.
    pub fn sanitize(
        config: &Configuration,
        raw: &str,
        sanitizer_id: Option<&str>,
    ) -> Result<Self> {
        config.sanitize(sanitizer_id, raw).map(Self::wrap)
    }

    /// Wraps `raw` without any validation. Refused unless the configuration's
    /// unsafe-create gate is open.
    pub fn unsafely_create(config: &Configuration, raw: impl Into<String>) -> Result<Self> {
        if !config.allow_unsafely_create() {
            log::warn!(target: "trusted_html.config", "unsafely_create refused: gate is closed");
            return Err(TrustedHtmlError::GateClosed);
        }
        let content = raw.into();
        log::warn!(
            target: "trusted_html.config",
            "unsafely_create bypassed validation for {} bytes",
            content.len()
        );
        Ok(Self { content })
    }

    /// Builds trusted markup from literal segments and interpolation results.
    ///
    /// See [`crate::template`] for the resolution rules.
    pub fn from_template_literal(
        segments: &[&'static str],
        results: &[Interpolation],
    ) -> Result<Self> {
        crate::template::from_template_literal(segments, results)
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn to_text(&self) -> String {
        self.content.clone()
    }

    pub fn into_string(self) -> String {
        self.content
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl fmt::Debug for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TrustedHtml").field(&self.content).finish()
    }
}

impl AsRef<str> for TrustedHtml {
    fn as_ref(&self) -> &str {
        &self.content
    }
}

impl From<TrustedHtml> for String {
    fn from(value: TrustedHtml) -> Self {
        value.content
    }
}

/// One interpolation result of a template.
///
/// Only the `Trusted` variant may be inserted where it would be parsed as markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Trusted(TrustedHtml),
    Text(String),
}

impl Interpolation {
    /// String form used for attribute values and text nodes.
    pub fn as_text(&self) -> &str {
        match self {
            Interpolation::Trusted(trusted) => trusted.as_str(),
            Interpolation::Text(text) => text,
        }
    }

    pub fn as_trusted(&self) -> Option<&TrustedHtml> {
        match self {
            Interpolation::Trusted(trusted) => Some(trusted),
            Interpolation::Text(_) => None,
        }
    }
}

impl From<TrustedHtml> for Interpolation {
    fn from(value: TrustedHtml) -> Self {
        Interpolation::Trusted(value)
    }
}

impl From<&TrustedHtml> for Interpolation {
    fn from(value: &TrustedHtml) -> Self {
        Interpolation::Trusted(value.clone())
    }
}

impl From<String> for Interpolation {
    fn from(value: String) -> Self {
        Interpolation::Text(value)
    }
}

impl From<&String> for Interpolation {
    fn from(value: &String) -> Self {
        Interpolation::Text(value.clone())
    }
}

impl From<&str> for Interpolation {
    fn from(value: &str) -> Self {
        Interpolation::Text(value.to_string())
    }
}

macro_rules! interpolation_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Interpolation {
                fn from(value: $ty) -> Self {
                    Interpolation::Text(value.to_string())
                }
            }
        )*
    };
}

interpolation_from_display!(
    char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_replaces_all_special_characters() {
        assert_eq!(
            TrustedHtml::escape("<a href=\"x\">'&'</a>\0").as_str(),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;&#0;"
        );
    }

    #[test]
    fn escape_does_not_double_escape() {
        assert_eq!(TrustedHtml::escape("&lt;").as_str(), "&amp;lt;");
        assert_eq!(TrustedHtml::escape("").as_str(), "");
    }

    #[test]
    fn to_text_is_idempotent() {
        let value = TrustedHtml::escape("a<b");
        assert_eq!(value.to_text(), value.to_text());
        assert_eq!(value.to_text(), value.to_string());
        assert_eq!(String::from(value), "a&lt;b");
    }

    #[test]
    fn interpolation_conversions() {
        assert_eq!(Interpolation::from(42u8).as_text(), "42");
        assert_eq!(Interpolation::from(-1.5f64).as_text(), "-1.5");
        assert_eq!(Interpolation::from('x').as_text(), "x");
        assert_eq!(Interpolation::from(true).as_text(), "true");
        assert!(Interpolation::from("s").as_trusted().is_none());

        let trusted = TrustedHtml::escape("<i>");
        let interpolation = Interpolation::from(&trusted);
        assert_eq!(interpolation.as_trusted(), Some(&trusted));
        assert_eq!(interpolation.as_text(), "&lt;i&gt;");
    }
}
