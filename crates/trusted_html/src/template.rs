//! Template interpolation engine.
//!
//! A template is `N + 1` literal segments and `N` interpolation results. The
//! segments are joined with a placeholder marker standing in for each result, the
//! joined markup is parsed into a fragment tree, and every marker is then resolved
//! according to where it ended up:
//!
//! - **attribute value**: replaced by the result's string form. Values are never
//!   parsed as markup, so any result is accepted. All markers in a value are
//!   resolved.
//! - **leaf element** (an element whose only child is one text node, the synthetic
//!   root included): the element's inner markup is rewritten with each marker
//!   replaced by the result's content *as markup*, then re-parsed. Every result used
//!   here must be [`Interpolation::Trusted`], otherwise the whole template fails
//!   with [`TrustedHtmlError::UntrustedMarkup`].
//! - **other text node**: replaced by the result's string form; it stays text.
//!
//! Markers in comments or attribute names are left as literal text.
//!
//! Result values never enter the markup before their context is known.

use html::{Node, parse_fragment, serialize_children};

use crate::error::{Result, TrustedHtmlError};
use crate::placeholder::PlaceholderCodec;
use crate::trusted::{Interpolation, TrustedHtml};

/// Resolves a template with a fresh random marker nonce.
pub fn from_template_literal(
    segments: &[&'static str],
    results: &[Interpolation],
) -> Result<TrustedHtml> {
    from_template_literal_with(&PlaceholderCodec::new(), segments, results)
}

/// Resolves a template using `codec` for its markers.
pub fn from_template_literal_with(
    codec: &PlaceholderCodec,
    segments: &[&'static str],
    results: &[Interpolation],
) -> Result<TrustedHtml> {
    resolve_template(codec, segments, results)
}

fn resolve_template<S: AsRef<str>>(
    codec: &PlaceholderCodec,
    segments: &[S],
    results: &[Interpolation],
) -> Result<TrustedHtml> {
    if segments.len() != results.len() + 1 {
        return Err(TrustedHtmlError::TemplateShape {
            segments: segments.len(),
            results: results.len(),
        });
    }
    if results.is_empty() {
        // Nothing to resolve; the literal is author-written markup.
        let literal: String = segments.iter().map(AsRef::<str>::as_ref).collect();
        return Ok(TrustedHtml::wrap(literal));
    }

    let fragment = join(codec, segments);
    let resolver = Resolver { codec, results };
    let root = resolver.resolve(parse_fragment(&fragment))?;

    let unresolved = count_unresolved(codec, &root);
    if unresolved > 0 {
        log::debug!(
            target: "trusted_html.template",
            "{unresolved} marker(s) left unresolved in comments or attribute names"
        );
    }
    Ok(TrustedHtml::wrap(serialize_children(&root)))
}

/// Splits a `{}`-style format string into segments and resolves it.
///
/// `{{` and `}}` stand for literal braces, as in `format!`. Backs the
/// [`trusted_html!`](crate::trusted_html) macro.
pub fn from_format_str(template: &'static str, results: Vec<Interpolation>) -> Result<TrustedHtml> {
    resolve_template(&PlaceholderCodec::new(), &split_format(template), &results)
}

/// Splits on `{}` slots and unescapes `{{`/`}}`. A lone brace is kept as written.
fn split_format(template: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek()) {
            ('{', Some('{')) | ('}', Some('}')) => {
                chars.next();
                current.push(ch);
            }
            ('{', Some('}')) => {
                chars.next();
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    segments.push(current);
    segments
}

fn join<S: AsRef<str>>(codec: &PlaceholderCodec, segments: &[S]) -> String {
    let mut out = String::with_capacity(segments.iter().map(|s| AsRef::<str>::as_ref(s).len() + 48).sum());
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        out.push_str(segment.as_ref());
        if i < last {
            codec.push_marker(&mut out, i);
        }
    }
    out
}

struct Resolver<'a> {
    codec: &'a PlaceholderCodec,
    results: &'a [Interpolation],
}

impl Resolver<'_> {
    fn resolve(&self, node: Node) -> Result<Node> {
        match node {
            Node::Element { .. } if self.is_leaf_with_marker(&node) => self.resolve_leaf(node),
            Node::Element {
                name,
                attributes,
                children,
            } => Ok(Node::Element {
                attributes: self.resolve_attributes(attributes)?,
                children: children
                    .into_iter()
                    .map(|child| self.resolve(child))
                    .collect::<Result<_>>()?,
                name,
            }),
            Node::Text { text } => Ok(Node::Text {
                text: self.substitute_text(text)?,
            }),
            Node::Comment { .. } => Ok(node),
        }
    }

    fn is_leaf_with_marker(&self, node: &Node) -> bool {
        node.is_leaf_element()
            && matches!(node.children(), [Node::Text { text }] if self.codec.contains_marker(text))
    }

    fn resolve_attributes(
        &self,
        attributes: Vec<(String, Option<String>)>,
    ) -> Result<Vec<(String, Option<String>)>> {
        attributes
            .into_iter()
            .map(|(name, value)| {
                let value = value.map(|v| self.substitute_text(v)).transpose()?;
                Ok((name, value))
            })
            .collect()
    }

    /// Plain string substitution; the result is never parsed as markup.
    fn substitute_text(&self, text: String) -> Result<String> {
        if !self.codec.contains_marker(&text) {
            return Ok(text);
        }
        let replaced = self.codec.replace_all(&text, |index| {
            let value = self.results.get(index).map(Interpolation::as_text);
            log::trace!(target: "trusted_html.template", "text substitution for interpolation {index}");
            Ok::<_, TrustedHtmlError>(value)
        })?;
        Ok(replaced.into_owned())
    }

    /// Rewrites the inner markup of a leaf element with trusted content and
    /// re-parses it as the element's new children.
    fn resolve_leaf(&self, node: Node) -> Result<Node> {
        let inner = serialize_children(&node);
        let replaced = self.codec.replace_all(&inner, |index| match self.results.get(index) {
            Some(Interpolation::Trusted(trusted)) => {
                log::trace!(target: "trusted_html.template", "markup substitution for interpolation {index}");
                Ok(Some(trusted.as_str()))
            }
            Some(Interpolation::Text(_)) => {
                log::debug!(
                    target: "trusted_html.template",
                    "rejecting untrusted markup interpolation {index}"
                );
                Err(TrustedHtmlError::UntrustedMarkup { index })
            }
            None => Ok(None),
        })?;

        let Node::Element {
            name, attributes, ..
        } = node
        else {
            return Ok(node);
        };
        // Raw-text elements take their inner markup verbatim, as `innerHTML` does.
        let children = if html::is_rawtext_element(&name) {
            vec![Node::Text {
                text: replaced.into_owned(),
            }]
        } else {
            match parse_fragment(&replaced) {
                Node::Element { children, .. } => children,
                _ => Vec::new(),
            }
        };
        Ok(Node::Element {
            attributes: self.resolve_attributes(attributes)?,
            name,
            children,
        })
    }
}

fn count_unresolved(codec: &PlaceholderCodec, root: &Node) -> usize {
    html::traverse::descendants(root)
        .map(|node| match node {
            Node::Element { attributes, .. } => attributes
                .iter()
                .map(|(name, value)| {
                    codec.find(name).count()
                        + value.as_deref().map_or(0, |v| codec.find(v).count())
                })
                .sum::<usize>(),
            Node::Text { text } | Node::Comment { text } => codec.find(text).count(),
        })
        .sum()
}

/// Builds [`TrustedHtml`] from a `{}`-style template, resolving each argument by context.
///
/// Each `{}` in the literal is an interpolation slot and `{{`/`}}` are literal braces;
/// arguments are converted with [`Interpolation::from`]. Evaluates to
/// `Result<TrustedHtml, TrustedHtmlError>`.
///
/// ```
/// use trusted_html::{TrustedHtml, trusted_html};
///
/// let html = trusted_html!("<a title=\"{}\">{}</a>", "<hi>", TrustedHtml::escape("x & y")).unwrap();
/// assert_eq!(html.as_str(), "<a title=\"&lt;hi&gt;\">x &amp; y</a>");
/// ```
#[macro_export]
macro_rules! trusted_html {
    ($template:literal $(,)?) => {
        $crate::template::from_format_str($template, ::std::vec::Vec::new())
    };
    ($template:literal, $($arg:expr),+ $(,)?) => {
        $crate::template::from_format_str(
            $template,
            ::std::vec![$($crate::Interpolation::from($arg)),+],
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> PlaceholderCodec {
        PlaceholderCodec::with_nonce("t")
    }

    fn render(segments: &[&'static str], results: &[Interpolation]) -> Result<String> {
        from_template_literal_with(&codec(), segments, results).map(TrustedHtml::into_string)
    }

    fn text(s: &str) -> Interpolation {
        Interpolation::from(s)
    }

    fn trusted(s: &str) -> Interpolation {
        Interpolation::from(TrustedHtml::escape(s))
    }

    #[test]
    fn join_places_markers_between_segments_only() {
        assert_eq!(join(&codec(), &["a", "b", "c"]), "a$$$t:0$$$b$$$t:1$$$c");
        assert_eq!(join(&codec(), &["only"]), "only");
        assert_eq!(join(&codec(), &["", ""]), "$$$t:0$$$");
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        assert_eq!(
            render(&["a", "b"], &[]),
            Err(TrustedHtmlError::TemplateShape {
                segments: 2,
                results: 0
            })
        );
        assert_eq!(
            render(&["a"], &[text("x")]),
            Err(TrustedHtmlError::TemplateShape {
                segments: 1,
                results: 1
            })
        );
    }

    #[test]
    fn attribute_and_leaf_resolution() {
        let out = render(&["<div id=\"", "\">", "</div>"], &[text("abc"), trusted("<b>")]);
        assert_eq!(out.unwrap(), r#"<div id="abc">&lt;b&gt;</div>"#);
    }

    #[test]
    fn every_marker_in_an_attribute_value_is_resolved() {
        let out = render(
            &["<a class=\"", " x ", "\" href=", "></a>"],
            &[text("one"), Interpolation::from(2), text("/p?a=1&b=2")],
        );
        assert_eq!(
            out.unwrap(),
            r#"<a class="one x 2" href="/p?a=1&amp;b=2"></a>"#
        );
    }

    #[test]
    fn attribute_accepts_trusted_values_as_plain_text() {
        let out = render(&["<i title=", "></i>"], &[trusted("\"q\"")]);
        assert_eq!(out.unwrap(), r#"<i title="&amp;quot;q&amp;quot;"></i>"#);
    }

    #[test]
    fn leaf_with_plain_string_is_rejected() {
        assert_eq!(
            render(&["<p>", "</p>"], &[text("x")]),
            Err(TrustedHtmlError::UntrustedMarkup { index: 0 })
        );
    }

    #[test]
    fn leaf_rejection_names_the_offending_interpolation() {
        assert_eq!(
            render(&["<p>", " and ", "</p>"], &[trusted("ok"), text("bad")]),
            Err(TrustedHtmlError::UntrustedMarkup { index: 1 })
        );
    }

    #[test]
    fn leaf_keeps_surrounding_literal_text() {
        let bold = Interpolation::from(TrustedHtml::wrap("<b>hi</b>".to_string()));
        let out = render(&["<p>a &amp; ", " z</p>"], &[bold]);
        assert_eq!(out.unwrap(), "<p>a &amp; <b>hi</b> z</p>");
    }

    #[test]
    fn trusted_markup_introduces_elements() {
        let link = Interpolation::from(TrustedHtml::wrap(
            r#"<a href="/x">x</a><em>y</em>"#.to_string(),
        ));
        let out = render(&["<li class=\"", "\">", "</li>"], &[text("c"), link]);
        assert_eq!(
            out.unwrap(),
            r#"<li class="c"><a href="/x">x</a><em>y</em></li>"#
        );
    }

    #[test]
    fn trusted_content_is_not_rescanned_for_markers() {
        let sneaky = Interpolation::from(TrustedHtml::wrap("<i>$$$t:1$$$</i>".to_string()));
        let out = render(&["<p>", "</p><u title=", "></u>"], &[sneaky, text("v")]);
        assert_eq!(out.unwrap(), r#"<p><i>$$$t:1$$$</i></p><u title="v"></u>"#);
    }

    #[test]
    fn mixed_text_nodes_take_plain_strings() {
        let out = render(&["<p><b>x</b> ", "</p>"], &[text("<script>")]);
        assert_eq!(out.unwrap(), "<p><b>x</b> &lt;script&gt;</p>");
    }

    #[test]
    fn top_level_text_next_to_elements_takes_plain_strings() {
        let out = render(&["<br>", ""], &[text("a<b")]);
        assert_eq!(out.unwrap(), "<br>a&lt;b");
    }

    #[test]
    fn lone_top_level_interpolation_is_markup_context() {
        assert_eq!(
            render(&["", ""], &[text("x")]),
            Err(TrustedHtmlError::UntrustedMarkup { index: 0 })
        );
        assert_eq!(render(&["", ""], &[trusted("<x>")]).unwrap(), "&lt;x&gt;");
    }

    #[test]
    fn rawtext_leaf_takes_trusted_content_verbatim() {
        let code = Interpolation::from(TrustedHtml::wrap("if (a < b) {}".to_string()));
        let out = render(&["<script>", "</script>"], &[code]);
        assert_eq!(out.unwrap(), "<script>if (a < b) {}</script>");
        assert_eq!(
            render(&["<style>", "</style>"], &[text("x")]),
            Err(TrustedHtmlError::UntrustedMarkup { index: 0 })
        );
    }

    #[test]
    fn markers_in_comments_are_left_literal() {
        let out = render(&["<div><!-- ", " --><b>x</b></div>"], &[text("c")]);
        assert_eq!(out.unwrap(), "<div><!-- $$$t:0$$$ --><b>x</b></div>");
    }

    #[test]
    fn markers_in_attribute_names_are_left_literal() {
        let out = render(&["<a ", "=1>x</a>"], &[text("v")]);
        assert_eq!(out.unwrap(), r#"<a $$$t:0$$$="1">x</a>"#);
    }

    #[test]
    fn unresolved_markers_are_counted_in_names_and_comments() {
        let root = parse_fragment("<a $$$t:0$$$=1 title=$$$t:1$$$><!--$$$t:2$$$ $$$t:3$$$--></a>");
        assert_eq!(count_unresolved(&codec(), &root), 4);
        let resolved = Resolver {
            codec: &codec(),
            results: &[text("n"), text("v"), text("c"), text("d")],
        }
        .resolve(root)
        .unwrap();
        assert_eq!(count_unresolved(&codec(), &resolved), 3);
    }

    #[test]
    fn leaf_attributes_are_resolved_too() {
        let out = render(&["<p title=", ">", "</p>"], &[text("t"), trusted("x")]);
        assert_eq!(out.unwrap(), r#"<p title="t">x</p>"#);
    }

    #[test]
    fn no_results_returns_literal_unchanged() {
        assert_eq!(render(&["<p>as-is</P >"], &[]).unwrap(), "<p>as-is</P >");
    }

    #[test]
    fn default_entry_point_uses_random_nonce() {
        let out = from_template_literal(&["<p id=", ">", "</p>"], &[text("i"), trusted("&")]);
        assert_eq!(out.unwrap().as_str(), r#"<p id="i">&amp;</p>"#);
    }

    #[test]
    fn format_str_splits_on_braces() {
        let out = from_format_str("<b class={}>{}</b>", vec![text("k"), trusted("v")]);
        assert_eq!(out.unwrap().as_str(), r#"<b class="k">v</b>"#);
    }

    #[test]
    fn split_format_unescapes_doubled_braces() {
        assert_eq!(split_format("a{}b"), vec!["a", "b"]);
        assert_eq!(split_format("p{{}}{}"), vec!["p{}", ""]);
        assert_eq!(split_format("{{{}}}"), vec!["{", "}"]);
        assert_eq!(split_format("lone { and }"), vec!["lone { and }"]);
        assert_eq!(split_format(""), vec![""]);
    }

    #[test]
    fn macro_accepts_literal_braces() {
        let out = crate::trusted_html!("<style>p{{}}</style><p>{}</p>", TrustedHtml::escape("x"));
        assert_eq!(out.unwrap().as_str(), "<style>p{}</style><p>x</p>");
        let css = crate::trusted_html!("<style>a {{ color: red }}</style>");
        assert_eq!(css.unwrap().as_str(), "<style>a { color: red }</style>");
    }
}
