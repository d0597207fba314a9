//! Markup serialization for fragment trees, following `innerHTML`/`outerHTML` rules.

use crate::entities::{escape_attribute, escape_text};
use crate::tokenizer::{is_rawtext_element, is_void_element};
use crate::types::Node;

/// Serializes `node` itself (the `outerHTML` of elements).
pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, None, &mut out);
    out
}

/// Serializes the children of `node` (the `innerHTML`).
///
/// For text and comment nodes this is the empty string.
pub fn serialize_children(node: &Node) -> String {
    let mut out = String::new();
    if let Node::Element { name, children, .. } = node {
        for child in children {
            write_node(child, Some(name.as_str()), &mut out);
        }
    }
    out
}

fn write_node(node: &Node, parent: Option<&str>, out: &mut String) {
    match node {
        Node::Element {
            name,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                if let Some(value) = value {
                    out.push_str(&escape_attribute(value));
                }
                out.push('"');
            }
            out.push('>');
            if is_void_element(name) {
                return;
            }
            for child in children {
                write_node(child, Some(name.as_str()), out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Text { text } => {
            if parent.is_some_and(is_rawtext_element) {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        Node::Comment { text } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}
