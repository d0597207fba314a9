//! HTML fragment parsing and serialization.
//!
//! The pipeline is `tokenize` → `build_fragment` → (inspect or rewrite the [`Node`] tree)
//! → `serialize_children`. Parsing only builds a tree: nothing is executed or fetched.

pub mod traverse;

mod dom_builder;
mod entities;
mod serialize;
mod tokenizer;
mod types;

pub use crate::dom_builder::{FRAGMENT_ROOT, build_fragment};
pub use crate::entities::{decode_entities, escape_attribute, escape_text};
pub use crate::serialize::{serialize, serialize_children};
pub use crate::tokenizer::{RAWTEXT_ELEMENTS, is_rawtext_element, is_void_element, tokenize};
pub use crate::types::{AtomId, AtomTable, Node, Token, TokenStream};

/// Parses `markup` as a fragment rooted at a synthetic `<body>` element.
pub fn parse_fragment(markup: &str) -> Node {
    build_fragment(&tokenize(markup))
}
