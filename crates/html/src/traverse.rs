use crate::Node;

/// Pre-order, depth-first iterator over `root` and all of its descendants
/// (document order, root first).
pub fn descendants(root: &Node) -> Descendants<'_> {
    Descendants { stack: vec![root] }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Concatenated text of every text node under `root`, in document order.
pub fn text_content(root: &Node) -> String {
    let mut out = String::new();
    for node in descendants(root) {
        if let Node::Text { text } = node {
            out.push_str(text);
        }
    }
    out
}
