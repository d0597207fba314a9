use crate::types::{Node, Token, TokenStream};

/// Name of the synthetic container element every fragment is parsed into.
pub const FRAGMENT_ROOT: &str = "body";

/// Builds a fragment tree rooted at a synthetic `<body>` element.
///
/// Tree construction is deliberately forgiving and never fails:
/// - doctypes are dropped (fragment context);
/// - an end tag closes the nearest open element with the same name and everything
///   opened after it; an end tag with no matching open element is ignored;
/// - elements still open at the end of input are closed implicitly.
pub fn build_fragment(stream: &TokenStream) -> Node {
    let atoms = stream.atoms();
    let mut arena = NodeArena::new();
    let root_index = arena.push(ArenaNode::Element {
        name: FRAGMENT_ROOT.to_string(),
        attributes: Vec::new(),
        children: Vec::new(),
    });

    let mut open_elements: Vec<usize> = Vec::new();

    for token in stream.tokens() {
        let parent_index = open_elements.last().copied().unwrap_or(root_index);
        match token {
            Token::Doctype(_) => {}
            Token::Comment(c) => {
                arena.add_child(parent_index, ArenaNode::Comment { text: c.clone() });
            }
            Token::Text(txt) => {
                if !txt.is_empty() {
                    arena.push_text(parent_index, txt);
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let resolved_attributes: Vec<(String, Option<String>)> = attributes
                    .iter()
                    .map(|(k, v)| (atoms.resolve(*k).to_string(), v.clone()))
                    .collect();
                let new_index = arena.add_child(
                    parent_index,
                    ArenaNode::Element {
                        name: atoms.resolve(*name).to_string(),
                        attributes: resolved_attributes,
                        children: Vec::new(),
                    },
                );

                if !*self_closing {
                    open_elements.push(new_index);
                }
            }
            Token::EndTag(name) => {
                let target = atoms.resolve(*name);
                let matching = open_elements
                    .iter()
                    .rposition(|&open_index| arena.is_element_named(open_index, target));
                match matching {
                    Some(depth) => open_elements.truncate(depth),
                    None => {
                        log::trace!(target: "html.tree_builder", "ignoring stray end tag </{target}>");
                    }
                }
            }
        }
    }

    arena.into_dom(root_index)
}

#[derive(Debug)]
enum ArenaNode {
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<usize>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl ArenaNode {
    fn children(&self) -> Option<&[usize]> {
        match self {
            ArenaNode::Element { children, .. } => Some(children),
            ArenaNode::Text { .. } | ArenaNode::Comment { .. } => None,
        }
    }
}

#[derive(Debug)]
struct NodeArena {
    nodes: Vec<ArenaNode>,
}

impl NodeArena {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    fn add_child(&mut self, parent_index: usize, child: ArenaNode) -> usize {
        let child_index = self.push(child);
        match &mut self.nodes[parent_index] {
            ArenaNode::Element { children, .. } => children.push(child_index),
            _ => unreachable!("dom builder parent cannot have children"),
        }
        child_index
    }

    /// Appends text, merging with a directly preceding text sibling so adjacent
    /// text runs form one node, as a DOM parser would produce.
    fn push_text(&mut self, parent_index: usize, txt: &str) {
        let last_child = self.nodes[parent_index]
            .children()
            .and_then(|children| children.last().copied());
        if let Some(last) = last_child {
            if let ArenaNode::Text { text } = &mut self.nodes[last] {
                text.push_str(txt);
                return;
            }
        }
        self.add_child(
            parent_index,
            ArenaNode::Text {
                text: txt.to_string(),
            },
        );
    }

    fn is_element_named(&self, node_index: usize, target: &str) -> bool {
        match &self.nodes[node_index] {
            ArenaNode::Element { name, .. } => name.eq_ignore_ascii_case(target),
            _ => false,
        }
    }

    fn into_dom(self, root_index: usize) -> Node {
        let mut nodes = self.nodes;
        let mut built_nodes: Vec<Node> = Vec::with_capacity(nodes.len());

        fn take_children(n: usize, built: &mut Vec<Node>) -> Vec<Node> {
            let start = built.len() - n;
            built.split_off(start)
        }

        // Iterative postorder traversal over the arena:
        // - First time we see a node, we schedule it for construction (visited=true) and then
        //   descend into its children.
        // - When we see it again (visited=true), all of its descendants have already been pushed
        //   onto `built_nodes`, and its direct children are the last `child_count` nodes on
        //   `built_nodes` (in original order).
        let mut stack: Vec<(usize, bool)> = vec![(root_index, false)];

        while let Some((node_index, visited)) = stack.pop() {
            if !visited {
                stack.push((node_index, true));

                // Push children in reverse so they're *visited* in original order, and thus land on
                // `built_nodes` in original order.
                if let Some(children) = nodes[node_index].children() {
                    for &child_index in children.iter().rev() {
                        stack.push((child_index, false));
                    }
                }

                continue;
            }

            let node = match &mut nodes[node_index] {
                ArenaNode::Element {
                    name,
                    attributes,
                    children,
                } => {
                    let child_count = children.len();
                    children.clear();
                    Node::Element {
                        name: std::mem::take(name),
                        attributes: std::mem::take(attributes),
                        children: take_children(child_count, &mut built_nodes),
                    }
                }
                ArenaNode::Text { text } => Node::Text {
                    text: std::mem::take(text),
                },
                ArenaNode::Comment { text } => Node::Comment {
                    text: std::mem::take(text),
                },
            };

            built_nodes.push(node);
        }

        debug_assert_eq!(
            built_nodes.len(),
            1,
            "dom builder should build exactly one root node"
        );
        built_nodes
            .pop()
            .unwrap_or_else(|| Node::element(FRAGMENT_ROOT))
    }
}
