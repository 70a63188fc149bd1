//! Concrete syntax tree, stored as an arena of nodes addressed by index.
//! Each node keeps a parent index (non-owning, used for sibling lookups)
//! and an ordered child-index list, so there is no cyclic ownership.

use std::collections::HashSet;

/// Label used for synthetic epsilon leaves attached by the decoration pass.
pub const EPSILON_LEAF: &str = "\u{03b5}";

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Node {
    /// Non-terminal name, terminal token type, or the epsilon-leaf label.
    pub label: String,
    /// Literal value; only terminal leaves carry one.
    pub value: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn new() -> SyntaxTree {
        SyntaxTree {
            nodes: Vec::new(),
            root: 0,
        }
    }

    /// Create a detached node and return its id (the arena index).
    pub fn push(&mut self, label: impl Into<String>, value: Option<String>) -> NodeId {
        self.nodes.push(Node {
            label: label.into(),
            value,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Append `child` to `parent`'s child list and set the parent link.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id].children.is_empty()
    }

    /// Leaf literal values in depth-first order, epsilon leaves excluded.
    pub fn leaf_values(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaf_values(self.root, &mut out);
        out
    }

    fn collect_leaf_values(&self, id: NodeId, out: &mut Vec<String>) {
        let node = &self.nodes[id];
        if node.children.is_empty() {
            if node.label != EPSILON_LEAF {
                if let Some(value) = &node.value {
                    out.push(value.clone());
                }
            }
            return;
        }
        for &child in &node.children {
            self.collect_leaf_values(child, out);
        }
    }

    /// Post-pass: attach a synthetic epsilon leaf to every childless node
    /// whose label is a declared non-terminal, marking explicit empty
    /// derivations for uniform rendering.
    pub fn decorate_epsilon_leaves(&mut self, nonterminals: &HashSet<String>) {
        let candidates: Vec<NodeId> = (0..self.nodes.len())
            .filter(|&id| {
                self.nodes[id].children.is_empty() && nonterminals.contains(&self.nodes[id].label)
            })
            .collect();
        for id in candidates {
            let leaf = self.push(EPSILON_LEAF, None);
            self.attach(id, leaf);
        }
    }

    /// Indented text rendering, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(self.root, 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = &self.nodes[id];
        for _ in 0..depth {
            out.push_str("  ");
        }
        match &node.value {
            Some(value) => out.push_str(&format!("{}:{}\n", node.label, value)),
            None => out.push_str(&format!("{}\n", node.label)),
        }
        for &child in &node.children {
            self.render_node(child, depth + 1, out);
        }
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        SyntaxTree::new()
    }
}
