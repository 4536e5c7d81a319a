//! A naive, simple oracle implementation for differential testing.
//!
//! Optimization here repeatedly applies one local rewrite at a time until the
//! tree stops changing, instead of the single post-order pass of the crate.
use richtext::{Attributes, Entry, TEXT, Tree};
use serde_json::Value;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NaiveNode {
    pub attributes: Attributes,
    pub children: Vec<NaiveNode>,
}

impl NaiveNode {
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            attributes: entry.attributes().clone(),
            children: entry.children().iter().map(Self::from_entry).collect(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn text(&self) -> &str {
        self.attributes
            .get(TEXT)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn render(&self) -> String {
        if self.is_leaf() {
            return self.text().to_string();
        }
        let mut out = String::new();
        for child in &self.children {
            out.push_str(&child.render());
        }
        out
    }

    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Self::size).sum::<usize>()
    }

    pub fn is_minimal(&self) -> bool {
        self.children.len() != 1 && self.children.iter().all(Self::is_minimal)
    }

    fn is_blank(&self) -> bool {
        self.is_leaf() && self.text().is_empty()
    }

    /// Removes one blank leaf below `self`.
    fn prune_one(&mut self) -> bool {
        if let Some(index) = self.children.iter().position(Self::is_blank) {
            self.children.remove(index);
            return true;
        }
        self.children.iter_mut().any(Self::prune_one)
    }

    /// Merges one single-child node with its child.
    fn collapse_one(&mut self) -> bool {
        if self.children.len() == 1 {
            let child = self.children.remove(0);
            self.attributes.extend(child.attributes);
            self.children = child.children;
            return true;
        }
        self.children.iter_mut().any(Self::collapse_one)
    }
}

/// Optimizes with the default blank-pruning rule.
///
/// All blank leaves are pruned before any chain is collapsed, since a
/// collapse must never pick up attributes from a subtree that ends up blank.
pub fn optimize(entry: &Entry) -> NaiveNode {
    let mut node = NaiveNode::from_entry(entry);
    loop {
        if node.prune_one() {
            continue;
        }
        if !node.collapse_one() {
            break;
        }
    }
    node
}
