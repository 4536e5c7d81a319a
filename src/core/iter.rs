//! Preorder traversals over borrowed trees.
//!
//! Both iterators only borrow the tree, so a traversal can be restarted by
//! asking the tree for a new one, or by cloning an iterator mid-way.

use super::Tree;
use std::iter::FusedIterator;

/// Every node of a tree, parents before children, left to right.
#[derive(Debug, Clone)]
pub struct Nodes<'a, T> {
    stack: Vec<&'a T>,
}

impl<'a, T: Tree> Nodes<'a, T> {
    pub(crate) fn new(root: &'a T) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a, T: Tree> Iterator for Nodes<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

impl<T: Tree> FusedIterator for Nodes<'_, T> {}

/// The leaves of a tree from left to right. A lone leaf yields itself.
#[derive(Debug, Clone)]
pub struct Leaves<'a, T> {
    nodes: Nodes<'a, T>,
}

impl<'a, T: Tree> Leaves<'a, T> {
    pub(crate) fn new(root: &'a T) -> Self {
        Self {
            nodes: Nodes::new(root),
        }
    }
}

impl<'a, T: Tree> Iterator for Leaves<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.nodes.by_ref().find(|node| node.is_leaf())
    }
}

impl<T: Tree> FusedIterator for Leaves<'_, T> {}
