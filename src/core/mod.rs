//! Attributed tree primitives.
//!
//! This module provides the format-agnostic building blocks shared by every
//! tree in the crate:
//!
//! - [`Attributes`] - the key/value metadata attached to a node
//! - [`Tree`] - ordered, child-owned tree behaviour (iteration, sizing,
//!   appending, combining and the single-child minimisation pass)
//! - [`Node`] - a plain attributed node with no text semantics
//! - [`Error`] - failures raised by tree and document operations
//!
//! Every node exclusively owns its attribute map and its children. There are
//! no parent links, so a tree is acyclic by construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;

pub mod inspect;
pub mod iter;

pub use iter::{Leaves, Nodes};

/// Attribute key reserved for the text of a leaf entry.
pub const TEXT: &str = "text";

pub type Attributes = BTreeMap<String, Value>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
}

/// Builds an attribute map from key/value pairs.
pub fn attributes<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Coerces a scalar value into text. Arrays and objects cannot be stringified.
pub fn stringify(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => Ok(text.clone()),
        Value::Array(_) | Value::Object(_) => Err(Error::TypeMismatch {
            expected: "string or scalar",
            found: value_kind(value),
        }),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) mod sealed {
    use super::{Attributes, Result, TEXT};
    use serde_json::Value;

    /// Raw storage access and structural hooks. Only types in this crate can
    /// reach the child list directly.
    pub trait Storage: Sized {
        fn attribute_map(&self) -> &Attributes;
        fn attribute_map_mut(&mut self) -> &mut Attributes;
        fn child_list(&self) -> &Vec<Self>;
        fn child_list_mut(&mut self) -> &mut Vec<Self>;
        fn from_parts(attributes: Attributes, children: Vec<Self>) -> Self;
        fn into_parts(self) -> (Attributes, Vec<Self>);

        fn new_leaf(text: String, mut attributes: Attributes) -> Self {
            attributes.insert(TEXT.to_string(), Value::String(text));
            Self::from_parts(attributes, Vec::new())
        }

        /// Runs before any child is pushed onto the child list.
        fn before_append(&mut self) {}

        fn check_attribute(&self, _key: &str, _value: &Value) -> Result<()> {
            Ok(())
        }

        /// Whether `optimize` keeps an already optimized child when no
        /// predicate is supplied.
        fn keep_by_default(_child: &Self) -> bool {
            true
        }

        /// Takes over the attributes and children of a single child. The
        /// child's attributes win on conflicting keys.
        fn absorb(&mut self, child: Self) {
            let (attributes, children) = child.into_parts();
            self.attribute_map_mut().extend(attributes);
            *self.child_list_mut() = children;
        }
    }
}

/// Ordered tree behaviour shared by [`Node`] and [`Entry`](crate::Entry).
///
/// A node is a leaf iff it has no children. `size` counts the node itself and
/// all of its descendants; `count` only the direct children.
pub trait Tree: sealed::Storage + Clone {
    fn attributes(&self) -> &Attributes {
        self.attribute_map()
    }

    fn attribute(&self, key: &str) -> Option<&Value> {
        self.attribute_map().get(key)
    }

    /// Writes a single attribute, returning the previous value.
    fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let key = key.into();
        let value = value.into();
        self.check_attribute(&key, &value)?;
        Ok(self.attribute_map_mut().insert(key, value))
    }

    fn remove_attribute(&mut self, key: &str) -> Option<Value> {
        self.attribute_map_mut().remove(key)
    }

    fn children(&self) -> &[Self] {
        self.child_list()
    }

    fn is_leaf(&self) -> bool {
        self.child_list().is_empty()
    }

    fn count(&self) -> usize {
        self.child_list().len()
    }

    fn size(&self) -> usize {
        self.child_list()
            .iter()
            .fold(1, |total, child| total + child.size())
    }

    fn child(&self, index: usize) -> Option<&Self> {
        self.child_list().get(index)
    }

    fn child_mut(&mut self, index: usize) -> Option<&mut Self> {
        self.child_list_mut().get_mut(index)
    }

    fn last_child(&self) -> Option<&Self> {
        self.child_list().last()
    }

    /// Returns the child of a node that has exactly one.
    fn only_child(&self) -> Result<&Self> {
        match self.child_list().as_slice() {
            [child] => Ok(child),
            children => Err(Error::PreconditionViolation(format!(
                "expected exactly one child, found {}",
                children.len()
            ))),
        }
    }

    /// Appends a child and returns `self` to allow chaining.
    fn append(&mut self, child: impl Into<Self>) -> &mut Self {
        let child = child.into();
        self.before_append();
        self.child_list_mut().push(child);
        self
    }

    /// Appends a new leaf carrying `text` and `attributes`.
    fn append_with(&mut self, text: impl Into<String>, attributes: Attributes) -> &mut Self {
        self.append(Self::new_leaf(text.into(), attributes))
    }

    /// Appends a new leaf whose text is the stringified `value`.
    fn append_value(&mut self, value: &Value, attributes: Attributes) -> Result<&mut Self> {
        let text = stringify(value)?;
        Ok(self.append_with(text, attributes))
    }

    /// Appends a new leaf and returns it.
    fn create_child(&mut self, text: impl Into<String>, attributes: Attributes) -> &mut Self {
        self.append_with(text, attributes);
        let children = self.child_list_mut();
        let last = children.len() - 1;
        &mut children[last]
    }

    /// Builds a new attribute-less root holding copies of `self` and `other`.
    fn combine(&self, other: &Self) -> Self {
        Self::from_parts(Attributes::new(), vec![self.clone(), other.clone()])
    }

    /// Preorder traversal, starting with `self`.
    fn each_node(&self) -> Nodes<'_, Self> {
        Nodes::new(self)
    }

    /// Leaves from left to right.
    fn each_leaf(&self) -> Leaves<'_, Self> {
        Leaves::new(self)
    }

    fn each_child(&self) -> std::slice::Iter<'_, Self> {
        self.child_list().iter()
    }

    /// True when no node in the tree, including `self`, has exactly one child.
    fn is_minimal(&self) -> bool {
        self.each_node().all(|node| node.count() != 1)
    }

    /// Minimises the tree in place using the default retention rule.
    fn optimize(&mut self) -> &mut Self {
        self.optimize_by(Self::keep_by_default)
    }

    /// Minimises the tree in place.
    ///
    /// Children are optimized first. Each optimized child is then offered to
    /// `keep`; rejected children are dropped. A node left with a single child
    /// takes over that child's attributes (the child wins on conflicts) and
    /// its children.
    fn optimize_by<P>(&mut self, mut keep: P) -> &mut Self
    where
        P: FnMut(&Self) -> bool,
    {
        optimize_node(self, &mut keep);
        self
    }

    fn optimized(&self) -> Self {
        let mut copy = self.clone();
        copy.optimize();
        copy
    }

    fn optimized_by<P>(&self, keep: P) -> Self
    where
        P: FnMut(&Self) -> bool,
    {
        let mut copy = self.clone();
        copy.optimize_by(keep);
        copy
    }

    /// Compares attributes and child count only. Use `==` for deep equality.
    fn shallow_eq(&self, other: &Self) -> bool {
        self.attribute_map() == other.attribute_map() && self.count() == other.count()
    }

    fn inspect(&self) -> String {
        inspect::draw(self, &inspect::label::<Self>)
    }

    fn inspect_with<L>(&self, label: L) -> String
    where
        L: Fn(&Self) -> String,
    {
        inspect::draw(self, &label)
    }
}

fn optimize_node<T, P>(node: &mut T, keep: &mut P)
where
    T: Tree,
    P: FnMut(&T) -> bool,
{
    if node.is_leaf() {
        return;
    }

    let children = std::mem::take(node.child_list_mut());
    let mut kept = Vec::with_capacity(children.len());
    for mut child in children {
        optimize_node(&mut child, keep);
        if keep(&child) {
            kept.push(child);
        } else {
            trace!(size = child.size(), "optimize dropped child");
        }
    }
    *node.child_list_mut() = kept;

    if node.count() == 1
        && let Some(child) = node.child_list_mut().pop()
    {
        trace!(grandchildren = child.count(), "optimize merged single child");
        node.absorb(child);
    }
}

/// A plain attributed node. Unlike [`Entry`](crate::Entry) it gives no key
/// special meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(attributes: Attributes) -> Self {
        Self {
            attributes,
            children: Vec::new(),
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        sealed::Storage::new_leaf(text.to_string(), Attributes::new())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        sealed::Storage::new_leaf(text, Attributes::new())
    }
}

impl sealed::Storage for Node {
    fn attribute_map(&self) -> &Attributes {
        &self.attributes
    }

    fn attribute_map_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn child_list(&self) -> &Vec<Self> {
        &self.children
    }

    fn child_list_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    fn from_parts(attributes: Attributes, children: Vec<Self>) -> Self {
        Self {
            attributes,
            children,
        }
    }

    fn into_parts(self) -> (Attributes, Vec<Self>) {
        (self.attributes, self.children)
    }
}

impl Tree for Node {}
