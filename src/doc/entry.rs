//! Text-aware tree nodes.
//!
//! An [`Entry`] is an attributed node where the [`TEXT`] attribute has special
//! status: only a leaf exposes it, and appending a child to a leaf first moves
//! the leaf's text into a new child of its own.

use crate::core::{Attributes, Error, Result, TEXT, Tree, sealed, value_kind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntryParts")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    attributes: Attributes,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Entry>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::leaf(text, Attributes::new())
    }

    pub fn leaf(text: impl Into<String>, attributes: Attributes) -> Self {
        sealed::Storage::new_leaf(text.into(), attributes)
    }

    /// Builds a leaf from a full attribute map. Fails with
    /// [`Error::TypeMismatch`] when the text entry is not a string.
    pub fn with_attributes(attributes: Attributes) -> Result<Self> {
        check_text(attributes.get(TEXT), true)?;
        Ok(Self {
            attributes,
            children: Vec::new(),
        })
    }

    /// The text of a leaf, or `None` for an interior node. A leaf without a
    /// text attribute reads as the empty string.
    pub fn text(&self) -> Option<&str> {
        if !self.is_leaf() {
            return None;
        }
        Some(
            self.attributes
                .get(TEXT)
                .and_then(Value::as_str)
                .unwrap_or(""),
        )
    }

    /// Fails with [`Error::InvalidOperation`] unless this is a leaf.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.set_attribute(TEXT, Value::String(text.into()))
            .map(|_| ())
    }

    /// Renders the tree bottom-up. `render` receives every node, leaf and
    /// interior, along with the string computed for it: the text for a leaf,
    /// the concatenated rendered children otherwise.
    pub fn render_with<R>(&self, mut render: R) -> String
    where
        R: FnMut(&Entry, String) -> String,
    {
        self.render_node(&mut render)
    }

    fn render_node(&self, render: &mut dyn FnMut(&Entry, String) -> String) -> String {
        let string = match self.text() {
            Some(text) => text.to_string(),
            None => {
                let mut joined = String::new();
                for child in &self.children {
                    joined.push_str(&child.render_node(render));
                }
                joined
            }
        };
        render(self, string)
    }
}

/// Plain concatenation of the leaf texts, left to right.
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for leaf in self.each_leaf() {
            f.write_str(leaf.text().unwrap_or(""))?;
        }
        Ok(())
    }
}

fn check_text(text: Option<&Value>, is_leaf: bool) -> Result<()> {
    let Some(text) = text else {
        return Ok(());
    };
    if !is_leaf {
        return Err(Error::InvalidOperation(
            "only leaves can have a text entry".to_string(),
        ));
    }
    if !text.is_string() {
        return Err(Error::TypeMismatch {
            expected: "string",
            found: value_kind(text),
        });
    }
    Ok(())
}

/// Unchecked wire shape of an [`Entry`].
#[derive(Deserialize)]
struct EntryParts {
    #[serde(default)]
    attributes: Attributes,
    #[serde(default)]
    children: Vec<Entry>,
}

impl TryFrom<EntryParts> for Entry {
    type Error = Error;

    fn try_from(parts: EntryParts) -> Result<Self> {
        check_text(parts.attributes.get(TEXT), parts.children.is_empty())?;
        Ok(Self {
            attributes: parts.attributes,
            children: parts.children,
        })
    }
}

impl From<&str> for Entry {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<String> for Entry {
    fn from(text: String) -> Self {
        Self::from_text(text)
    }
}

impl sealed::Storage for Entry {
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

    fn before_append(&mut self) {
        if !self.children.is_empty() {
            return;
        }
        let Some(text) = self.attributes.remove(TEXT) else {
            return;
        };
        if text.as_str().is_some_and(|text| !text.is_empty()) {
            let mut attributes = self.attributes.clone();
            attributes.insert(TEXT.to_string(), text);
            trace!("moving leaf text into a new first child");
            self.children.push(Entry {
                attributes,
                children: Vec::new(),
            });
        }
    }

    fn check_attribute(&self, key: &str, value: &Value) -> Result<()> {
        if key != TEXT {
            return Ok(());
        }
        check_text(Some(value), self.is_leaf())
    }

    /// Blank leaves are pruned.
    fn keep_by_default(child: &Self) -> bool {
        child.text().is_none_or(|text| !text.is_empty())
    }
}

impl Tree for Entry {}
