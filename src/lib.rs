//! richtext: attributed rich text trees with pluggable formats.
//!
//! Text annotated with style attributes is modelled as an ordered tree whose
//! leaves carry the text. The crate includes:
//!
//! - **Tree primitives** - attribute maps, iteration, combining and the
//!   `optimize` minimisation pass, shared by [`Node`] and [`Entry`]
//! - **Documents** - a lazy facade that keeps the raw source until the tree
//!   is actually needed, then parses it through a [`Format`]
//!
//! # Quick Start
//!
//! ```rust
//! use richtext::{Document, Tree, attributes};
//!
//! let mut doc: Document = Document::new("hello ");
//! doc.append("world!", attributes([("bold", true)]));
//!
//! let html = doc.render_with(|entry, string| {
//!     if entry.attribute("bold").is_some() {
//!         format!("<b>{string}</b>")
//!     } else {
//!         string
//!     }
//! });
//! assert_eq!(html, "hello <b>world!</b>");
//! ```
//!
//! A format is a type implementing [`Format`]; documents of different
//! formats can be concatenated and converted into each other.

// Attributed tree primitives and the optimize pass
pub mod core;

// Text entries, formats and lazy documents
pub mod doc;

// Re-export tree types
pub use crate::core::{
    Attributes, Error, Leaves, Node, Nodes, Result, TEXT, Tree, attributes, stringify,
};

// Re-export document types
pub use crate::doc::{Document, Entry, Format, Plain, RenderConfig, Styleable};

/// Wraps `raw` in a plain-text [`Document`].
pub fn document(raw: impl Into<String>) -> Document {
    Document::new(raw)
}
