//! The parse/render contract a concrete text format implements.

use super::Entry;

/// A stateless strategy for turning raw text into an [`Entry`] tree and back.
///
/// Implementors are usually unit structs used as the type parameter of a
/// [`Document`](super::Document). Both hooks have defaults: `parse` wraps the
/// whole string in a single leaf and `render` concatenates the leaf texts.
///
/// `parse` must produce a tree whose default rendering reconstructs content
/// equivalent to `raw`; `render` must be a left-to-right function of the
/// leaf texts and attributes.
pub trait Format: 'static {
    fn parse(raw: &str) -> Entry {
        Entry::from_text(raw)
    }

    fn render(root: &Entry) -> String {
        root.to_string()
    }

    /// When true, rendering an unparsed document parses and renders it
    /// instead of returning the raw string as is.
    fn renders_unparsed() -> bool {
        false
    }
}

/// The default format: unformatted text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plain;

impl Format for Plain {}
