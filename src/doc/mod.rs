//! Lazy document facade over an [`Entry`] tree.
//!
//! A [`Document`] holds either the raw source string or the parsed tree, never
//! both. The first operation that needs the tree runs [`Format::parse`] and
//! memoizes the result; rendering an unparsed document returns the raw
//! string without building anything.
//!
//! Parsed roots are reference counted. Copies of a document of the same
//! format share the tree, and a document adopting the root of another format
//! shares it as well. Mutating operations clone the root first when it is
//! shared, so no document observes another one's edits.

use crate::core::{Attributes, Nodes, Result, Tree, stringify};
use serde_json::Value;
use std::any::{TypeId, type_name};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Add;
use std::rc::Rc;
use tracing::{debug, trace};

pub mod entry;
pub mod format;
pub mod style;

pub use entry::Entry;
pub use format::{Format, Plain};
pub use style::Styleable;

/// Controls how [`Document::render_with_config`] treats an unparsed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub prefer_raw_source: bool,
}

impl RenderConfig {
    /// Return an unparsed source verbatim.
    pub fn exact() -> Self {
        Self {
            prefer_raw_source: true,
        }
    }

    /// Always parse, then render through the format.
    pub fn normalized() -> Self {
        Self {
            prefer_raw_source: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::exact()
    }
}

#[derive(Debug, Clone)]
enum State {
    Raw(Rc<str>),
    Parsed(Rc<Entry>),
}

impl State {
    fn parse<F: Format>(&mut self) -> &mut Rc<Entry> {
        if let State::Raw(raw) = self {
            let root = F::parse(raw);
            debug!(
                format = type_name::<F>(),
                raw_len = raw.len(),
                size = root.size(),
                "parsed document source"
            );
            *self = State::Parsed(Rc::new(root));
        }
        match self {
            State::Parsed(root) => root,
            State::Raw(_) => unreachable!("raw source was replaced above"),
        }
    }
}

fn same_format<F: Format, G: Format>() -> bool {
    TypeId::of::<F>() == TypeId::of::<G>()
}

/// Rich text in the encoding described by `F`.
pub struct Document<F: Format = Plain> {
    state: RefCell<State>,
    format: PhantomData<F>,
}

impl<F: Format> Document<F> {
    /// Wraps a raw source. Nothing is parsed until the tree is needed.
    pub fn new(raw: impl Into<String>) -> Self {
        Self::from_state(State::Raw(Rc::from(raw.into())))
    }

    pub fn from_entry(root: Entry) -> Self {
        Self::from_state(State::Parsed(Rc::new(root)))
    }

    /// Builds a document from another one.
    ///
    /// A document of the same format hands over its raw source or its root
    /// as is. Any other format has to be parsed by its own rules, so its
    /// root is adopted instead.
    pub fn from_document<G: Format>(other: &Document<G>) -> Self {
        if same_format::<F, G>() {
            return Self::from_state(other.state.borrow().clone());
        }
        let root = other.root();
        debug!(
            from = type_name::<G>(),
            to = type_name::<F>(),
            size = root.size(),
            "adopting foreign document root"
        );
        Self::from_state(State::Parsed(root))
    }

    /// Stores the stringified `value` as raw source.
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::new(stringify(value)?))
    }

    fn from_state(state: State) -> Self {
        Self {
            state: RefCell::new(state),
            format: PhantomData,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(*self.state.borrow(), State::Parsed(_))
    }

    /// The parsed tree, parsing the raw source on first use.
    pub fn root(&self) -> Rc<Entry> {
        Rc::clone(self.state.borrow_mut().parse::<F>())
    }

    /// Exclusive access to the parsed tree. A root shared with another
    /// document is cloned first.
    pub fn root_mut(&mut self) -> &mut Entry {
        let root = self.state.get_mut().parse::<F>();
        if Rc::strong_count(root) > 1 {
            trace!(size = root.size(), "cloning shared root before mutation");
        }
        Rc::make_mut(root)
    }

    fn raw(&self) -> Option<Rc<str>> {
        match &*self.state.borrow() {
            State::Raw(raw) => Some(Rc::clone(raw)),
            State::Parsed(_) => None,
        }
    }

    /// Leaf texts concatenated, ignoring the format's renderer.
    pub fn to_plain(&self) -> String {
        self.root().to_string()
    }

    /// Renders the tree through `render`, bypassing the format.
    pub fn render_with<R>(&self, render: R) -> String
    where
        R: FnMut(&Entry, String) -> String,
    {
        self.root().render_with(render)
    }

    pub fn render_with_config(&self, config: &RenderConfig) -> String {
        if config.prefer_raw_source
            && !F::renders_unparsed()
            && let Some(raw) = self.raw()
        {
            return raw.to_string();
        }
        F::render(&self.root())
    }

    /// Appends a new leaf to the root and returns it.
    pub fn append(&mut self, text: impl Into<String>, attributes: Attributes) -> &mut Entry {
        self.root_mut().create_child(text, attributes)
    }

    pub fn append_value(&mut self, value: &Value, attributes: Attributes) -> Result<&mut Entry> {
        let text = stringify(value)?;
        Ok(self.append(text, attributes))
    }

    pub fn optimize(&mut self) -> &mut Self {
        self.root_mut().optimize();
        self
    }

    pub fn optimize_by<P>(&mut self, keep: P) -> &mut Self
    where
        P: FnMut(&Entry) -> bool,
    {
        self.root_mut().optimize_by(keep);
        self
    }

    /// Concatenates two documents into a new one of this format.
    ///
    /// Two unparsed documents of the same format are joined as raw strings.
    /// Otherwise both roots become the children of a new root.
    pub fn concat<G: Format>(&self, other: &Document<G>) -> Document<F> {
        if same_format::<F, G>()
            && let (Some(left), Some(right)) = (self.raw(), other.raw())
        {
            debug!(format = type_name::<F>(), "concatenating raw sources");
            return Self::new(format!("{left}{right}"));
        }
        debug!(
            left = type_name::<F>(),
            right = type_name::<G>(),
            "combining document roots"
        );
        Self::from_entry(self.root().combine(&other.root()))
    }

    pub fn concat_str(&self, other: &str) -> Document<F> {
        self.concat(&Self::new(other))
    }

    /// Fails with [`Error::TypeMismatch`](crate::Error::TypeMismatch) when
    /// `other` cannot be stringified.
    pub fn concat_value(&self, other: &Value) -> Result<Document<F>> {
        Ok(self.concat(&Self::from_value(other)?))
    }

    /// Visits every entry of the parsed tree in preorder.
    pub fn each_node<V>(&self, visit: V)
    where
        V: FnMut(&Entry),
    {
        self.root().each_node().for_each(visit);
    }

    pub fn each_entry<V>(&self, visit: V)
    where
        V: FnMut(&Entry),
    {
        self.each_node(visit);
    }

    /// Runs `scan` over a preorder iterator of the parsed tree.
    pub fn with_nodes<R, S>(&self, scan: S) -> R
    where
        S: FnOnce(Nodes<'_, Entry>) -> R,
    {
        let root = self.root();
        scan(root.each_node())
    }
}

impl<F: Format> Clone for Document<F> {
    fn clone(&self) -> Self {
        Self::from_state(self.state.borrow().clone())
    }
}

impl<F: Format> Default for Document<F> {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl<F: Format> fmt::Debug for Document<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Document");
        out.field("format", &type_name::<F>());
        match self.state.try_borrow() {
            Ok(state) => match &*state {
                State::Raw(raw) => out.field("raw", raw),
                State::Parsed(root) => out.field("root", root),
            },
            Err(_) => out.field("state", &"<borrowed>"),
        };
        out.finish()
    }
}

impl<F: Format> fmt::Display for Document<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with_config(&RenderConfig::default()))
    }
}

impl<F: Format> From<&str> for Document<F> {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl<F: Format> From<String> for Document<F> {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl<F: Format> From<Entry> for Document<F> {
    fn from(root: Entry) -> Self {
        Self::from_entry(root)
    }
}

impl<F: Format, G: Format> From<&Document<G>> for Document<F> {
    fn from(other: &Document<G>) -> Self {
        Self::from_document(other)
    }
}

impl<F: Format, G: Format> Add<&Document<G>> for &Document<F> {
    type Output = Document<F>;

    fn add(self, other: &Document<G>) -> Document<F> {
        self.concat(other)
    }
}

impl<F: Format, G: Format> Add<Document<G>> for Document<F> {
    type Output = Document<F>;

    fn add(self, other: Document<G>) -> Document<F> {
        self.concat(&other)
    }
}

impl<F: Format> Add<&str> for &Document<F> {
    type Output = Document<F>;

    fn add(self, other: &str) -> Document<F> {
        self.concat_str(other)
    }
}

impl<F: Format> Add<&str> for Document<F> {
    type Output = Document<F>;

    fn add(self, other: &str) -> Document<F> {
        self.concat_str(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Error, TEXT, attributes};
    use serde_json::json;

    struct Shouting;

    impl Format for Shouting {
        fn render(root: &Entry) -> String {
            root.to_string().to_uppercase()
        }
    }

    #[test]
    fn test_new_document_renders_raw_without_parsing() {
        let doc: Document = Document::new("test");
        assert!(!doc.is_parsed());
        assert_eq!(doc.to_string(), "test");
        assert!(!doc.is_parsed());
    }

    #[test]
    fn test_root_parses_once() {
        let doc: Document = Document::new("test");
        let root = doc.root();
        assert!(doc.is_parsed());
        assert_eq!(root.text(), Some("test"));
        assert!(Rc::ptr_eq(&root, &doc.root()));
    }

    #[test]
    fn test_from_entry_is_parsed() {
        let doc: Document = Document::from_entry(Entry::from_text("a"));
        assert!(doc.is_parsed());
        assert_eq!(doc.to_string(), "a");
    }

    #[test]
    fn test_clone_shares_parsed_root() {
        let doc: Document = Document::new("a");
        doc.root();
        let copy = doc.clone();
        assert!(Rc::ptr_eq(&doc.root(), &copy.root()));
    }

    #[test]
    fn test_root_mut_detaches_shared_root() {
        let doc: Document = Document::new("a");
        doc.root();
        let mut copy = doc.clone();

        copy.root_mut().set_attribute("bold", true).unwrap();

        assert_eq!(doc.root().attribute("bold"), None);
        assert_eq!(copy.root().attribute("bold"), Some(&json!(true)));
    }

    #[test]
    fn test_append_returns_new_child() {
        let mut doc: Document = Document::new("hello ");
        let child = doc.append("world", attributes([("bold", true)]));
        assert_eq!(child.text(), Some("world"));
        child.set_attribute("italic", true).unwrap();

        let root = doc.root();
        assert_eq!(root.count(), 2);
        assert_eq!(root.child(1).unwrap().attribute("italic"), Some(&json!(true)));
        assert_eq!(doc.to_string(), "hello world");
    }

    #[test]
    fn test_append_value_stringifies() {
        let mut doc: Document = Document::default();
        doc.append_value(&json!(7), Attributes::new()).unwrap();
        assert_eq!(doc.to_plain(), "7");
        assert!(doc.append_value(&json!([1]), Attributes::new()).is_err());
    }

    #[test]
    fn test_concat_raw_fast_path() {
        let left: Document = Document::new("a");
        let right: Document = Document::new("b");
        let joined = &left + &right;
        assert!(!joined.is_parsed());
        assert!(!left.is_parsed());
        assert_eq!(joined.to_string(), "ab");
    }

    #[test]
    fn test_concat_parsed_combines_roots() {
        let left: Document = Document::new("a");
        left.root();
        let joined = left + "b";
        assert!(joined.is_parsed());
        assert_eq!(joined.root().count(), 2);
        assert_eq!(joined.to_string(), "ab");
    }

    #[test]
    fn test_concat_value_rejects_containers() {
        let doc: Document = Document::new("a");
        assert_eq!(doc.concat_value(&json!(1)).unwrap().to_string(), "a1");
        assert!(matches!(
            doc.concat_value(&json!({"k": "v"})),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_from_value() {
        let doc: Document = Document::from_value(&json!(true)).unwrap();
        assert_eq!(doc.to_string(), "true");
        let empty: Document = Document::from_value(&Value::Null).unwrap();
        assert_eq!(empty.to_string(), "");
    }

    #[test]
    fn test_render_config_controls_raw_preference() {
        let doc: Document<Shouting> = Document::new("quiet");
        assert_eq!(doc.render_with_config(&RenderConfig::exact()), "quiet");
        assert!(!doc.is_parsed());
        assert_eq!(doc.render_with_config(&RenderConfig::normalized()), "QUIET");
        assert_eq!(doc.to_string(), "QUIET");
    }

    #[test]
    fn test_render_with_callback() {
        let doc: Document = Document::new("x");
        let out = doc.render_with(|entry, string| match entry.attribute(TEXT) {
            Some(_) => format!("[{string}]"),
            None => string,
        });
        assert_eq!(out, "[x]");
    }

    #[test]
    fn test_from_document_of_other_format_adopts_root() {
        let plain: Document = Document::new("mixed");
        let loud: Document<Shouting> = Document::from_document(&plain);
        assert!(plain.is_parsed());
        assert!(loud.is_parsed());
        assert!(Rc::ptr_eq(&plain.root(), &loud.root()));
        assert_eq!(loud.to_string(), "MIXED");
    }

    #[test]
    fn test_with_nodes_counts_entries() {
        let mut doc: Document = Document::new("a");
        doc.append("b", Attributes::new());
        assert_eq!(doc.with_nodes(|nodes| nodes.count()), 3);

        let mut texts = Vec::new();
        doc.each_entry(|entry| texts.extend(entry.text().map(str::to_string)));
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_debug_shows_state() {
        let doc: Document = Document::new("raw");
        assert!(format!("{doc:?}").contains("raw: \"raw\""));
    }
}
