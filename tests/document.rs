use richtext::{Attributes, Document, Entry, Error, Format, Plain, RenderConfig, Tree};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

thread_local! {
    static PARSES: Cell<usize> = const { Cell::new(0) };
    static BRACKETED_PARSES: Cell<usize> = const { Cell::new(0) };
}

fn parses() -> usize {
    PARSES.with(Cell::get)
}

fn bracketed_parses() -> usize {
    BRACKETED_PARSES.with(Cell::get)
}

/// Plain text that records every parse.
struct Counting;

impl Format for Counting {
    fn parse(raw: &str) -> Entry {
        PARSES.with(|count| count.set(count.get() + 1));
        Entry::from_text(raw)
    }
}

/// Text wrapped in square brackets.
struct Bracketed;

impl Format for Bracketed {
    fn parse(raw: &str) -> Entry {
        BRACKETED_PARSES.with(|count| count.set(count.get() + 1));
        let inner = raw
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(raw);
        Entry::from_text(inner)
    }

    fn render(root: &Entry) -> String {
        format!("[{root}]")
    }
}

/// Collapses runs of whitespace, so even unparsed sources are rendered.
struct Squeezed;

impl Format for Squeezed {
    fn parse(raw: &str) -> Entry {
        PARSES.with(|count| count.set(count.get() + 1));
        Entry::from_text(raw.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn renders_unparsed() -> bool {
        true
    }
}

#[test]
fn test_to_string_never_parses() {
    let doc: Document<Counting> = Document::new("abc");
    assert_eq!(doc.to_string(), "abc");
    assert_eq!(doc.to_string(), "abc");
    assert_eq!(parses(), 0);
    assert!(!doc.is_parsed());
}

#[test]
fn test_root_parses_exactly_once() {
    let doc: Document<Counting> = Document::new("abc");
    let first = doc.root();
    let second = doc.root();
    assert_eq!(doc.to_string(), "abc");
    assert_eq!(parses(), 1);
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn test_same_format_concat_stays_raw() {
    let left: Document<Counting> = Document::new("a");
    let right: Document<Counting> = Document::new("b");

    let joined = &left + &right;

    assert_eq!(joined.to_string(), "ab");
    assert_eq!(parses(), 0);
    assert!(!joined.is_parsed());
    assert!(!left.is_parsed());
    assert!(!right.is_parsed());
}

#[test]
fn test_same_format_concat_after_parse_builds_tree() {
    let left: Document<Counting> = Document::new("a");
    left.root();
    let right: Document<Counting> = Document::new("b");

    let joined = &left + &right;

    assert!(joined.is_parsed());
    assert_eq!(parses(), 2);
    assert_eq!(joined.root().count(), 2);
    assert_eq!(joined.to_string(), "ab");
}

#[test]
fn test_cross_format_concat_keeps_left_format() {
    let left: Document<Counting> = Document::new("a");
    let right: Document<Bracketed> = Document::new("[b]");

    let joined: Document<Counting> = &left + &right;

    assert_eq!(parses(), 1);
    assert_eq!(bracketed_parses(), 1);
    assert!(joined.is_parsed());
    assert_eq!(joined.root().size(), 3);
    assert_eq!(joined.to_string(), "ab");

    let flipped: Document<Bracketed> = &right + &left;
    assert_eq!(flipped.to_string(), "[ba]");
}

#[test]
fn test_concat_with_str() {
    let doc: Document<Counting> = Document::new("a");
    let joined = &doc + "b";
    assert_eq!(joined.to_string(), "ab");
    assert_eq!(parses(), 0);

    let owned = joined + "c";
    assert_eq!(owned.to_string(), "abc");
}

#[test]
fn test_concat_value_reports_type_mismatch() {
    let doc: Document<Counting> = Document::new("a");
    let err = doc.concat_value(&json!([1, 2])).unwrap_err();
    assert_eq!(
        err,
        Error::TypeMismatch {
            expected: "string or scalar",
            found: "array"
        }
    );
    assert_eq!(doc.concat_value(&json!(2.5)).unwrap().to_string(), "a2.5");
}

#[test]
fn test_from_same_format_shares_raw_state() {
    let doc: Document<Counting> = Document::new("abc");
    let copy: Document<Counting> = Document::from_document(&doc);
    assert!(!copy.is_parsed());
    assert_eq!(copy.to_string(), "abc");
    assert_eq!(parses(), 0);
}

#[test]
fn test_from_same_format_shares_parsed_root() {
    let doc: Document<Counting> = Document::new("abc");
    doc.root();
    let copy: Document<Counting> = (&doc).into();
    assert!(Rc::ptr_eq(&doc.root(), &copy.root()));
    assert_eq!(parses(), 1);
}

#[test]
fn test_from_other_format_adopts_root_without_reparsing() {
    let doc: Document<Counting> = Document::new("abc");
    let bracketed: Document<Bracketed> = Document::from_document(&doc);

    assert_eq!(parses(), 1);
    assert_eq!(bracketed_parses(), 0);
    assert!(bracketed.is_parsed());
    assert_eq!(bracketed.to_string(), "[abc]");
}

#[test]
fn test_renders_unparsed_forces_parse() {
    let doc: Document<Squeezed> = Document::new("a   b\n c");
    assert_eq!(doc.to_string(), "a b c");
    assert_eq!(parses(), 1);
    assert!(doc.is_parsed());
}

#[test]
fn test_normalized_config_parses_plain_documents() {
    let doc: Document<Counting> = Document::new("abc");
    assert_eq!(doc.render_with_config(&RenderConfig::normalized()), "abc");
    assert_eq!(parses(), 1);
}

#[test]
fn test_append_copies_shared_root() {
    let doc: Document = Document::new("a");
    doc.root();
    let mut copy = doc.clone();
    assert!(Rc::ptr_eq(&doc.root(), &copy.root()));

    copy.append("x", Attributes::new());

    assert_eq!(doc.to_string(), "a");
    assert_eq!(copy.to_string(), "ax");
    assert!(!Rc::ptr_eq(&doc.root(), &copy.root()));
}

#[test]
fn test_adopted_root_is_not_mutated_through_adopter() {
    let plain: Document = Document::new("a");
    let mut bracketed: Document<Bracketed> = Document::from_document(&plain);

    bracketed.append("b", Attributes::new());

    assert_eq!(plain.root().size(), 1);
    assert_eq!(bracketed.to_string(), "[ab]");
}

#[test]
fn test_optimize_document_root() {
    let mut inner = Entry::new();
    inner.append("a").append("");
    let mut root = Entry::new();
    root.append(inner);
    let mut doc: Document = Document::from_entry(root);

    doc.optimize();

    assert!(doc.root().is_minimal());
    assert_eq!(doc.root().size(), 1);
    assert_eq!(doc.to_string(), "a");
}

#[test]
fn test_each_node_on_unparsed_document() {
    let doc: Document<Counting> = Document::new("x");
    let mut visited = 0;
    doc.each_node(|_| visited += 1);
    assert_eq!(visited, 1);
    assert_eq!(parses(), 1);
}

#[test]
fn test_documents_from_values_and_entries() {
    let from_value: Document = Document::from_value(&json!(12)).unwrap();
    assert_eq!(from_value.to_string(), "12");
    assert!(Document::<Plain>::from_value(&json!({"a": 1})).is_err());

    let from_entry: Document = Entry::from_text("e").into();
    assert!(from_entry.is_parsed());

    let from_string: Document = String::from("s").into();
    assert!(!from_string.is_parsed());
}
