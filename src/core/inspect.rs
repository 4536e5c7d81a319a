//! Hierarchical text view of a tree.
//!
//! ```text
//! ◯ color="red"
//! ├─╴"hello "
//! └─╴"world" bold=true
//! ```

use super::{TEXT, Tree};
use serde_json::Value;
use std::fmt::Write;

const BRANCH: &str = "├─╴";
const LAST_BRANCH: &str = "└─╴";
const CONTINUE: &str = "│  ";
const BLANK: &str = "   ";

/// Interior nodes show `◯`, leaves their quoted text, both followed by their
/// remaining attributes.
pub fn label<T: Tree>(node: &T) -> String {
    let mut out = if node.is_leaf() {
        let text = node.attribute(TEXT).and_then(Value::as_str).unwrap_or("");
        format!("{text:?}")
    } else {
        "◯".to_string()
    };
    for (key, value) in node.attributes() {
        if key != TEXT {
            let _ = write!(out, " {key}={value}");
        }
    }
    out
}

pub fn draw<T: Tree>(root: &T, label: &dyn Fn(&T) -> String) -> String {
    let mut out = label(root);
    draw_children(root, label, "", &mut out);
    out
}

fn draw_children<T: Tree>(node: &T, label: &dyn Fn(&T) -> String, prefix: &str, out: &mut String) {
    let count = node.count();
    for (index, child) in node.each_child().enumerate() {
        let last = index + 1 == count;
        out.push('\n');
        out.push_str(prefix);
        out.push_str(if last { LAST_BRANCH } else { BRANCH });
        out.push_str(&label(child));

        let nested = format!("{prefix}{}", if last { BLANK } else { CONTINUE });
        draw_children(child, label, &nested, out);
    }
}
