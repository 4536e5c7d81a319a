#![no_main]

use libfuzzer_sys::fuzz_target;
use richtext::{Entry, Tree, attributes};

// Each byte is an instruction: push a new node, pop back to the parent, or
// append a leaf whose text depends on the byte.
fn build(data: &[u8]) -> Entry {
    let mut stack = vec![Entry::new()];
    for &byte in data {
        match byte % 4 {
            0 => {
                if let Ok(node) = Entry::with_attributes(attributes([("k", byte / 4 % 3)])) {
                    stack.push(node);
                }
            }
            1 if stack.len() > 1 => {
                if let Some(node) = stack.pop()
                    && let Some(parent) = stack.last_mut()
                {
                    parent.append(node);
                }
            }
            2 => {
                if let Some(top) = stack.last_mut() {
                    top.append("");
                }
            }
            _ => {
                if let Some(top) = stack.last_mut() {
                    top.append(char::from(b'a' + byte % 26).to_string());
                }
            }
        }
    }
    while stack.len() > 1 {
        if let Some(node) = stack.pop()
            && let Some(parent) = stack.last_mut()
        {
            parent.append(node);
        }
    }
    stack.pop().unwrap_or_default()
}

fuzz_target!(|data: &[u8]| {
    let tree = build(data);
    let optimized = tree.optimized();
    assert!(optimized.is_minimal());
    assert_eq!(optimized.to_string(), tree.to_string());
    assert_eq!(optimized.optimized(), optimized);
});
