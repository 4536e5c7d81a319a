#![no_main]

use libfuzzer_sys::fuzz_target;
use richtext::{Attributes, Document};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let mut middle = input.len() / 2;
    while !input.is_char_boundary(middle) {
        middle -= 1;
    }
    let (left, right) = input.split_at(middle);

    let left: Document = Document::new(left);
    let right: Document = Document::new(right);
    let joined = &left + &right;
    assert_eq!(joined.to_string(), input);

    let mut parsed = joined.clone();
    parsed.append("", Attributes::new());
    assert_eq!(parsed.to_string(), input);
    assert!(!joined.is_parsed());
});
