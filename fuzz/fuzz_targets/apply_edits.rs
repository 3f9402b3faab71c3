#![no_main]

use arbitrary::Arbitrary;
use enumcov_edit::{apply_edits, sha256_hex};
use enumcov_types::fix::FixEdit;
use enumcov_types::span::Span;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    edits: Vec<(u16, u16, String)>,
}

fuzz_target!(|input: Input| {
    let sha = sha256_hex(input.text.as_bytes());
    let edits: Vec<FixEdit> = input
        .edits
        .into_iter()
        .map(|(start, end, replacement)| FixEdit {
            diagnostic_id: String::new(),
            fix_key: String::new(),
            title: String::new(),
            path: "F.cs".to_string(),
            document_sha256: sha.clone(),
            span: Span::new(start as usize, end as usize),
            replacement,
            added: Vec::new(),
        })
        .collect();

    // Bad spans must come back as conflicts, never panics.
    let _ = apply_edits(&input.text, &edits);
});
