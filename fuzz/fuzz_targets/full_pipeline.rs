#![no_main]

use enumcov_domain::rules::EXHAUSTIVE;
use enumcov_domain::{Analyzer, FixContext, FixSynthesizer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else { return };
    let text = enumcov_testkit::color_program(body);
    let Ok(snapshot) = enumcov_testkit::snapshot("Program.cs", &text) else {
        return;
    };

    let run = Analyzer::default().analyze(&snapshot);
    let missing: Vec<_> = run
        .diagnostics
        .into_iter()
        .filter(|d| d.rule_id == EXHAUSTIVE.id)
        .collect();
    let batch = FixSynthesizer::new(FixContext::default()).propose_all(&snapshot, &missing);
    let _ = enumcov_edit::apply_edits(&text, &batch.edits);
});
