#![no_main]

use enumcov_domain::Analyzer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any snapshot that parses must analyze without panicking, whatever its spans say.
    let Ok(snapshot) = serde_json::from_slice::<enumcov_types::snapshot::SourceSnapshot>(data)
    else {
        return;
    };
    let _ = Analyzer::default().analyze(&snapshot);
});
