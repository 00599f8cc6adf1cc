#![no_main]

use libfuzzer_sys::fuzz_target;
use trfp::{normalize, RawResult, ResultShape};

fuzz_target!(|data: &[u8]| {
    // Arbitrary tool output must decode or fail, never panic.
    let stdout = String::from_utf8_lossy(data);
    let raw = RawResult::new(0, stdout, "");

    let _ = normalize(&raw, &ResultShape::Json);
    if let Ok(records) = normalize(&raw, &ResultShape::Records) {
        assert!(records.into_records().map_or(false, |r| !r.is_empty()));
    }

    let _ = trfp::xic::parse_query(&raw.stdout);
    let _ = trfp::xic::decode_base64_trace(raw.stdout.trim());
});
