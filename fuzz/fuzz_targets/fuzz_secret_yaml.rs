#![no_main]

use libfuzzer_sys::fuzz_target;
use stackplan::application::secrets::parse_bundle;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Secret documents come from disk; malformed input must be an error, not a panic
        let _ = parse_bundle(content, std::path::Path::new("secrets.dec.yaml"));
    }
});
