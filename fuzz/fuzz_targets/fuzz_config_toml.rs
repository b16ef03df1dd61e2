#![no_main]

use libfuzzer_sys::fuzz_target;
use stackplan::config::{parse_with_warnings, resolve, validate, DeploymentContext};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let path = std::path::Path::new("stackplan.toml");
        // Parsing, validation and resolution should never panic
        if let Ok((document, _)) = parse_with_warnings(content, path) {
            if validate(&document, path).is_ok() {
                for name in document.environment_names() {
                    let _ = resolve(&document, &name, &DeploymentContext::default());
                }
            }
        }
    }
});
