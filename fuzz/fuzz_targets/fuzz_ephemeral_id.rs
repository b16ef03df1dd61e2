#![no_main]

use libfuzzer_sys::fuzz_target;
use stackplan::domain::value_objects::EphemeralId;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(id) = EphemeralId::parse(raw) {
            let _ = id.service_name("webapp");
            let _ = id.rule_priority();
        }
    }
});
