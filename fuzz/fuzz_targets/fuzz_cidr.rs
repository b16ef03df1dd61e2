#![no_main]

use libfuzzer_sys::fuzz_target;
use stackplan::domain::value_objects::{Ipv4Block, SubnetAllocator};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    if let Ok(raw) = std::str::from_utf8(&data[1..]) {
        if let Ok(block) = raw.parse::<Ipv4Block>() {
            let mut allocator = SubnetAllocator::new(block);
            let prefix = data[0] % 33;
            for _ in 0..8 {
                if allocator.allocate(prefix).is_err() {
                    break;
                }
            }
        }
    }
});
