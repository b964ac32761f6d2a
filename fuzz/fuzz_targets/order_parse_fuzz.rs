//! Fuzz test for ordering mode parsing
//!
//! Run with: cargo +nightly fuzz run order_parse_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use prism_core::OrderBy;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(order) = input.parse::<OrderBy>() {
            // Every accepted spelling normalises to a canonical name.
            assert_eq!(order.as_str().parse::<OrderBy>(), Ok(order));
        }
    }
});
