//! Fuzz test for explore configuration parsing
//!
//! Feeds arbitrary UTF-8 to the TOML loader and validator. Neither may panic;
//! anything that parses and validates must survive a render/parse round trip.
//!
//! Run with: cargo +nightly fuzz run config_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use prism_core::ExploreConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(config) = ExploreConfig::from_toml_str(input) {
            if config.validate().is_ok() {
                let rendered = toml::to_string(&config).expect("valid config renders");
                let reparsed = ExploreConfig::from_toml_str(&rendered).expect("rendered config parses");
                assert_eq!(reparsed, config);
            }
        }
    }
});
