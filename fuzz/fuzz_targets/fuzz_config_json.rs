//! Fuzz target: `DriverConfig::from_json`
//!
//! Arbitrary bytes as a config file.  Invariants checked:
//! - No panics on malformed UTF-8 or JSON
//! - Anything accepted also passes `validate()` and resolves a bus for
//!   every pipe
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use imx708_ctl::DriverConfig;
use imx708_ctl::types::MAX_PIPES;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(cfg) = DriverConfig::from_json(text) {
        assert!(cfg.validate().is_ok());
        for pipe in 0..MAX_PIPES {
            let _ = cfg.bus_for(pipe);
        }
    }
});
