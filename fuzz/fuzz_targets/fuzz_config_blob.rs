//! Fuzz target: persisted config blob
//!
//! Decodes arbitrary bytes as a stored `SystemConfig` the way the NVS
//! adapter does and verifies:
//! - No panics under arbitrary byte inputs
//! - Anything that decodes and validates re-encodes to an equal config
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use firewatch::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = postcard::from_bytes::<SystemConfig>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    let bytes = postcard::to_allocvec(&cfg).expect("valid config encodes");
    let again: SystemConfig = postcard::from_bytes(&bytes).expect("own encoding decodes");
    assert_eq!(cfg, again);
});
