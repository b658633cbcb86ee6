//! Fuzz target: `MeterConfig::unpack`
//!
//! Treats the fuzz input as raw flash contents and asserts the record
//! decoder is total: no input panics, every decode satisfies the range
//! invariants, and decoding is idempotent through a re-encode.
//!
//! cargo fuzz run fuzz_record_unpack

#![no_main]

use btumeter::config::{COUNT_MODULUS, INTERVAL_SENTINEL, MeterConfig, RECORD_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < RECORD_LEN {
        return;
    }
    let mut bytes = [0u8; RECORD_LEN];
    bytes.copy_from_slice(&data[..RECORD_LEN]);

    let config = MeterConfig::unpack(bytes);

    // The sentinel must never survive as a live interval, and counters
    // must land inside the wrap range.
    assert_ne!(config.secs_between_xmit(), INTERVAL_SENTINEL);
    assert!(config.heat_count < COUNT_MODULUS);
    assert!(config.flow_count < COUNT_MODULUS);

    // A decoded record is a fixed point: re-encoding and decoding again
    // must change nothing.
    let again = MeterConfig::unpack(config.pack());
    assert_eq!(again, config, "unpack must be idempotent after pack");
});
