//! Fuzz target: `LineFramer::feed`
//!
//! Drives arbitrary byte sequences into the downlink line framer and
//! asserts that it never panics and every delivered line is non-empty,
//! ASCII and within the fixed capacity — whatever the radio module
//! garbles onto the UART.
//!
//! cargo fuzz run fuzz_line_framer

#![no_main]

use btumeter::link::framer::{LineFramer, MAX_LINE_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut framer = LineFramer::new();

    for &byte in data {
        if let Some(line) = framer.feed(byte) {
            assert!(!line.is_empty(), "framer must not deliver empty lines");
            assert!(line.is_ascii(), "framer must drop non-ASCII bytes");
            assert!(line.len() <= MAX_LINE_LEN, "line exceeds framer capacity");
        }
    }

    // After a reset the framer must accept bytes cleanly again.
    framer.reset();
    assert_eq!(framer.pending(), 0);
    for &byte in data {
        let _ = framer.feed(byte);
    }
});
