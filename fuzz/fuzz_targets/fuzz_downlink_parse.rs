//! Fuzz target: downlink line handling
//!
//! Feeds arbitrary UTF-8 lines through `parse_line` and `handle_line`
//! and asserts that no input panics, commands are only recognised in
//! marked lines, and the interval sentinel can never be smuggled into
//! a live config.
//!
//! cargo fuzz run fuzz_downlink_parse

#![no_main]

use btumeter::app::downlink::{DownlinkCommand, handle_line, parse_line};
use btumeter::app::events::MeterEvent;
use btumeter::app::ports::{EventSink, StorageError, StoragePort};
use btumeter::config::{INTERVAL_SENTINEL, MeterConfig};
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;

// ── In-memory doubles ─────────────────────────────────────────

struct MemStore {
    data: HashMap<String, Vec<u8>>,
}

impl StoragePort for MemStore {
    fn read(&self, ns: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.data.get(&format!("{ns}::{key}")) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, ns: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.data.insert(format!("{ns}::{key}"), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, ns: &str, key: &str) -> Result<(), StorageError> {
        self.data.remove(&format!("{ns}::{key}"));
        Ok(())
    }

    fn exists(&self, ns: &str, key: &str) -> bool {
        self.data.contains_key(&format!("{ns}::{key}"))
    }
}

struct DropSink;

impl EventSink for DropSink {
    fn emit(&mut self, _event: &MeterEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };

    if let Some(DownlinkCommand::SetInterval(_)) = parse_line(line) {
        assert!(
            line.contains("RX: \""),
            "commands must only come from marked lines"
        );
    }

    let mut config = MeterConfig::default();
    let mut store = MemStore {
        data: HashMap::new(),
    };
    let mut sink = DropSink;

    // In-memory storage cannot fail, so neither may the handler.
    handle_line(line, &mut config, &mut store, &mut sink).unwrap();

    assert_ne!(
        config.secs_between_xmit(),
        INTERVAL_SENTINEL,
        "the sentinel must never become a live interval"
    );
});
