//! Mock adapters for integration tests.
//!
//! Every port the metering loop touches has an in-memory double here, so
//! tests can script sensor readings and radio traffic and assert on the
//! full persisted/transmitted history without real hardware.

use std::collections::{HashMap, VecDeque};

use btumeter::app::events::MeterEvent;
use btumeter::app::ports::{ClockPort, EventSink, SensorPort, StorageError, StoragePort};
use btumeter::link::transport::Transport;
use btumeter::scheduler::wrap_ticks;

// ── MockSensors ───────────────────────────────────────────────

/// Scripted thermistor and flow-switch readings.
///
/// Flow levels are consumed one per `flow_switch_level()` CALL, not per
/// loop cycle — a suspected edge reads the switch twice in one cycle
/// (observe, then confirm after the settle wait).  When the script runs
/// out the last level repeats.
pub struct MockSensors {
    pub hot_raw: u16,
    pub cold_raw: u16,
    flow_script: VecDeque<bool>,
    flow_idle: bool,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn new() -> Self {
        Self {
            hot_raw: 30_000,
            cold_raw: 30_000,
            flow_script: VecDeque::new(),
            // Pull-up idle: switch open.
            flow_idle: true,
        }
    }

    pub fn set_raw(&mut self, hot: u16, cold: u16) {
        self.hot_raw = hot;
        self.cold_raw = cold;
    }

    pub fn script_flow(&mut self, reads: &[bool]) {
        self.flow_script.extend(reads.iter().copied());
    }
}

impl Default for MockSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockSensors {
    fn read_thermistors(&mut self) -> (u16, u16) {
        (self.hot_raw, self.cold_raw)
    }

    fn flow_switch_level(&mut self) -> bool {
        match self.flow_script.pop_front() {
            Some(level) => {
                self.flow_idle = level;
                level
            }
            None => self.flow_idle,
        }
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Manually-advanced clock.  `delay_ms` advances time instead of
/// sleeping, so the debounce settle wait is instant in tests.
pub struct MockClock {
    now_ms: u64,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self { now_ms: 0 }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for MockClock {
    fn ticks_ms(&self) -> u32 {
        wrap_ticks(self.now_ms)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_ms += u64::from(ms);
    }
}

// ── ScriptedRadio ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedRadioError {
    ReadFault,
    WriteFault,
}

/// Radio double: queued inbound bytes, recorded outbound frames, and
/// switchable fault injection on either direction.
pub struct ScriptedRadio {
    inbound: VecDeque<u8>,
    pub sent: Vec<Vec<u8>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl ScriptedRadio {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            sent: Vec::new(),
            fail_reads: false,
            fail_writes: false,
        }
    }

    /// Queue one module notification line (terminator appended).
    pub fn push_line(&mut self, line: &str) {
        self.inbound.extend(line.bytes());
        self.inbound.push_back(b'\n');
    }

    pub fn pending_bytes(&self) -> usize {
        self.inbound.len()
    }

    pub fn sent_strings(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }
}

impl Default for ScriptedRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ScriptedRadio {
    type Error = ScriptedRadioError;

    fn read_byte(&mut self) -> Result<Option<u8>, ScriptedRadioError> {
        if self.fail_reads {
            return Err(ScriptedRadioError::ReadFault);
        }
        Ok(self.inbound.pop_front())
    }

    fn write_frame(&mut self, payload: &[u8]) -> Result<(), ScriptedRadioError> {
        if self.fail_writes {
            return Err(ScriptedRadioError::WriteFault);
        }
        self.sent.push(payload.to_vec());
        Ok(())
    }
}

// ── MockNvs ───────────────────────────────────────────────────

pub struct MockNvs {
    store: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            fail_writes: false,
        }
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<&Vec<u8>> {
        self.store.get(&format!("{}::{}", namespace, key))
    }
}

impl Default for MockNvs {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MockNvs {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let k = format!("{}::{}", namespace, key);
        match self.store.get(&k) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        let k = format!("{}::{}", namespace, key);
        self.store.insert(k, data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Collects emitted events as typed values so tests can assert on exact
/// variants instead of log text.
pub struct RecordingSink {
    pub events: Vec<MeterEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn pulses(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, MeterEvent::FlowPulse { .. }))
            .count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &MeterEvent) {
        self.events.push(event.clone());
    }
}
