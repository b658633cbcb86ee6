//! Integration tests for the full metering cycle.
//!
//! These run on the host (x86_64) and drive `MeterService::run_cycle`
//! through scripted mock adapters, verifying the whole chain from raw
//! sensor readings down to persisted NVS bytes and transmitted frames.

use crate::mock_hw::{MockClock, MockNvs, MockSensors, RecordingSink, ScriptedRadio};

use btumeter::app::accumulator;
use btumeter::app::events::MeterEvent;
use btumeter::app::service::{CycleReport, MeterService};
use btumeter::config::{CONFIG_KEY, MeterConfig, NVS_NAMESPACE};
use btumeter::error::{Error, TransportError};
use btumeter::link::uplink;
use btumeter::sensors::SAMPLE_BUF_LEN;
use btumeter::sensors::thermistor::temperature_f;
use btumeter::settings::CalibrationSettings;

// ── Test rig ─────────────────────────────────────────────────

struct Rig {
    service: MeterService,
    hw: MockSensors,
    clock: MockClock,
    radio: ScriptedRadio,
    nvs: MockNvs,
    sink: RecordingSink,
}

impl Rig {
    /// Fresh meter: default record, default calibration, switch open.
    fn new() -> Self {
        Self {
            service: MeterService::new(
                MeterConfig::default(),
                CalibrationSettings::default(),
                true,
                0,
            ),
            hw: MockSensors::new(),
            clock: MockClock::new(),
            radio: ScriptedRadio::new(),
            nvs: MockNvs::new(),
            sink: RecordingSink::new(),
        }
    }

    fn cycle(&mut self) -> btumeter::error::Result<CycleReport> {
        self.service.run_cycle(
            &mut self.hw,
            &mut self.clock,
            &mut self.radio,
            &mut self.nvs,
            &mut self.sink,
        )
    }

    /// Run `n` cycles that are all expected to succeed.
    fn run(&mut self, n: usize) {
        for _ in 0..n {
            self.cycle().expect("cycle should succeed");
        }
    }

    /// Fill both sample buffers so the means equal the scripted raws.
    fn warm_up(&mut self) {
        self.run(SAMPLE_BUF_LEN);
    }

    fn persisted_record(&self) -> Vec<u8> {
        self.nvs
            .raw(NVS_NAMESPACE, CONFIG_KEY)
            .expect("meter record should be persisted")
            .clone()
    }
}

// ── Flow pulse accounting ────────────────────────────────────

#[test]
fn flow_closure_accumulates_and_persists() {
    let mut rig = Rig::new();
    rig.hw.set_raw(20_000, 30_000);
    rig.warm_up();

    // Hot line hotter than cold: the pulse carries real heat.
    let settings = CalibrationSettings::default();
    let t_hot = temperature_f(20_000.0, &settings);
    let t_cold = temperature_f(30_000.0, &settings);
    let delta = t_hot - t_cold;
    assert!(delta > 0.0, "test fixture expects a positive differential");

    // Switch closes and stays closed through the settle wait.
    rig.hw.script_flow(&[false, false]);
    let report = rig.cycle().unwrap();

    assert!(report.flow_edge.is_some(), "close edge should be reported");
    let expected_heat = accumulator::add_heat(0, delta);
    assert_eq!(rig.service.config().flow_count, 1);
    assert_eq!(rig.service.config().heat_count, expected_heat);

    // The exact record bytes must already be in storage.
    let mut expected = MeterConfig::default();
    expected.heat_count = expected_heat;
    expected.flow_count = 1;
    assert_eq!(rig.persisted_record(), expected.pack().to_vec());

    // And the pulse was announced.
    assert_eq!(rig.sink.pulses(), 1);
    match rig.sink.events.last() {
        Some(MeterEvent::FlowPulse {
            heat_count,
            flow_count,
            t_hot_f,
            t_cold_f,
        }) => {
            assert_eq!(*heat_count, expected_heat);
            assert_eq!(*flow_count, 1);
            assert!((t_hot_f - t_hot).abs() < 1e-9);
            assert!((t_cold_f - t_cold).abs() < 1e-9);
        }
        other => panic!("expected FlowPulse, got {:?}", other),
    }
}

#[test]
fn switch_bounce_does_not_count() {
    let mut rig = Rig::new();
    rig.warm_up();

    // Closed at observe, open again after the settle wait: a bounce.
    rig.hw.script_flow(&[false, true]);
    rig.cycle().unwrap();

    assert_eq!(rig.service.config().flow_count, 0);
    assert_eq!(rig.sink.pulses(), 0);
    assert!(
        rig.nvs.raw(NVS_NAMESPACE, CONFIG_KEY).is_none(),
        "a rejected bounce must not touch storage"
    );
}

#[test]
fn reopening_the_switch_adds_nothing() {
    let mut rig = Rig::new();
    rig.warm_up();

    // Close (one pulse), then re-open (no pulse).
    rig.hw.script_flow(&[false, false]);
    rig.cycle().unwrap();
    rig.hw.script_flow(&[true, true]);
    rig.cycle().unwrap();

    assert_eq!(rig.service.config().flow_count, 1, "open edge must not count");
    assert_eq!(rig.sink.pulses(), 1);
}

#[test]
fn equal_temperatures_add_flow_but_no_heat() {
    let mut rig = Rig::new();
    rig.hw.set_raw(30_000, 30_000);
    rig.warm_up();

    rig.hw.script_flow(&[false, false]);
    rig.cycle().unwrap();

    assert_eq!(rig.service.config().flow_count, 1);
    assert_eq!(rig.service.config().heat_count, 0);
}

// ── Scheduled reporting ──────────────────────────────────────

#[test]
fn report_fires_once_per_interval_with_exact_payload() {
    let mut rig = Rig::new();
    rig.hw.set_raw(30_000, 30_000);
    rig.warm_up();
    assert!(rig.radio.sent.is_empty(), "nothing should transmit early");

    // Jump past the default 600 s interval.
    rig.clock.advance(600_000);
    let report = rig.cycle().unwrap();
    assert!(report.uplink_sent);

    let settings = CalibrationSettings::default();
    let t = temperature_f(30_000.0, &settings);
    let expected = uplink::encode(0, 0, t, t).unwrap();

    let sent = rig.radio.sent_strings();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], expected.as_str());
    assert_eq!(sent[0].len(), 22);
    assert!(sent[0].starts_with("05"));

    // The record is persisted alongside the send, and the slot is
    // consumed: the very next cycle stays quiet.
    assert_eq!(rig.persisted_record(), rig.service.config().pack().to_vec());
    let report = rig.cycle().unwrap();
    assert!(!report.uplink_sent);
    assert_eq!(rig.radio.sent.len(), 1);

    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, MeterEvent::UplinkSent { .. })),
        "uplink should be announced"
    );
}

// ── Downlink handling ────────────────────────────────────────

#[test]
fn downlink_interval_command_applies_and_persists() {
    let mut rig = Rig::new();
    rig.warm_up();

    // 0x0078 = 120 seconds.
    rig.radio.push_line("+MSG: PORT: 8; RX: \"0078\"");
    while rig.radio.pending_bytes() > 0 {
        rig.cycle().unwrap();
    }

    assert_eq!(rig.service.config().secs_between_xmit(), 120);

    let mut expected = MeterConfig::default();
    expected.set_secs_between_xmit(120).unwrap();
    assert_eq!(rig.persisted_record(), expected.pack().to_vec());

    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, MeterEvent::DownlinkLine { .. })),
        "raw line should be announced"
    );
    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, MeterEvent::IntervalChanged { secs: 120 })),
        "interval change should be announced"
    );
}

#[test]
fn module_chatter_changes_nothing() {
    let mut rig = Rig::new();
    rig.warm_up();

    rig.radio.push_line("+MSGHEX: Done");
    rig.radio.push_line("+MSG: FPENDING");
    while rig.radio.pending_bytes() > 0 {
        rig.cycle().unwrap();
    }

    assert_eq!(
        rig.service.config().secs_between_xmit(),
        MeterConfig::default().secs_between_xmit()
    );
    assert!(rig.nvs.raw(NVS_NAMESPACE, CONFIG_KEY).is_none());
}

// ── Fault containment ────────────────────────────────────────

#[test]
fn radio_read_fault_is_contained_to_one_cycle() {
    let mut rig = Rig::new();
    rig.warm_up();

    rig.radio.fail_reads = true;
    let err = rig.cycle().unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::ReadFailed)));

    // Next cycle recovers with no residue.
    rig.radio.fail_reads = false;
    rig.cycle().unwrap();
    assert_eq!(rig.service.config().flow_count, 0);
}

#[test]
fn storage_fault_keeps_totals_in_ram() {
    let mut rig = Rig::new();
    rig.warm_up();

    rig.nvs.fail_writes = true;
    rig.hw.script_flow(&[false, false]);
    let err = rig.cycle().unwrap_err();
    assert!(matches!(err, Error::Storage(_)));

    // The pulse is still accounted in RAM; the next successful save
    // carries it to flash.
    assert_eq!(rig.service.config().flow_count, 1);

    rig.nvs.fail_writes = false;
    rig.hw.script_flow(&[true, true]);
    rig.cycle().unwrap();
    rig.hw.script_flow(&[false, false]);
    rig.cycle().unwrap();

    assert_eq!(rig.service.config().flow_count, 2);
    let record = rig.persisted_record();
    assert_eq!(record, rig.service.config().pack().to_vec());
}
