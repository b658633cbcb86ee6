//! Metering service — the hexagonal core.
//!
//! [`MeterService`] owns the sample buffers, flow debouncer, transmit
//! scheduler and downlink framer.  It exposes a clean, hardware-agnostic
//! API.  All I/O flows through port traits injected at call sites, making
//! the entire metering loop testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!   ClockPort ──▶ │      MeterService       │ ──▶ Transport (radio)
//!                 │ sample · count · report │
//!                 └───────────┬─────────────┘
//!                             ▼
//!                        StoragePort
//! ```
//!
//! One [`run_cycle`](MeterService::run_cycle) call is one pass of the
//! meter's tight loop, split into named phases so the driver can sit in
//! a plain `loop`, a FreeRTOS task, or a test harness.

use core::sync::atomic::{AtomicBool, Ordering};

use log::warn;

use crate::config::MeterConfig;
use crate::error::{Result, TransportError};
use crate::link::framer::LineFramer;
use crate::link::transport::Transport;
use crate::link::uplink;
use crate::scheduler::TransmitScheduler;
use crate::sensors::thermistor::{self, TempReading};
use crate::sensors::{FlowDebouncer, FlowEdge, SETTLE_MS, SampleBuffers};
use crate::settings::CalibrationSettings;

use super::events::MeterEvent;
use super::ports::{ClockPort, EventSink, SensorPort, StoragePort};
use super::{accumulator, downlink};

/// How long the loop driver pauses after a cycle fault before resuming.
pub const FAULT_PAUSE_MS: u32 = 1000;

// ───────────────────────────────────────────────────────────────
// Operator abort
// ───────────────────────────────────────────────────────────────

/// Set from an operator context (console break, debug command).  The
/// loop driver polls it once per iteration; it is the only way the
/// metering loop terminates.
static ABORT_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Ask the metering loop to stop after the current iteration.
pub fn request_abort() {
    ABORT_REQUESTED.store(true, Ordering::Relaxed);
}

/// Whether an abort has been requested.
pub fn abort_requested() -> bool {
    ABORT_REQUESTED.load(Ordering::Relaxed)
}

/// Re-arm after an abort (bench harnesses and tests).
pub fn clear_abort() {
    ABORT_REQUESTED.store(false, Ordering::Relaxed);
}

// ───────────────────────────────────────────────────────────────
// Cycle report
// ───────────────────────────────────────────────────────────────

/// What one loop cycle did.  The driver only logs it; tests assert on it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CycleReport {
    /// A debounced flow-switch edge was committed this cycle.
    pub flow_edge: Option<FlowEdge>,
    /// A complete downlink line was dispatched this cycle.
    pub downlink_line: bool,
    /// A periodic report was transmitted this cycle.
    pub uplink_sent: bool,
}

// ───────────────────────────────────────────────────────────────
// MeterService
// ───────────────────────────────────────────────────────────────

/// The metering service orchestrates all domain logic.
pub struct MeterService {
    config: MeterConfig,
    settings: CalibrationSettings,
    buffers: SampleBuffers,
    debouncer: FlowDebouncer,
    scheduler: TransmitScheduler,
    framer: LineFramer,
    cycle_count: u64,
}

impl MeterService {
    /// Construct the service from persisted state.
    ///
    /// `initial_flow_level` seeds the debouncer with the switch level at
    /// boot so a meter powered up mid-flow does not count a phantom
    /// pulse.  `now` seeds the scheduler: the first report goes out one
    /// full interval after boot, never immediately.
    pub fn new(
        config: MeterConfig,
        settings: CalibrationSettings,
        initial_flow_level: bool,
        now: u32,
    ) -> Self {
        Self {
            config,
            settings,
            buffers: SampleBuffers::new(),
            debouncer: FlowDebouncer::new(initial_flow_level),
            scheduler: TransmitScheduler::new(now),
            framer: LineFramer::new(),
            cycle_count: 0,
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full metering cycle.
    ///
    /// Phases, in loop order:
    /// 1. **Sample** — one raw reading per thermistor into the buffers.
    /// 2. **Debounce** — flow-switch edge detection with a settle wait;
    ///    a committed close edge prices and persists one pulse.
    /// 3. **Downlink** — poll one radio byte, dispatch a completed line.
    /// 4. **Report** — transmit and persist when the interval elapses.
    ///
    /// An `Err` leaves the service consistent and resumable; the driver
    /// applies the log-pause-continue policy and calls again.
    pub fn run_cycle(
        &mut self,
        hw: &mut impl SensorPort,
        clock: &mut impl ClockPort,
        radio: &mut impl Transport,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<CycleReport> {
        self.cycle_count += 1;
        let mut report = CycleReport::default();

        // 1. Sample thermistors into the shared-index ring buffers.
        let (hot_raw, cold_raw) = hw.read_thermistors();
        self.buffers.push(hot_raw, cold_raw);

        // 2. Flow-switch debounce.  A level change must survive the
        //    settle wait before it becomes an edge.
        let level = hw.flow_switch_level();
        if self.debouncer.observe(level) {
            clock.delay_ms(SETTLE_MS);
            let settled = hw.flow_switch_level();
            if let Some(edge) = self.debouncer.confirm(settled) {
                report.flow_edge = Some(edge);
                if edge == FlowEdge::Closed {
                    self.record_pulse(store, sink)?;
                }
            }
        }

        // 3. Downlink: at most one byte per cycle, so a talkative module
        //    can never starve the sampling cadence.
        match radio.read_byte() {
            Ok(Some(byte)) => {
                if let Some(line) = self.framer.feed(byte) {
                    report.downlink_line = true;
                    sink.emit(&MeterEvent::DownlinkLine { line: line.clone() });
                    downlink::handle_line(&line, &mut self.config, store, sink)?;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("radio read failed: {e:?}");
                return Err(TransportError::ReadFailed.into());
            }
        }

        // 4. Periodic report.  The slot is consumed before the send so a
        //    failed transmit waits for the next interval instead of
        //    retrying every cycle.
        let now = clock.ticks_ms();
        if self.scheduler.due(now, self.config.secs_between_xmit()) {
            self.scheduler.mark_sent(now);
            self.send_uplink(radio, store, sink)?;
            report.uplink_sent = true;
        }

        Ok(report)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Live meter record (interval + counters).
    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Temperatures derived from the current buffer means.
    pub fn current_temps(&self) -> TempReading {
        thermistor::current_temps(&self.buffers, &self.settings)
    }

    /// Total metering cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Price one confirmed pulse, persist the record, then announce it.
    fn record_pulse(
        &mut self,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let temps = thermistor::current_temps(&self.buffers, &self.settings);
        accumulator::apply_pulse(&mut self.config, temps.delta_f);
        self.config.save(store)?;
        sink.emit(&MeterEvent::FlowPulse {
            heat_count: self.config.heat_count,
            flow_count: self.config.flow_count,
            t_hot_f: temps.hot_f,
            t_cold_f: temps.cold_f,
        });
        Ok(())
    }

    /// Build and send one report.  Counters are persisted only after the
    /// radio accepted the payload, so a dead radio cannot wear the flash.
    fn send_uplink(
        &mut self,
        radio: &mut impl Transport,
        store: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let temps = thermistor::current_temps(&self.buffers, &self.settings);
        let payload = uplink::encode(
            self.config.heat_count,
            self.config.flow_count,
            temps.hot_f,
            temps.cold_f,
        )?;
        radio.write_frame(payload.as_bytes()).map_err(|e| {
            warn!("radio write failed: {e:?}");
            TransportError::WriteFailed
        })?;
        self.config.save(store)?;
        sink.emit(&MeterEvent::UplinkSent { payload });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CycleReport, MeterService, abort_requested, clear_abort, request_abort};
    use crate::app::events::MeterEvent;
    use crate::app::ports::{ClockPort, EventSink, SensorPort, StorageError, StoragePort};
    use crate::config::MeterConfig;
    use crate::link::transport::NullTransport;
    use crate::settings::CalibrationSettings;

    struct FixedSensors {
        hot: u16,
        cold: u16,
        level: bool,
    }
    impl SensorPort for FixedSensors {
        fn read_thermistors(&mut self) -> (u16, u16) {
            (self.hot, self.cold)
        }
        fn flow_switch_level(&mut self) -> bool {
            self.level
        }
    }

    struct FrozenClock(u32);
    impl ClockPort for FrozenClock {
        fn ticks_ms(&self) -> u32 {
            self.0
        }
        fn delay_ms(&mut self, _ms: u32) {}
    }

    struct NoStore;
    impl StoragePort for NoStore {
        fn read(&self, _: &str, _: &str, _: &mut [u8]) -> Result<usize, StorageError> {
            Err(StorageError::NotFound)
        }
        fn write(&mut self, _: &str, _: &str, _: &[u8]) -> Result<(), StorageError> {
            Ok(())
        }
        fn delete(&mut self, _: &str, _: &str) -> Result<(), StorageError> {
            Ok(())
        }
        fn exists(&self, _: &str, _: &str) -> bool {
            false
        }
    }

    struct DropSink;
    impl EventSink for DropSink {
        fn emit(&mut self, _event: &MeterEvent) {}
    }

    #[test]
    fn idle_cycle_does_nothing_visible() {
        let mut service = MeterService::new(
            MeterConfig::default(),
            CalibrationSettings::default(),
            true,
            0,
        );
        let report = service
            .run_cycle(
                &mut FixedSensors {
                    hot: 30_000,
                    cold: 30_000,
                    level: true,
                },
                &mut FrozenClock(5),
                &mut NullTransport,
                &mut NoStore,
                &mut DropSink,
            )
            .unwrap();
        assert_eq!(report, CycleReport::default());
        assert_eq!(service.cycle_count(), 1);
        assert_eq!(service.config().flow_count, 0);
    }

    #[test]
    fn abort_flag_round_trips() {
        clear_abort();
        assert!(!abort_requested());
        request_abort();
        assert!(abort_requested());
        clear_abort();
        assert!(!abort_requested());
    }
}
