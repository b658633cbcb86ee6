//! BTU Meter Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single-task polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Clock      │
//! │  (SensorPort)      (EventSink)    (StoragePort)(ClockPort)     │
//! │  E5Transport                                                   │
//! │  (Transport)                                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            MeterService (pure logic)                   │    │
//! │  │  Sampling · Debounce · Accumulate · Report             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  TransmitScheduler (wrap-safe ticks) · CrashLog (NVS ring)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use btumeter::adapters::e5::E5Transport;
use btumeter::adapters::hardware::HardwareAdapter;
use btumeter::adapters::log_sink::LogEventSink;
use btumeter::adapters::nvs::NvsAdapter;
use btumeter::adapters::time::Esp32Clock;
use btumeter::app::ports::{ClockPort, SensorPort};
use btumeter::app::service::{self, MeterService};
use btumeter::config::MeterConfig;
use btumeter::diagnostics::{self, CrashLog};
use btumeter::drivers::{hw_init, watchdog::Watchdog};
use btumeter::settings::CalibrationSettings;

/// Seconds to let the LoRa-E5 boot and rejoin before its first command.
const JOIN_WAIT_SECS: u64 = 8;

/// Seconds to let the module finish the reboot-notice exchange before
/// the loop starts draining its UART.
const NOTICE_DRAIN_SECS: u64 = 7;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  BTU Meter v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    diagnostics::install_panic_handler();

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        error!("HAL init failed: {e} — halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 3. Persistent state ───────────────────────────────────
    // Billing totals live in flash; a meter that cannot reach them
    // must not run and silently zero a customer's counters.
    let mut nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            error!("NVS init failed: {e} — halting");
            #[allow(clippy::empty_loop)]
            loop {}
        }
    };
    let config = MeterConfig::load(&nvs);
    let settings = CalibrationSettings::load(&nvs);
    info!(
        "Meter record: interval={}s heat={} flow={}",
        config.secs_between_xmit(),
        config.heat_count,
        config.flow_count
    );

    // ── 4. Crash log replay ───────────────────────────────────
    let mut crash_log = CrashLog::new();
    crash_log.init(&nvs);
    crash_log.replay(&nvs);

    // ── 5. Construct adapters ─────────────────────────────────
    let mut clock = Esp32Clock::new();
    let mut hw = HardwareAdapter::new();
    let mut sink = LogEventSink::new();
    let mut radio = E5Transport::new();

    // ── 6. Radio boot handshake ───────────────────────────────
    // The module joins on its own after power-up; give it time before
    // the first command, then tell the backend we restarted so counter
    // discontinuities can be attributed.
    info!("Waiting {JOIN_WAIT_SECS}s for radio join");
    std::thread::sleep(std::time::Duration::from_secs(JOIN_WAIT_SECS));
    if let Err(e) = radio.send_reboot() {
        warn!("Reboot notice failed: {e:?}");
    }
    std::thread::sleep(std::time::Duration::from_secs(NOTICE_DRAIN_SECS));

    // ── 7. Construct the metering service ─────────────────────
    let initial_level = hw.flow_switch_level();
    let mut service = MeterService::new(config, settings, initial_level, clock.ticks_ms());

    // Subscribe only now — the handshake above sleeps longer than the
    // watchdog timeout.
    let watchdog = Watchdog::new();

    info!("System ready. Entering metering loop.");

    // ── 8. Metering loop ──────────────────────────────────────
    loop {
        if service::abort_requested() {
            break;
        }

        if let Err(e) = service.run_cycle(&mut hw, &mut clock, &mut radio, &mut nvs, &mut sink) {
            error!("Cycle fault: {e} — pausing {}ms", service::FAULT_PAUSE_MS);
            clock.delay_ms(service::FAULT_PAUSE_MS);
        }

        diagnostics::note_cycle(service.cycle_count());
        watchdog.feed();
    }

    info!(
        "Metering loop exited after {} cycles ({}s uptime)",
        service.cycle_count(),
        clock.uptime_secs()
    );
    Ok(())
}
