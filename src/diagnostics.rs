//! Crash logging.
//!
//! The meter's operating model is crash-and-resume: totals survive in
//! NVS, so after a panic the device reboots and keeps metering.  To keep
//! that model honest, a panic hook persists up to 4 crash entries in an
//! NVS ring buffer under the "crash" namespace, and boot replays them
//! into the log as warnings.  A meter that reboots nightly at 03:00
//! should say so on the next console attach, not hide it.

use core::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

const CRASH_RING_SLOTS: usize = 4;
const CRASH_NAMESPACE: &str = "crash";
const CRASH_INDEX_KEY: &str = "idx";

/// Metering cycles completed, mirrored for the panic hook.  The loop
/// driver updates this once per iteration; the hook cannot reach the
/// service struct.  Low 32 bits only, which outlasts any realistic
/// uptime at one cycle per poll.
static LAST_CYCLE: AtomicU32 = AtomicU32::new(0);

/// Record the current cycle count for crash attribution.
pub fn note_cycle(cycle_count: u64) {
    LAST_CYCLE.store(cycle_count as u32, Ordering::Relaxed);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashEntry {
    pub uptime_secs: u64,
    /// Metering cycles completed when the panic fired.
    pub cycle_count: u32,
    pub reason: heapless::String<64>,
}

impl CrashEntry {
    pub fn new(uptime_secs: u64, cycle_count: u32, reason: &str) -> Self {
        let mut r = heapless::String::new();
        let _ = r.push_str(&reason[..reason.len().min(63)]);
        Self {
            uptime_secs,
            cycle_count,
            reason: r,
        }
    }
}

/// NVS-backed ring buffer for crash entries.
#[derive(Default)]
pub struct CrashLog {
    write_index: usize,
}

impl CrashLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the write index from NVS, or default to 0.
    pub fn init(&mut self, nvs: &dyn crate::app::ports::StoragePort) {
        let mut buf = [0u8; 4];
        if let Ok(4) = nvs.read(CRASH_NAMESPACE, CRASH_INDEX_KEY, &mut buf) {
            self.write_index = u32::from_le_bytes(buf) as usize % CRASH_RING_SLOTS;
        }
    }

    /// Write a crash entry to the next ring slot and advance the index.
    pub fn write_entry(
        &mut self,
        nvs: &mut dyn crate::app::ports::StoragePort,
        entry: &CrashEntry,
    ) {
        let slot_key = Self::slot_key(self.write_index);
        if let Ok(bytes) = postcard::to_allocvec(entry) {
            let _ = nvs.write(CRASH_NAMESPACE, &slot_key, &bytes);
        }

        self.write_index = (self.write_index + 1) % CRASH_RING_SLOTS;
        let idx_bytes = (self.write_index as u32).to_le_bytes();
        let _ = nvs.write(CRASH_NAMESPACE, CRASH_INDEX_KEY, &idx_bytes);
    }

    /// Read all stored crash entries (up to 4).
    pub fn read_all(
        &self,
        nvs: &dyn crate::app::ports::StoragePort,
    ) -> heapless::Vec<CrashEntry, 4> {
        let mut entries = heapless::Vec::new();
        for i in 0..CRASH_RING_SLOTS {
            let slot_key = Self::slot_key(i);
            let mut buf = [0u8; 128];
            if let Ok(len) = nvs.read(CRASH_NAMESPACE, &slot_key, &mut buf) {
                if let Ok(entry) = postcard::from_bytes::<CrashEntry>(&buf[..len]) {
                    let _ = entries.push(entry);
                }
            }
        }
        entries
    }

    /// Warn-log every stored entry.  Called once at boot so a field
    /// device's crash history shows up on the console without tooling.
    pub fn replay(&self, nvs: &dyn crate::app::ports::StoragePort) {
        let entries = self.read_all(nvs);
        if entries.is_empty() {
            log::info!("diagnostics: no stored crash entries");
            return;
        }
        for entry in &entries {
            log::warn!(
                "diagnostics: prior crash at uptime {}s, cycle {}: {}",
                entry.uptime_secs,
                entry.cycle_count,
                entry.reason
            );
        }
    }

    /// Erase all crash entries and reset the index (provisioning/bench).
    pub fn clear(&mut self, nvs: &mut dyn crate::app::ports::StoragePort) {
        for i in 0..CRASH_RING_SLOTS {
            let slot_key = Self::slot_key(i);
            let _ = nvs.delete(CRASH_NAMESPACE, &slot_key);
        }
        let _ = nvs.delete(CRASH_NAMESPACE, CRASH_INDEX_KEY);
        self.write_index = 0;
    }

    pub fn count(&self, nvs: &dyn crate::app::ports::StoragePort) -> usize {
        (0..CRASH_RING_SLOTS)
            .filter(|i| nvs.exists(CRASH_NAMESPACE, &Self::slot_key(*i)))
            .count()
    }

    fn slot_key(index: usize) -> heapless::String<16> {
        let mut s = heapless::String::new();
        let _ = core::fmt::Write::write_fmt(&mut s, format_args!("c{}", index));
        s
    }
}

// ───────────────────────────────────────────────────────────────
// Custom panic handler — writes a CrashEntry to NVS before reset
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that persists crash info to NVS.
///
/// Must be called once during init, after NVS is ready.
/// On panic, captures the reason string and writes a CrashEntry
/// to the NVS ring buffer before the default panic handler aborts.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };

        log::error!("PANIC: {}", reason);

        #[cfg(target_os = "espidf")]
        {
            // SAFETY: esp_timer_get_time is safe to call from panic context
            // (it is a simple RTC counter read with no dynamic allocation).
            let uptime = (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000_000;
            let cycle = LAST_CYCLE.load(Ordering::Relaxed);
            let entry = CrashEntry::new(uptime, cycle, reason);

            // Attempt to write the crash entry; if NVS is unavailable at this
            // point (e.g. the panic occurred before init), we log and skip.
            // We do NOT call nvs_flash_init() here — that is not safe in
            // panic context. Instead we rely on the existing NVS session
            // established in main(). If it was never initialised, the write
            // will silently fail, which is acceptable.
            match crate::adapters::nvs::NvsAdapter::new() {
                Ok(mut nvs) => {
                    let mut crash_log = CrashLog::new();
                    crash_log.init(&nvs);
                    crash_log.write_entry(&mut nvs, &entry);
                }
                Err(_) => {
                    log::error!("Panic handler: NVS unavailable — crash entry not persisted");
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let cycle = LAST_CYCLE.load(Ordering::Relaxed);
            log::error!("Crash entry (simulation): cycle {} — {}", cycle, reason);
        }
    }));
}
