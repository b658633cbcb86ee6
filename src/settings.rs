//! Field calibration settings — the independently re-flashed record.
//!
//! Everything the temperature conversion needs that is *installation*
//! specific rather than runtime state: the thermistor's Steinhart–Hart
//! coefficients, the divider resistance, the ADC full-scale count and the
//! delta-T nulling offset measured during field commissioning.
//!
//! Stored as a postcard blob under its own NVS key so a technician can
//! rewrite calibration without touching the accumulated totals, and the
//! runtime never writes it back.  Loaded once at boot; immutable for the
//! rest of the run.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{StoragePort, StorageError};
use crate::config::NVS_NAMESPACE;

/// NVS key of the calibration settings blob.
pub const SETTINGS_KEY: &str = "fieldcal";

/// Steinhart–Hart cubic coefficients for a specific thermistor model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteinhartCoefficients {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

impl SteinhartCoefficients {
    /// BAPI 10K-3 thermistor (the standard sensor shipped with the meter).
    pub const BAPI_10K_3: Self = Self {
        c1: 0.001_028_17,
        c2: 0.000_239_281,
        c3: 1.561_19e-7,
    };

    /// Tekmar 071 sensor, for retrofits onto existing wells.
    pub const TEKMAR_071: Self = Self {
        c1: 0.001_124_476,
        c2: 0.000_234_82,
        c3: 8.544_09e-8,
    };
}

/// The complete field settings record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSettings {
    /// Delta-T nulling offset in °F.  Half is added to the hot reading and
    /// half subtracted from the cold reading, so a zero true differential
    /// reads as zero after both sensors' systematic bias is split out.
    pub delta_t_calib_f: f64,
    /// Thermistor model coefficients.
    pub coefficients: SteinhartCoefficients,
    /// Series divider resistance in ohms.
    pub divider_ohms: f64,
    /// ADC full-scale count; raw samples span `[0, adc_max]`.
    pub adc_max: u16,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            delta_t_calib_f: 0.0,
            coefficients: SteinhartCoefficients::BAPI_10K_3,
            divider_ohms: 4_990.0,
            adc_max: 65_535,
        }
    }
}

impl CalibrationSettings {
    /// A record the conversion math can safely divide by.
    fn is_sane(&self) -> bool {
        self.divider_ohms > 0.0 && self.adc_max > 0
    }

    /// Load the settings blob, falling back to the compiled-in defaults when
    /// the key is absent, undecodable or insane.  Never fails.
    pub fn load(store: &impl StoragePort) -> Self {
        let mut buf = [0u8; 128];
        match store.read(NVS_NAMESPACE, SETTINGS_KEY, &mut buf) {
            Ok(n) => match postcard::from_bytes::<Self>(&buf[..n]) {
                Ok(settings) if settings.is_sane() => {
                    info!(
                        "settings: loaded (offset={:.2}F divider={}ohm)",
                        settings.delta_t_calib_f, settings.divider_ohms
                    );
                    settings
                }
                Ok(_) => {
                    warn!("settings: stored record fails sanity check — using defaults");
                    Self::default()
                }
                Err(_) => {
                    warn!("settings: stored record undecodable — using defaults");
                    Self::default()
                }
            },
            Err(StorageError::NotFound) => {
                info!("settings: no field calibration stored — using defaults");
                Self::default()
            }
            Err(e) => {
                warn!("settings: load failed ({e}) — using defaults");
                Self::default()
            }
        }
    }

    /// Write the settings blob.  Used by the provisioning path, never by the
    /// metering loop.
    pub fn save(&self, store: &mut impl StoragePort) -> Result<(), StorageError> {
        let mut buf = [0u8; 128];
        let encoded = postcard::to_slice(self, &mut buf).map_err(|_| StorageError::Full)?;
        store.write(NVS_NAMESPACE, SETTINGS_KEY, encoded)
    }
}
