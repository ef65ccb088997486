//! Instrument configuration and the projections served to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::measurement::Measurements;
use crate::peripherals::Peripherals;

/// Caller-adjustable instrument configuration.
///
/// The nominal electrical values feed the updater; `phase_config` and
/// `mcu_config` are descriptive labels the simulator stores verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InstrumentConfig {
    /// Nominal line voltage in volts.
    pub voltage: f64,
    /// Nominal load current in amperes.
    pub current: f64,
    /// Nominal line frequency in hertz.
    pub frequency: f64,
    /// Power factor in `(0, 1]`.
    pub power_factor: f64,
    /// Phase arrangement label, e.g. `single` or `three`.
    pub phase_config: String,
    /// Free-form MCU descriptor.
    pub mcu_config: serde_json::Value,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            voltage: 230.0,
            current: 5.0,
            frequency: 50.0,
            power_factor: 0.95,
            phase_config: String::from("single"),
            mcu_config: default_mcu_config(),
        }
    }
}

/// The MCU descriptor the instrument boots with.
pub fn default_mcu_config() -> serde_json::Value {
    serde_json::json!({
        "family": "STM32F4",
        "part_number": "STM32F407VG",
        "architecture": "ARM Cortex-M4",
    })
}

/// Response body for `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InstrumentStatus {
    /// Whether the updater is refreshing measurements.
    pub is_running: bool,
    /// Whether a firmware image has been accepted.
    pub firmware_loaded: bool,
    /// Latest measurements.
    pub measurements: Measurements,
    /// Latest peripheral snapshot.
    pub peripherals: Peripherals,
}

/// Live measurement frame pushed over the `WebSocket` after each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MeasurementBroadcast {
    /// Number of ticks that have updated the measurements so far.
    pub tick: u64,
    /// When the tick ran.
    pub timestamp: DateTime<Utc>,
    /// Measurements produced by the tick.
    pub measurements: Measurements,
}
