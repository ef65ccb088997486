//! Payloads for the synthetic analysis endpoints.
//!
//! These are generated on demand and are not part of the ticking
//! instrument state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Sampled voltage and current traces for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Waveform {
    /// Instantaneous voltage samples.
    pub voltage: Vec<f64>,
    /// Instantaneous current samples.
    pub current: Vec<f64>,
    /// Sample indices, one per point.
    pub time_labels: Vec<u32>,
}

/// One harmonic order of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Harmonic {
    /// Harmonic order, 1 is the fundamental.
    pub order: u8,
    /// Magnitude as a percentage of the fundamental.
    pub magnitude: f64,
    /// Phase in degrees, `[-180, 180]`.
    pub phase: f64,
    /// Same as `magnitude`; kept for dashboard compatibility.
    pub percentage: f64,
}

/// Voltage and current harmonic spectra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HarmonicSpectrum {
    /// Voltage harmonics ordered by order.
    pub voltage_harmonics: Vec<Harmonic>,
    /// Current harmonics ordered by order.
    pub current_harmonics: Vec<Harmonic>,
}

/// A single phasor in polar and rectangular form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Phasor {
    /// Phase label, `L1`..`L3`.
    pub phase: String,
    /// Magnitude.
    pub magnitude: f64,
    /// Angle in degrees.
    pub angle: f64,
    /// Real component.
    pub real: f64,
    /// Imaginary component.
    pub imaginary: f64,
}

/// Three-phase voltage and current phasors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhasorSet {
    /// Voltage phasors L1..L3.
    pub voltage_phasors: Vec<Phasor>,
    /// Current phasors L1..L3.
    pub current_phasors: Vec<Phasor>,
}

/// Spot power-quality readings served by `GET /api/measurements`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpotMeasurements {
    /// Voltage in volts.
    pub voltage: f64,
    /// Current in amperes.
    pub current: f64,
    /// Active power in watts.
    pub power: f64,
    /// Frequency in hertz.
    pub frequency: f64,
    /// True power factor.
    pub power_factor: f64,
    /// Register energy in kilowatt-hours.
    pub energy: f64,
    /// Voltage total harmonic distortion, percent.
    pub thd_voltage: f64,
    /// Current total harmonic distortion, percent.
    pub thd_current: f64,
    /// Voltage crest factor.
    pub crest_factor_voltage: f64,
    /// Current crest factor.
    pub crest_factor_current: f64,
    /// Transformer derating K-factor.
    pub k_factor: f64,
    /// Displacement power factor (fundamental only).
    pub displacement_pf: f64,
    /// Distortion power factor.
    pub distortion_pf: f64,
}
