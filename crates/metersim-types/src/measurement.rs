//! Derived electrical measurements.
//!
//! [`Measurements`] is the sub-record the updater overwrites on every tick.
//! Field order is significant: it drives both the JSON object order and
//! the row order of the CSV export.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Measurements derived from the instrument configuration each tick.
///
/// Every field except `energy` is recomputed from scratch; `energy` is an
/// accumulator carried across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Measurements {
    /// RMS voltage in volts.
    pub voltage_rms: f64,
    /// RMS current in amperes.
    pub current_rms: f64,
    /// Active power in watts.
    pub active_power: f64,
    /// Reactive power in volt-amperes reactive.
    pub reactive_power: f64,
    /// Apparent power in volt-amperes.
    pub apparent_power: f64,
    /// Dimensionless power factor.
    pub power_factor: f64,
    /// Line frequency in hertz.
    pub frequency: f64,
    /// Cumulative energy in kilowatt-hours.
    pub energy: f64,
}

impl Measurements {
    /// All-zero measurements, as after start-up or reset.
    pub const ZERO: Self = Self {
        voltage_rms: 0.0,
        current_rms: 0.0,
        active_power: 0.0,
        reactive_power: 0.0,
        apparent_power: 0.0,
        power_factor: 0.0,
        frequency: 0.0,
        energy: 0.0,
    };

    /// Read a single field by name.
    pub const fn get(&self, field: MeasurementField) -> f64 {
        match field {
            MeasurementField::VoltageRms => self.voltage_rms,
            MeasurementField::CurrentRms => self.current_rms,
            MeasurementField::ActivePower => self.active_power,
            MeasurementField::ReactivePower => self.reactive_power,
            MeasurementField::ApparentPower => self.apparent_power,
            MeasurementField::PowerFactor => self.power_factor,
            MeasurementField::Frequency => self.frequency,
            MeasurementField::Energy => self.energy,
        }
    }

    /// Iterate `(field, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (MeasurementField, f64)> + '_ {
        MeasurementField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }
}

/// Names one field of [`Measurements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementField {
    /// `voltage_rms`
    VoltageRms,
    /// `current_rms`
    CurrentRms,
    /// `active_power`
    ActivePower,
    /// `reactive_power`
    ReactivePower,
    /// `apparent_power`
    ApparentPower,
    /// `power_factor`
    PowerFactor,
    /// `frequency`
    Frequency,
    /// `energy`
    Energy,
}

impl MeasurementField {
    /// Every field, in [`Measurements`] declaration order.
    pub const ALL: [Self; 8] = [
        Self::VoltageRms,
        Self::CurrentRms,
        Self::ActivePower,
        Self::ReactivePower,
        Self::ApparentPower,
        Self::PowerFactor,
        Self::Frequency,
        Self::Energy,
    ];

    /// The snake-case parameter name used in JSON and CSV output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::VoltageRms => "voltage_rms",
            Self::CurrentRms => "current_rms",
            Self::ActivePower => "active_power",
            Self::ReactivePower => "reactive_power",
            Self::ApparentPower => "apparent_power",
            Self::PowerFactor => "power_factor",
            Self::Frequency => "frequency",
            Self::Energy => "energy",
        }
    }

    /// The display unit. Power factor is dimensionless and has none.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::VoltageRms => "V",
            Self::CurrentRms => "A",
            Self::ActivePower => "W",
            Self::ReactivePower => "VAR",
            Self::ApparentPower => "VA",
            Self::PowerFactor => "",
            Self::Frequency => "Hz",
            Self::Energy => "kWh",
        }
    }
}
