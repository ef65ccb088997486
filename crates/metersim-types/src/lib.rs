//! Shared type definitions for the smart meter simulator.
//!
//! Every payload the simulator serves over its HTTP API is defined here so
//! the core, the API layer, and the browser dashboard agree on one shape.
//! Types flow to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`measurement`] -- Derived electrical measurements and their units
//! - [`peripherals`] -- Simulated MCU peripheral snapshot (GPIO, ADC, timers)
//! - [`events`] -- Tamper events and protocol/UART exchange records
//! - [`instrument`] -- Instrument configuration and status projections
//! - [`analysis`] -- Synthetic waveform, harmonic, and phasor payloads

pub mod analysis;
pub mod events;
pub mod instrument;
pub mod measurement;
pub mod peripherals;

// Re-export all public types at crate root for convenience.
pub use analysis::{Harmonic, HarmonicSpectrum, Phasor, PhasorSet, SpotMeasurements, Waveform};
pub use events::{Direction, ProtocolLogEntry, TamperEvent, UartLogEntry};
pub use instrument::{InstrumentConfig, InstrumentStatus, MeasurementBroadcast, default_mcu_config};
pub use measurement::{MeasurementField, Measurements};
pub use peripherals::{
    ADC_CHANNEL_COUNT, ADC_MAX_VOLTAGE, AdcChannel, GPIO_PIN_COUNT, GpioPin, Peripherals,
    PinDirection, TIMER_COUNT, TIMER_DEFAULT_PERIOD, TimerChannel,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the dashboard.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Files land in `bindings/` relative to
        // the crate root.
        use ts_rs::TS;

        // Measurements
        let _ = crate::measurement::Measurements::export_all();

        // Peripherals
        let _ = crate::peripherals::PinDirection::export_all();
        let _ = crate::peripherals::GpioPin::export_all();
        let _ = crate::peripherals::AdcChannel::export_all();
        let _ = crate::peripherals::TimerChannel::export_all();
        let _ = crate::peripherals::Peripherals::export_all();

        // Events
        let _ = crate::events::Direction::export_all();
        let _ = crate::events::TamperEvent::export_all();
        let _ = crate::events::ProtocolLogEntry::export_all();
        let _ = crate::events::UartLogEntry::export_all();

        // Instrument
        let _ = crate::instrument::InstrumentConfig::export_all();
        let _ = crate::instrument::InstrumentStatus::export_all();
        let _ = crate::instrument::MeasurementBroadcast::export_all();

        // Analysis
        let _ = crate::analysis::Waveform::export_all();
        let _ = crate::analysis::Harmonic::export_all();
        let _ = crate::analysis::HarmonicSpectrum::export_all();
        let _ = crate::analysis::Phasor::export_all();
        let _ = crate::analysis::PhasorSet::export_all();
        let _ = crate::analysis::SpotMeasurements::export_all();
    }
}
