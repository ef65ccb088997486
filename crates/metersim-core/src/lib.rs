//! Instrument state, tick updater, and run control for the smart meter
//! simulator.
//!
//! The crate owns the single shared [`InstrumentState`] record and every
//! operation that reads or writes it. Callers (the HTTP layer, tests) hold
//! an `Arc<Simulator>` and never touch the record directly.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `metersim-config.yaml` with
//!   environment overrides.
//! - [`instrument`] -- The [`InstrumentState`] record and its boot values.
//! - [`tick`] -- One measurement/peripheral update step.
//! - [`simulator`] -- [`Simulator`], the guarded owner of the state and the
//!   random source, plus all caller-facing operations.
//! - [`control`] -- Run-control errors, reply messages, and configuration
//!   updates.
//! - [`protocol`] -- Canned DLMS / Modbus / IEC 62056 responder.
//! - [`analysis`] -- Synthetic waveform, harmonic, phasor, and spot data.
//! - [`export`] -- CSV rendering of the current measurements.
//! - [`log`] -- Fixed-capacity ring buffer for event logs.
//! - [`runner`] -- The periodic background updater loop.
//!
//! [`InstrumentState`]: instrument::InstrumentState
//! [`Simulator`]: simulator::Simulator

pub mod analysis;
pub mod config;
pub mod control;
pub mod export;
pub mod instrument;
pub mod log;
pub mod protocol;
pub mod runner;
pub mod simulator;
pub mod tick;
