//! HTTP API server for the smart meter simulator.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Read endpoints** for instrument status, configuration, logs, tamper
//!   events, and the synthetic waveform / harmonic / phasor data
//! - **Control endpoints** for firmware upload, run control, configuration
//!   updates, tamper injection, and protocol / UART commands
//! - **`WebSocket` endpoint** (`/ws/measurements`) streaming every tick's
//!   measurements via [`tokio::sync::broadcast`]
//! - **CSV export** (`/api/export/csv`) of the current measurements
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Handlers hold an `Arc<AppState>` and call straight into
//! [`metersim_core::simulator::Simulator`], which guards the single
//! instrument-state record. Run-control outcomes are reported as
//! `{success, message}` with HTTP 200; malformed requests are rejected
//! with an [`ApiError`](error::ApiError).

pub mod control;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use state::AppState;
