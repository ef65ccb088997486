//! Tamper events and exchange log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Direction of a logged exchange, from the meter's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Command sent to the meter.
    #[serde(rename = "TX")]
    Tx,
    /// Response returned by the meter.
    #[serde(rename = "RX")]
    Rx,
}

/// A tamper condition raised against the meter (magnet, cover open, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TamperEvent {
    /// Free-form tamper kind, e.g. `magnet`.
    #[serde(rename = "type")]
    pub kind: String,
    /// When the event was injected.
    pub timestamp: DateTime<Utc>,
    /// Cleared events stay in the log with `active = false`.
    pub active: bool,
}

/// One half of a protocol command/response exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProtocolLogEntry {
    /// Shared by the TX and RX halves of one exchange.
    pub timestamp: DateTime<Utc>,
    /// TX for the command, RX for the response.
    pub direction: Direction,
    /// Protocol name as supplied by the caller.
    pub protocol: String,
    /// Command or response payload.
    pub data: String,
}

/// One half of a UART exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UartLogEntry {
    /// Shared by the TX and RX halves of one exchange.
    pub timestamp: DateTime<Utc>,
    /// TX for the command, RX for the echo.
    pub direction: Direction,
    /// Payload.
    pub data: String,
}
