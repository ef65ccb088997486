//! Control endpoint handlers.
//!
//! Every handler here changes instrument state or talks to the simulated
//! firmware. Run-control outcomes, including refusals, are reported as
//! `{success, message}` with HTTP 200; protocol and UART commands reply
//! `{success, response}`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/firmware/load` | Upload a firmware image (multipart `file`) |
//! | `POST` | `/api/simulation/start` | Start the updater |
//! | `POST` | `/api/simulation/stop` | Stop the updater |
//! | `POST` | `/api/simulation/reset` | Stop and zero measurements |
//! | `POST` | `/api/configuration/update` | Partial configuration update |
//! | `POST` | `/api/tamper/inject` | Record a tamper event |
//! | `POST` | `/api/tamper/clear` | Clear active tamper events of a kind |
//! | `POST` | `/api/protocol/send` | Send a meter-protocol command |
//! | `POST` | `/api/uart/send` | Send a UART command |

use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use metersim_core::control::{ConfigurationUpdate, ControlError};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Reply when the upload has no `file` part carrying a filename.
pub const NO_FILE_PROVIDED: &str = "No file provided";

/// Reply when the `file` part has an empty file name.
pub const NO_FILE_SELECTED: &str = "No file selected";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/tamper/inject` and `POST /api/tamper/clear`.
#[derive(Debug, serde::Deserialize)]
pub struct TamperRequest {
    /// Tamper kind (default `"magnet"`).
    #[serde(rename = "type", default = "default_tamper_kind")]
    pub kind: String,
}

fn default_tamper_kind() -> String {
    String::from("magnet")
}

/// Request body for `POST /api/protocol/send`.
#[derive(Debug, serde::Deserialize)]
pub struct ProtocolRequest {
    /// Protocol name (default `"dlms"`).
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Command text.
    #[serde(default)]
    pub command: String,
}

fn default_protocol() -> String {
    String::from("dlms")
}

/// Request body for `POST /api/uart/send`.
#[derive(Debug, serde::Deserialize)]
pub struct UartRequest {
    /// Command text.
    #[serde(default)]
    pub command: String,
}

/// Outcome of a run-control request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ControlResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

impl ControlResponse {
    /// A successful outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A refused outcome.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl<M: Into<String>> From<Result<M, ControlError>> for ControlResponse {
    fn from(result: Result<M, ControlError>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

/// Reply to a protocol or UART command.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommandResponse {
    /// Always `true`; malformed commands get an error string as response.
    pub success: bool,
    /// The simulated device's reply.
    pub response: String,
}

// ---------------------------------------------------------------------------
// POST /api/firmware/load
// ---------------------------------------------------------------------------

/// Accept a firmware image upload.
///
/// Only the file name is inspected; the image bytes are read and
/// discarded.
pub async fn load_firmware(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Ok(Json(ControlResponse::failed(NO_FILE_PROVIDED)));
    };

    let mut file_name = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        // A `file` part without a filename parameter is a form value, not an upload.
        let Some(name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let image = field.bytes().await?;
        debug!(file = %name, size = image.len(), "Firmware upload received");
        file_name = Some(name);
        break;
    }

    let Some(name) = file_name else {
        return Ok(Json(ControlResponse::failed(NO_FILE_PROVIDED)));
    };
    if name.is_empty() {
        return Ok(Json(ControlResponse::failed(NO_FILE_SELECTED)));
    }

    Ok(Json(ControlResponse::from(
        state.simulator.load_firmware(&name).await,
    )))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/{start,stop,reset}
// ---------------------------------------------------------------------------

/// Start the updater. Refused until firmware is loaded.
pub async fn start(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ControlResponse::from(state.simulator.start().await))
}

/// Stop the updater.
pub async fn stop(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ControlResponse::ok(state.simulator.stop().await))
}

/// Stop the updater and zero every measurement.
pub async fn reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ControlResponse::ok(state.simulator.reset().await))
}

// ---------------------------------------------------------------------------
// POST /api/configuration/update
// ---------------------------------------------------------------------------

/// Apply a partial configuration update.
///
/// Out-of-range values reject the whole update with HTTP 400.
pub async fn update_configuration(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConfigurationUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(update) = payload?;
    let message = state.simulator.update_configuration(update).await?;
    Ok(Json(ControlResponse::ok(message)))
}

// ---------------------------------------------------------------------------
// POST /api/tamper/{inject,clear}
// ---------------------------------------------------------------------------

/// Record an active tamper event.
pub async fn inject_tamper(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TamperRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let message = state.simulator.inject_tamper(&req.kind).await;
    Ok(Json(ControlResponse::ok(message)))
}

/// Clear every active tamper event of the requested kind.
pub async fn clear_tamper(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TamperRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    Ok(Json(ControlResponse::from(
        state.simulator.clear_tamper(&req.kind).await,
    )))
}

// ---------------------------------------------------------------------------
// POST /api/protocol/send, POST /api/uart/send
// ---------------------------------------------------------------------------

/// Send a command over a simulated meter protocol.
pub async fn send_protocol(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProtocolRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let response = state
        .simulator
        .process_protocol(&req.protocol, &req.command)
        .await;
    Ok(Json(CommandResponse {
        success: true,
        response,
    }))
}

/// Send a command over the simulated UART.
pub async fn send_uart(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UartRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let response = state.simulator.send_uart(&req.command).await;
    Ok(Json(CommandResponse {
        success: true,
        response,
    }))
}
