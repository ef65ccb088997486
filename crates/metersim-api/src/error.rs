//! Error types for the API server.
//!
//! [`ApiError`] covers requests that cannot be processed at all. It
//! converts into an Axum response with a `{error, status}` JSON body via
//! its [`IntoResponse`](axum::response::IntoResponse) implementation.
//! Run-control refusals such as "No firmware loaded" are not errors at
//! this layer; they are answered with `{success: false, message}`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use metersim_core::control::ControlError;
use metersim_core::export::ExportError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The JSON request body was missing or malformed.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// A configuration update carried out-of-range values.
    #[error("{0}")]
    InvalidConfiguration(String),

    /// A multipart upload could not be read.
    #[error("multipart error: {0}")]
    Multipart(String),

    /// Rendering the CSV export failed.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err.body_text())
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::InvalidConfiguration { .. } => Self::InvalidConfiguration(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidBody(_) | Self::InvalidConfiguration(_) | Self::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Export(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
