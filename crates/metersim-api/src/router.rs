//! Axum router construction for the API server.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{control, handlers, ws};

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/measurements` -- `WebSocket` measurement stream
/// - `GET /api/...` -- status, configuration, logs, tamper events,
///   waveform, CSV export, synthetic measurements / harmonics / phasors
/// - `POST /api/...` -- firmware upload, run control, configuration
///   update, tamper inject / clear, protocol and UART commands
/// - `GET /static/*` -- files under `static_dir`, when given
///
/// CORS allows any origin so a separately served dashboard can call in.
pub fn build_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/measurements", get(ws::ws_measurements))
        // Instrument state
        .route("/api/status", get(handlers::get_status))
        .route("/api/configuration", get(handlers::get_configuration))
        .route("/api/logs/protocol", get(handlers::get_protocol_log))
        .route("/api/logs/uart", get(handlers::get_uart_log))
        .route("/api/tamper/events", get(handlers::get_tamper_events))
        // Analysis
        .route("/api/waveform", get(handlers::get_waveform))
        .route("/api/export/csv", get(handlers::export_csv))
        .route("/api/measurements", get(handlers::get_measurements))
        .route("/api/harmonics", get(handlers::get_harmonics))
        .route("/api/phasors", get(handlers::get_phasors))
        // Control
        .route("/api/firmware/load", post(control::load_firmware))
        .route("/api/simulation/start", post(control::start))
        .route("/api/simulation/stop", post(control::stop))
        .route("/api/simulation/reset", post(control::reset))
        .route(
            "/api/configuration/update",
            post(control::update_configuration),
        )
        .route("/api/tamper/inject", post(control::inject_tamper))
        .route("/api/tamper/clear", post(control::clear_tamper))
        .route("/api/protocol/send", post(control::send_protocol))
        .route("/api/uart/send", post(control::send_uart));

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
