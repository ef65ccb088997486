//! Read-only endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/status` | Run flags, measurements, peripherals |
//! | `GET` | `/api/configuration` | Current instrument configuration |
//! | `GET` | `/api/logs/protocol` | Protocol exchange log |
//! | `GET` | `/api/logs/uart` | UART exchange log |
//! | `GET` | `/api/tamper/events` | Recorded tamper events |
//! | `GET` | `/api/waveform` | Sampled voltage/current traces |
//! | `GET` | `/api/export/csv` | Measurements as a CSV attachment |
//! | `GET` | `/api/measurements` | Synthetic spot readings |
//! | `GET` | `/api/harmonics` | Synthetic harmonic spectrum |
//! | `GET` | `/api/phasors` | Synthetic three-phase phasors |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing instrument status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.simulator.status().await;
    let m = status.measurements;
    let (run_class, run_label) = if status.is_running {
        ("on", "RUNNING")
    } else {
        ("off", "STOPPED")
    };
    let firmware = if status.firmware_loaded {
        "loaded"
    } else {
        "not loaded"
    };
    let voltage = format!("{:.2}", m.voltage_rms);
    let current = format!("{:.3}", m.current_rms);
    let power = format!("{:.1}", m.active_power);
    let frequency = format!("{:.2}", m.frequency);
    let energy = format!("{:.6}", m.energy);

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Smart Meter Simulator</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .on {{ color: #3fb950; font-weight: bold; }}
        .off {{ color: #f85149; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Smart Meter Simulator</h1>
    <p class="subtitle">Firmware test bench</p>

    <p>Simulation: <span class="{run_class}">{run_label}</span> &middot; Firmware: {firmware}</p>

    <div>
        <div class="metric">
            <div class="label">Voltage (V)</div>
            <div class="value">{voltage}</div>
        </div>
        <div class="metric">
            <div class="label">Current (A)</div>
            <div class="value">{current}</div>
        </div>
        <div class="metric">
            <div class="label">Power (W)</div>
            <div class="value">{power}</div>
        </div>
        <div class="metric">
            <div class="label">Frequency (Hz)</div>
            <div class="value">{frequency}</div>
        </div>
        <div class="metric">
            <div class="label">Energy (kWh)</div>
            <div class="value">{energy}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/status">/api/status</a></li>
        <li>GET <a href="/api/configuration">/api/configuration</a></li>
        <li>GET <a href="/api/logs/protocol">/api/logs/protocol</a></li>
        <li>GET <a href="/api/logs/uart">/api/logs/uart</a></li>
        <li>GET <a href="/api/tamper/events">/api/tamper/events</a></li>
        <li>GET <a href="/api/waveform">/api/waveform</a></li>
        <li>GET <a href="/api/measurements">/api/measurements</a></li>
        <li>GET <a href="/api/harmonics">/api/harmonics</a></li>
        <li>GET <a href="/api/phasors">/api/phasors</a></li>
        <li>GET <a href="/api/export/csv">/api/export/csv</a></li>
        <li>POST /api/firmware/load</li>
        <li>POST /api/simulation/start | stop | reset</li>
        <li>POST /api/configuration/update</li>
        <li>POST /api/tamper/inject | clear</li>
        <li>POST /api/protocol/send</li>
        <li>POST /api/uart/send</li>
        <li>WS /ws/measurements</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Instrument state
// ---------------------------------------------------------------------------

/// Return run flags, the latest measurements, and the peripheral snapshot.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.status().await)
}

/// Return the current instrument configuration.
pub async fn get_configuration(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.configuration().await)
}

/// Return the protocol exchange log, oldest first.
pub async fn get_protocol_log(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.protocol_log().await)
}

/// Return the UART exchange log, oldest first.
pub async fn get_uart_log(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.uart_log().await)
}

/// Return every recorded tamper event, oldest first.
pub async fn get_tamper_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.tamper_events().await)
}

// ---------------------------------------------------------------------------
// Synthetic analysis data
// ---------------------------------------------------------------------------

/// Return 100 samples of the nominal voltage and current sinusoids.
pub async fn get_waveform(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.waveform().await)
}

/// Return synthetic spot power-quality readings.
pub async fn get_measurements(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.spot_measurements().await)
}

/// Return a synthetic harmonic spectrum up to the 33rd order.
pub async fn get_harmonics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.harmonics().await)
}

/// Return a synthetic three-phase phasor set.
pub async fn get_phasors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.phasors().await)
}

// ---------------------------------------------------------------------------
// GET /api/export/csv
// ---------------------------------------------------------------------------

/// Return the current measurements as a `text/csv` attachment.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let export = state.simulator.measurements_csv().await?;
    let disposition = format!("attachment; filename={}", export.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, String::from("text/csv")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    ))
}
