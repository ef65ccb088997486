//! `WebSocket` handler for live measurement streaming.
//!
//! Clients connect to `GET /ws/measurements`. The first frame is the
//! meter's current reading, so a dashboard has something to draw even while
//! the simulation is stopped. After that every completed tick is pushed as a
//! JSON-encoded [`MeasurementBroadcast`]. Idle ticks publish nothing.
//!
//! If a client falls behind, lagged frames are skipped and the client
//! resumes from the most recent tick.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use metersim_types::MeasurementBroadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming measurements.
///
/// # Route
///
/// `GET /ws/measurements`
pub async fn ws_measurements(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the snapshot so no tick falls between them.
    let mut rx = state.subscribe();
    let snapshot = state.simulator.latest().await.to_broadcast();
    debug!(tick = snapshot.tick, "Measurement stream client connected");

    if !send_frame(&mut socket, &snapshot).await {
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    // Ticks completed before the snapshot was read.
                    Ok(frame) if frame.tick <= snapshot.tick => {}
                    Ok(frame) => {
                        if !send_frame(&mut socket, &frame).await {
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "Measurement stream client lagged");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Measurement channel closed");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("Measurement stream client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Clients only listen.
                    _ => {}
                }
            }
        }
    }
}

/// Send one frame. Returns `false` once the client is gone.
async fn send_frame(socket: &mut WebSocket, frame: &MeasurementBroadcast) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!(tick = frame.tick, "Failed to serialize measurement frame: {e}");
            return true;
        }
    };
    if socket.send(Message::Text(json.into())).await.is_err() {
        debug!("Measurement stream client disconnected (send failed)");
        return false;
    }
    true
}
