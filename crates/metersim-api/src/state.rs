//! Shared application state for the API server.
//!
//! [`AppState`] holds the simulator and the broadcast channel that feeds
//! `WebSocket` subscribers with per-tick measurements.

use std::sync::Arc;

use metersim_core::simulator::Simulator;
use metersim_types::MeasurementBroadcast;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel for measurement frames.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The simulator every handler operates on.
    pub simulator: Arc<Simulator>,
    /// Broadcast sender for measurement frames.
    pub tx: broadcast::Sender<MeasurementBroadcast>,
}

impl AppState {
    /// Create application state around `simulator`.
    pub fn new(simulator: Arc<Simulator>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { simulator, tx }
    }

    /// Subscribe to the measurement broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<MeasurementBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a measurement frame to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, frame: &MeasurementBroadcast) -> usize {
        self.tx.send(frame.clone()).unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use metersim_types::{InstrumentConfig, Measurements};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn state() -> AppState {
        AppState::new(Arc::new(Simulator::from_parts(
            InstrumentConfig::default(),
            8,
            Duration::ZERO,
            StdRng::seed_from_u64(3),
        )))
    }

    fn frame(tick: u64) -> MeasurementBroadcast {
        MeasurementBroadcast {
            tick,
            timestamp: Utc::now(),
            measurements: Measurements::ZERO,
        }
    }

    #[test]
    fn broadcast_without_subscribers_reaches_nobody() {
        assert_eq!(state().broadcast(&frame(1)), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_frames() {
        let state = state();
        let mut rx = state.subscribe();
        assert_eq!(state.broadcast(&frame(7)), 1);
        assert_eq!(rx.recv().await.unwrap().tick, 7);
    }
}
