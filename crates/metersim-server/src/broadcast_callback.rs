//! Tick callback that feeds the live measurement stream.
//!
//! After each tick that ran, this callback publishes a
//! [`MeasurementBroadcast`](metersim_types::MeasurementBroadcast) to all
//! connected `WebSocket` clients.

use std::sync::Arc;

use metersim_api::AppState;
use metersim_core::runner::TickCallback;
use metersim_core::tick::TickSummary;
use tracing::trace;

/// Callback that bridges the updater to the API broadcast channel.
pub struct BroadcastCallback {
    state: Arc<AppState>,
}

impl BroadcastCallback {
    /// Create a new callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl TickCallback for BroadcastCallback {
    fn on_tick(&mut self, summary: &TickSummary) {
        let receivers = self.state.broadcast(&summary.to_broadcast());
        trace!(tick = summary.tick, receivers, "Measurement broadcast sent");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use metersim_core::simulator::Simulator;
    use metersim_types::{InstrumentConfig, Measurements};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[tokio::test]
    async fn tick_summary_reaches_subscribers() {
        let simulator = Simulator::from_parts(
            InstrumentConfig::default(),
            8,
            Duration::ZERO,
            StdRng::seed_from_u64(9),
        );
        let state = Arc::new(AppState::new(Arc::new(simulator)));
        let mut rx = state.subscribe();
        let mut callback = BroadcastCallback::new(Arc::clone(&state));

        let measurements = Measurements {
            voltage_rms: 230.02,
            ..Measurements::ZERO
        };
        callback.on_tick(&TickSummary {
            tick: 12,
            timestamp: Utc::now(),
            measurements,
        });

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.tick, 12);
        assert_eq!(frame.measurements, measurements);
    }
}
