//! The periodic background updater.
//!
//! [`run_updater`] drives [`Simulator::tick`] on a fixed interval for the
//! life of the process. Ticks that find the simulation idle do nothing;
//! ticks that ran are handed to a [`TickCallback`].
//!
//! [`spawn_updater`] moves the loop onto its own Tokio task and returns
//! the handle so the binary can abort it at shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::simulator::Simulator;
use crate::tick::TickSummary;

/// Callback invoked after each tick that updated the state.
///
/// Implementations can broadcast the summary to live subscribers, record
/// it, etc.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary);
}

/// Run the updater loop forever.
///
/// A zero `period` is raised to one millisecond. Missed ticks are delayed
/// rather than bursted.
pub async fn run_updater(
    simulator: Arc<Simulator>,
    period: Duration,
    callback: &mut dyn TickCallback,
) {
    let period = period.max(Duration::from_millis(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_ms = period.as_millis(), "Updater started");

    loop {
        interval.tick().await;
        if let Some(summary) = simulator.tick().await {
            debug!(
                tick = summary.tick,
                voltage_rms = summary.measurements.voltage_rms,
                energy = summary.measurements.energy,
                "Tick complete"
            );
            callback.on_tick(&summary);
        }
    }
}

/// Spawn [`run_updater`] on a new Tokio task.
pub fn spawn_updater<C>(
    simulator: Arc<Simulator>,
    period: Duration,
    mut callback: C,
) -> JoinHandle<()>
where
    C: TickCallback + 'static,
{
    tokio::spawn(async move {
        run_updater(simulator, period, &mut callback).await;
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use metersim_types::{InstrumentConfig, Measurements};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    struct Recorder {
        ticks: Arc<Mutex<Vec<u64>>>,
    }

    impl TickCallback for Recorder {
        fn on_tick(&mut self, summary: &TickSummary) {
            self.ticks.lock().unwrap().push(summary.tick);
        }
    }

    fn simulator() -> Arc<Simulator> {
        Arc::new(Simulator::from_parts(
            InstrumentConfig::default(),
            16,
            Duration::ZERO,
            StdRng::seed_from_u64(5),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn idle_updater_never_calls_back() {
        let sim = simulator();
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let handle = spawn_updater(
            Arc::clone(&sim),
            Duration::from_millis(100),
            Recorder {
                ticks: Arc::clone(&ticks),
            },
        );

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        handle.abort();

        assert!(ticks.lock().unwrap().is_empty());
        assert_eq!(sim.measurements().await, Measurements::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn running_updater_ticks_on_period() {
        let sim = simulator();
        sim.load_firmware("a.bin").await.unwrap();
        sim.start().await.unwrap();

        let ticks = Arc::new(Mutex::new(Vec::new()));
        let handle = spawn_updater(
            Arc::clone(&sim),
            Duration::from_millis(100),
            Recorder {
                ticks: Arc::clone(&ticks),
            },
        );

        // First interval tick fires immediately, then every 100 ms.
        tokio::time::sleep(Duration::from_millis(450)).await;
        handle.abort();

        let seen = ticks.lock().unwrap().clone();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_pauses_callbacks() {
        let sim = simulator();
        sim.load_firmware("a.hex").await.unwrap();
        sim.start().await.unwrap();

        let ticks = Arc::new(Mutex::new(Vec::new()));
        let handle = spawn_updater(
            Arc::clone(&sim),
            Duration::from_millis(100),
            Recorder {
                ticks: Arc::clone(&ticks),
            },
        );

        tokio::time::sleep(Duration::from_millis(250)).await;
        sim.stop().await;
        let at_stop = ticks.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.abort();

        assert_eq!(ticks.lock().unwrap().len(), at_stop);
        assert!(at_stop > 0);
    }
}
