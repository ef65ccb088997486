//! The shared instrument-state record.
//!
//! One [`InstrumentState`] exists per process. It is created at start-up
//! with fixed configuration, zeroed measurements, and random peripheral
//! values, and is only ever reached through the
//! [`Simulator`](crate::simulator::Simulator) guard.

use metersim_types::{
    ADC_CHANNEL_COUNT, ADC_MAX_VOLTAGE, AdcChannel, GPIO_PIN_COUNT, GpioPin, InstrumentConfig,
    InstrumentStatus, Measurements, Peripherals, PinDirection, ProtocolLogEntry, TIMER_COUNT,
    TIMER_DEFAULT_PERIOD, TamperEvent, TimerChannel, UartLogEntry,
};
use rand::Rng;

use crate::log::BoundedLog;

/// Everything the simulator knows about the meter.
#[derive(Debug, Clone)]
pub struct InstrumentState {
    /// Caller-adjustable nominal values and labels.
    pub config: InstrumentConfig,
    /// Derived measurements, replaced wholesale each tick.
    pub measurements: Measurements,
    /// GPIO, ADC, and timer snapshot.
    pub peripherals: Peripherals,
    /// Injected tamper conditions.
    pub tamper_events: BoundedLog<TamperEvent>,
    /// Protocol command/response exchanges.
    pub protocol_log: BoundedLog<ProtocolLogEntry>,
    /// UART exchanges.
    pub uart_log: BoundedLog<UartLogEntry>,
    /// Whether the updater refreshes measurements.
    pub is_running: bool,
    /// Whether a firmware image has been accepted.
    pub firmware_loaded: bool,
    /// File name of the last accepted firmware image.
    pub firmware_name: Option<String>,
    /// Number of ticks that have updated the measurements.
    pub ticks: u64,
}

impl InstrumentState {
    /// Create the boot-time state.
    ///
    /// Measurements start at zero; peripherals are randomized from `rng`.
    pub fn new<R: Rng>(config: InstrumentConfig, log_capacity: usize, rng: &mut R) -> Self {
        Self {
            config,
            measurements: Measurements::ZERO,
            peripherals: random_peripherals(rng),
            tamper_events: BoundedLog::new(log_capacity),
            protocol_log: BoundedLog::for_exchanges(log_capacity),
            uart_log: BoundedLog::for_exchanges(log_capacity),
            is_running: false,
            firmware_loaded: false,
            firmware_name: None,
            ticks: 0,
        }
    }

    /// Project the fields served by `GET /api/status`.
    pub fn status(&self) -> InstrumentStatus {
        InstrumentStatus {
            is_running: self.is_running,
            firmware_loaded: self.firmware_loaded,
            measurements: self.measurements,
            peripherals: self.peripherals.clone(),
        }
    }
}

/// Build a peripheral snapshot with random GPIO levels, ADC readings, and
/// timer enable flags.
pub fn random_peripherals<R: Rng>(rng: &mut R) -> Peripherals {
    let gpio = (0..GPIO_PIN_COUNT)
        .map(|pin| GpioPin {
            pin,
            state: rng.random_bool(0.5),
            direction: PinDirection::Input,
        })
        .collect();

    let adc = (0..ADC_CHANNEL_COUNT)
        .map(|channel| AdcChannel {
            channel,
            voltage: rng.random_range(0.0..=ADC_MAX_VOLTAGE),
        })
        .collect();

    let timers = (0..TIMER_COUNT)
        .map(|timer| TimerChannel {
            timer,
            enabled: rng.random_bool(0.5),
            period: TIMER_DEFAULT_PERIOD,
        })
        .collect();

    Peripherals { gpio, adc, timers }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn boot_state_is_idle_with_zeroed_measurements() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = InstrumentState::new(InstrumentConfig::default(), 16, &mut rng);
        assert!(!state.is_running);
        assert!(!state.firmware_loaded);
        assert_eq!(state.measurements, Measurements::ZERO);
        assert!(state.tamper_events.is_empty());
        assert!(state.protocol_log.is_empty());
        assert!(state.uart_log.is_empty());
        assert_eq!(state.ticks, 0);
    }

    #[test]
    fn peripherals_have_fixed_sizes_and_ordered_indices() {
        let mut rng = StdRng::seed_from_u64(2);
        let p = random_peripherals(&mut rng);
        assert_eq!(p.gpio.len(), usize::from(GPIO_PIN_COUNT));
        assert_eq!(p.adc.len(), usize::from(ADC_CHANNEL_COUNT));
        assert_eq!(p.timers.len(), usize::from(TIMER_COUNT));

        for (i, pin) in p.gpio.iter().enumerate() {
            assert_eq!(usize::from(pin.pin), i);
            assert_eq!(pin.direction, PinDirection::Input);
        }
        for (i, ch) in p.adc.iter().enumerate() {
            assert_eq!(usize::from(ch.channel), i);
            assert!((0.0..=ADC_MAX_VOLTAGE).contains(&ch.voltage));
        }
        assert!(p.timers.iter().all(|t| t.period == TIMER_DEFAULT_PERIOD));
    }

    #[test]
    fn status_projects_run_flags() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = InstrumentState::new(InstrumentConfig::default(), 4, &mut rng);
        state.firmware_loaded = true;
        let status = state.status();
        assert!(status.firmware_loaded);
        assert!(!status.is_running);
        assert_eq!(status.peripherals, state.peripherals);
    }
}
