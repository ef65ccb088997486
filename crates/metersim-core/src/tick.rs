//! One update step of the simulation state updater.
//!
//! Each tick has two phases:
//!
//! 1. **Measurements** -- derive a fresh [`Measurements`] record from the
//!    nominal configuration plus uniform noise, carrying only the energy
//!    accumulator across ticks. The record is replaced in one assignment.
//! 2. **Peripherals** -- flip each GPIO with probability
//!    [`GPIO_FLIP_PROBABILITY`] and random-walk each ADC channel by at most
//!    [`ADC_DRIFT`] volts, clamped to `[0, ADC_MAX_VOLTAGE]`.
//!
//! Given the same state and the same seeded random source, a tick is
//! deterministic.

use chrono::{DateTime, Utc};
use metersim_types::{
    ADC_MAX_VOLTAGE, InstrumentConfig, MeasurementBroadcast, Measurements, Peripherals,
};
use rand::Rng;

use crate::instrument::InstrumentState;

/// Half-width of the uniform noise added to the RMS voltage.
pub const VOLTAGE_NOISE: f64 = 0.1;

/// Half-width of the uniform noise added to the RMS current.
pub const CURRENT_NOISE: f64 = 0.01;

/// Half-width of the uniform noise added to the frequency.
pub const FREQUENCY_NOISE: f64 = 0.01;

/// Energy accumulation scale applied to active power every tick.
///
/// The increment is `active_power * ENERGY_SCALE / 3600` regardless of the
/// tick period, so the register does not track true elapsed-time energy.
pub const ENERGY_SCALE: f64 = 0.0001;

/// Probability that a GPIO pin toggles during one tick.
pub const GPIO_FLIP_PROBABILITY: f64 = 0.1;

/// Half-width of the random walk applied to each ADC channel per tick.
pub const ADC_DRIFT: f64 = 0.05;

/// Outcome of a tick that updated the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummary {
    /// Tick counter after this tick.
    pub tick: u64,
    /// When the tick ran.
    pub timestamp: DateTime<Utc>,
    /// Measurements produced by the tick.
    pub measurements: Measurements,
}

impl TickSummary {
    /// The frame pushed to live measurement subscribers.
    pub const fn to_broadcast(&self) -> MeasurementBroadcast {
        MeasurementBroadcast {
            tick: self.tick,
            timestamp: self.timestamp,
            measurements: self.measurements,
        }
    }
}

/// Run one full update step against `state`.
///
/// Callers decide whether the simulation is running; this function always
/// updates. Increments `state.ticks`.
pub fn advance<R: Rng>(state: &mut InstrumentState, rng: &mut R) {
    state.measurements = compute_measurements(&state.config, state.measurements.energy, rng);
    perturb_peripherals(&mut state.peripherals, rng);
    state.ticks = state.ticks.saturating_add(1);
}

/// Derive a complete measurement record from the nominal configuration.
///
/// `previous_energy` is the accumulator value carried from the last tick.
pub fn compute_measurements<R: Rng>(
    config: &InstrumentConfig,
    previous_energy: f64,
    rng: &mut R,
) -> Measurements {
    let voltage = config.voltage;
    let current = config.current;
    let power_factor = config.power_factor.clamp(0.0, 1.0);

    let apparent_power = voltage * current;
    let active_power = apparent_power * power_factor;
    let reactive_power = apparent_power * power_factor.acos().sin();

    Measurements {
        voltage_rms: voltage + rng.random_range(-VOLTAGE_NOISE..VOLTAGE_NOISE),
        current_rms: current + rng.random_range(-CURRENT_NOISE..CURRENT_NOISE),
        active_power,
        reactive_power,
        apparent_power,
        power_factor,
        frequency: config.frequency + rng.random_range(-FREQUENCY_NOISE..FREQUENCY_NOISE),
        energy: previous_energy + active_power * ENERGY_SCALE / 3600.0,
    }
}

/// Toggle GPIO pins and drift ADC readings in place.
pub fn perturb_peripherals<R: Rng>(peripherals: &mut Peripherals, rng: &mut R) {
    for pin in &mut peripherals.gpio {
        if rng.random_bool(GPIO_FLIP_PROBABILITY) {
            pin.state = !pin.state;
        }
    }

    for channel in &mut peripherals.adc {
        let drifted = channel.voltage + rng.random_range(-ADC_DRIFT..ADC_DRIFT);
        channel.voltage = drifted.clamp(0.0, ADC_MAX_VOLTAGE);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn make_state(seed: u64) -> (InstrumentState, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = InstrumentState::new(InstrumentConfig::default(), 8, &mut rng);
        (state, rng)
    }

    #[test]
    fn power_identities_hold_exactly() {
        let mut rng = StdRng::seed_from_u64(10);
        for pf in [0.1, 0.5, 0.8, 0.95, 1.0] {
            let config = InstrumentConfig {
                voltage: 231.7,
                current: 4.2,
                power_factor: pf,
                ..InstrumentConfig::default()
            };
            let m = compute_measurements(&config, 0.0, &mut rng);
            assert_eq!(m.active_power, config.voltage * config.current * pf);
            assert_eq!(m.apparent_power, config.voltage * config.current);
            assert_eq!(m.power_factor, pf);
        }
    }

    #[test]
    fn reactive_power_follows_power_factor_angle() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = InstrumentConfig {
            power_factor: 0.8,
            ..InstrumentConfig::default()
        };
        let m = compute_measurements(&config, 0.0, &mut rng);
        // sin(acos(0.8)) = 0.6
        let expected = config.voltage * config.current * 0.6;
        assert!((m.reactive_power - expected).abs() < 1e-9);

        let unity = InstrumentConfig {
            power_factor: 1.0,
            ..InstrumentConfig::default()
        };
        let m = compute_measurements(&unity, 0.0, &mut rng);
        assert!(m.reactive_power.abs() < 1e-9);
    }

    #[test]
    fn noise_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(12);
        let config = InstrumentConfig::default();
        for _ in 0..1000 {
            let m = compute_measurements(&config, 0.0, &mut rng);
            assert!((m.voltage_rms - config.voltage).abs() <= VOLTAGE_NOISE + 1e-9);
            assert!((m.current_rms - config.current).abs() <= CURRENT_NOISE + 1e-9);
            assert!((m.frequency - config.frequency).abs() <= FREQUENCY_NOISE + 1e-9);
        }
    }

    #[test]
    fn energy_accumulates_fixed_increment() {
        let mut rng = StdRng::seed_from_u64(13);
        let config = InstrumentConfig::default();
        let m = compute_measurements(&config, 2.0, &mut rng);
        let active = config.voltage * config.current * config.power_factor;
        assert_eq!(m.energy, 2.0 + active * 0.0001 / 3600.0);
    }

    #[test]
    fn energy_is_monotonic_across_ticks() {
        let (mut state, mut rng) = make_state(14);
        let mut last = state.measurements.energy;
        for _ in 0..500 {
            advance(&mut state, &mut rng);
            assert!(state.measurements.active_power >= 0.0);
            assert!(state.measurements.energy >= last);
            last = state.measurements.energy;
        }
        assert!(last > 0.0);
        assert_eq!(state.ticks, 500);
    }

    #[test]
    fn out_of_range_power_factor_is_clamped() {
        let mut rng = StdRng::seed_from_u64(15);
        let config = InstrumentConfig {
            power_factor: 1.5,
            ..InstrumentConfig::default()
        };
        let m = compute_measurements(&config, 0.0, &mut rng);
        assert!(m.reactive_power.is_finite());
        assert_eq!(m.power_factor, 1.0);
    }

    #[test]
    fn adc_channels_never_leave_range() {
        let (mut state, mut rng) = make_state(16);
        for _ in 0..5000 {
            advance(&mut state, &mut rng);
            for ch in &state.peripherals.adc {
                assert!(ch.voltage >= 0.0 && ch.voltage <= ADC_MAX_VOLTAGE);
            }
        }
    }

    #[test]
    fn adc_clamps_at_rails() {
        let (mut state, mut rng) = make_state(17);
        for ch in &mut state.peripherals.adc {
            ch.voltage = ADC_MAX_VOLTAGE;
        }
        state.peripherals.adc.first_mut().unwrap().voltage = 0.0;
        for _ in 0..100 {
            perturb_peripherals(&mut state.peripherals, &mut rng);
        }
        assert!(
            state
                .peripherals
                .adc
                .iter()
                .all(|ch| (0.0..=ADC_MAX_VOLTAGE).contains(&ch.voltage))
        );
    }

    #[test]
    fn gpio_flips_roughly_ten_percent_of_the_time() {
        let (mut state, mut rng) = make_state(18);
        let mut flips = 0_u32;
        let rounds = 2000_u32;
        for _ in 0..rounds {
            let before: Vec<bool> = state.peripherals.gpio.iter().map(|p| p.state).collect();
            perturb_peripherals(&mut state.peripherals, &mut rng);
            flips += state
                .peripherals
                .gpio
                .iter()
                .zip(&before)
                .map(|(p, b)| u32::from(p.state != *b))
                .sum::<u32>();
        }
        let rate = f64::from(flips) / f64::from(rounds * 16);
        assert!((0.08..0.12).contains(&rate), "flip rate {rate}");
    }

    #[test]
    fn same_seed_same_tick() {
        let (mut a, mut rng_a) = make_state(19);
        let (mut b, mut rng_b) = make_state(19);
        advance(&mut a, &mut rng_a);
        advance(&mut b, &mut rng_b);
        assert_eq!(a.measurements, b.measurements);
        assert_eq!(a.peripherals, b.peripherals);
    }
}
