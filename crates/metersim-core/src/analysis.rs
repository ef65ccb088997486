//! Synthetic analysis data for the dashboard charts.
//!
//! The waveform is derived from the nominal configuration. Spot readings,
//! harmonic spectra, and phasors are drawn independently on every request
//! and are not correlated with the ticking measurements.

use std::f64::consts::TAU;

use metersim_types::{
    Harmonic, HarmonicSpectrum, InstrumentConfig, Phasor, PhasorSet, SpotMeasurements, Waveform,
};
use rand::Rng;

/// Number of samples in a waveform trace.
pub const WAVEFORM_POINTS: u16 = 100;

/// Spacing between waveform samples in seconds.
pub const WAVEFORM_SAMPLE_PERIOD: f64 = 0.001;

/// Highest harmonic order reported.
pub const MAX_HARMONIC_ORDER: u8 = 33;

/// Nominal phasor voltage magnitude in volts.
pub const PHASOR_VOLTAGE: f64 = 230.0;

/// Nominal phasor current magnitude in amperes.
pub const PHASOR_CURRENT: f64 = 5.2;

/// Power factor used for the phasor current lag.
pub const PHASOR_POWER_FACTOR: f64 = 0.95;

/// Sample `WAVEFORM_POINTS` points of the nominal voltage and current
/// sinusoids starting at `epoch_secs`.
///
/// Current lags voltage by `acos(power_factor)`.
pub fn waveform(config: &InstrumentConfig, epoch_secs: f64) -> Waveform {
    let lag = config.power_factor.clamp(0.0, 1.0).acos();
    let mut voltage = Vec::with_capacity(usize::from(WAVEFORM_POINTS));
    let mut current = Vec::with_capacity(usize::from(WAVEFORM_POINTS));

    for i in 0..WAVEFORM_POINTS {
        let theta = f64::from(i).mul_add(WAVEFORM_SAMPLE_PERIOD, epoch_secs) * TAU * config.frequency;
        voltage.push(config.voltage * theta.sin());
        current.push(config.current * (theta - lag).sin());
    }

    Waveform {
        voltage,
        current,
        time_labels: (0..WAVEFORM_POINTS).map(u32::from).collect(),
    }
}

/// Draw one set of spot power-quality readings.
pub fn spot_measurements<R: Rng>(rng: &mut R) -> SpotMeasurements {
    SpotMeasurements {
        voltage: 230.5 + rng.random_range(-2.0..2.0),
        current: 5.2 + rng.random_range(-0.5..0.5),
        power: 1150.0 + rng.random_range(-50.0..50.0),
        frequency: 50.0 + rng.random_range(-0.1..0.1),
        power_factor: 0.95 + rng.random_range(-0.05..0.05),
        energy: 1234.5,
        thd_voltage: rng.random_range(1.0..5.0),
        thd_current: rng.random_range(2.0..8.0),
        crest_factor_voltage: 1.41 + rng.random_range(-0.1..0.1),
        crest_factor_current: 1.45 + rng.random_range(-0.1..0.2),
        k_factor: 1.2 + rng.random_range(-0.1..0.3),
        displacement_pf: 0.95,
        distortion_pf: 0.98,
    }
}

/// Draw voltage and current spectra for orders 1 through
/// [`MAX_HARMONIC_ORDER`]. The fundamental is always 100 %.
pub fn harmonic_spectrum<R: Rng>(rng: &mut R) -> HarmonicSpectrum {
    let mut voltage_harmonics = Vec::with_capacity(usize::from(MAX_HARMONIC_ORDER));
    let mut current_harmonics = Vec::with_capacity(usize::from(MAX_HARMONIC_ORDER));

    for order in 1..=MAX_HARMONIC_ORDER {
        let (v_mag, i_mag) = match order {
            1 => (100.0, 100.0),
            3 | 5 | 7 => (rng.random_range(2.0..8.0), rng.random_range(3.0..12.0)),
            2 | 4 | 6 | 8 => (rng.random_range(0.5..2.0), rng.random_range(1.0..4.0)),
            _ => (rng.random_range(0.1..1.5), rng.random_range(0.2..2.5)),
        };
        voltage_harmonics.push(harmonic(order, v_mag, rng));
        current_harmonics.push(harmonic(order, i_mag, rng));
    }

    HarmonicSpectrum {
        voltage_harmonics,
        current_harmonics,
    }
}

fn harmonic<R: Rng>(order: u8, magnitude: f64, rng: &mut R) -> Harmonic {
    Harmonic {
        order,
        magnitude,
        phase: rng.random_range(-180.0..=180.0),
        percentage: magnitude,
    }
}

/// Draw a balanced three-phase phasor set, L1 through L3 at 120 degree
/// spacing, with each current lagging its voltage by
/// `acos(PHASOR_POWER_FACTOR)`.
///
/// Magnitudes carry noise; the rectangular components use the nominal
/// magnitudes.
pub fn phasors<R: Rng>(rng: &mut R) -> PhasorSet {
    let lag = PHASOR_POWER_FACTOR.acos().to_degrees();
    let mut voltage_phasors = Vec::with_capacity(3);
    let mut current_phasors = Vec::with_capacity(3);

    for (label, angle) in [("L1", 0.0_f64), ("L2", 120.0), ("L3", 240.0)] {
        voltage_phasors.push(phasor(
            label,
            PHASOR_VOLTAGE + rng.random_range(-5.0..5.0),
            PHASOR_VOLTAGE,
            angle,
        ));
        current_phasors.push(phasor(
            label,
            PHASOR_CURRENT + rng.random_range(-0.2..0.2),
            PHASOR_CURRENT,
            angle - lag,
        ));
    }

    PhasorSet {
        voltage_phasors,
        current_phasors,
    }
}

fn phasor(label: &str, magnitude: f64, nominal: f64, angle: f64) -> Phasor {
    let radians = angle.to_radians();
    Phasor {
        phase: label.to_owned(),
        magnitude,
        angle,
        real: nominal * radians.cos(),
        imaginary: nominal * radians.sin(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn waveform_has_fixed_length_and_labels() {
        let w = waveform(&InstrumentConfig::default(), 1_700_000_000.0);
        assert_eq!(w.voltage.len(), 100);
        assert_eq!(w.current.len(), 100);
        assert_eq!(w.time_labels, (0..100).collect::<Vec<u32>>());
    }

    #[test]
    fn waveform_amplitudes_are_bounded() {
        let config = InstrumentConfig::default();
        let w = waveform(&config, 12.345);
        assert!(w.voltage.iter().all(|v| v.abs() <= config.voltage + 1e-9));
        assert!(w.current.iter().all(|c| c.abs() <= config.current + 1e-9));
    }

    #[test]
    fn waveform_at_epoch_zero_starts_at_zero_voltage() {
        let config = InstrumentConfig {
            power_factor: 1.0,
            ..InstrumentConfig::default()
        };
        let w = waveform(&config, 0.0);
        assert_eq!(w.voltage[0], 0.0);
        // Unity power factor puts current in phase with voltage.
        assert_eq!(w.current[0], 0.0);
        // 50 Hz sampled at 1 ms: sample 5 is a quarter period.
        assert!((w.voltage[5] - config.voltage).abs() < 1e-6);
    }

    #[test]
    fn spot_measurements_stay_in_ranges() {
        let mut rng = StdRng::seed_from_u64(40);
        for _ in 0..200 {
            let m = spot_measurements(&mut rng);
            assert!((228.5..232.5).contains(&m.voltage));
            assert!((1.0..5.0).contains(&m.thd_voltage));
            assert!((2.0..8.0).contains(&m.thd_current));
            assert_eq!(m.energy, 1234.5);
            assert_eq!(m.displacement_pf, 0.95);
        }
    }

    #[test]
    fn harmonics_cover_orders_one_to_thirty_three() {
        let mut rng = StdRng::seed_from_u64(41);
        let spectrum = harmonic_spectrum(&mut rng);
        assert_eq!(spectrum.voltage_harmonics.len(), 33);
        assert_eq!(spectrum.current_harmonics.len(), 33);

        for (i, h) in spectrum.voltage_harmonics.iter().enumerate() {
            assert_eq!(usize::from(h.order), i + 1);
            assert_eq!(h.magnitude, h.percentage);
            assert!((-180.0..=180.0).contains(&h.phase));
        }

        let fundamental = spectrum.current_harmonics.first().unwrap();
        assert_eq!(fundamental.magnitude, 100.0);
        assert_eq!(spectrum.voltage_harmonics[0].magnitude, 100.0);
    }

    #[test]
    fn harmonic_bands_follow_order_class() {
        let mut rng = StdRng::seed_from_u64(42);
        let spectrum = harmonic_spectrum(&mut rng);
        let v = &spectrum.voltage_harmonics;
        let i = &spectrum.current_harmonics;
        // Third harmonic (index 2) and second harmonic (index 1).
        assert!((2.0..8.0).contains(&v[2].magnitude));
        assert!((3.0..12.0).contains(&i[2].magnitude));
        assert!((0.5..2.0).contains(&v[1].magnitude));
        assert!((1.0..4.0).contains(&i[1].magnitude));
        // Ninth harmonic falls in the higher-order band.
        assert!((0.1..1.5).contains(&v[8].magnitude));
        assert!((0.2..2.5).contains(&i[8].magnitude));
    }

    #[test]
    fn phasors_are_spaced_and_lagging() {
        let mut rng = StdRng::seed_from_u64(43);
        let set = phasors(&mut rng);
        let labels: Vec<&str> = set.voltage_phasors.iter().map(|p| p.phase.as_str()).collect();
        assert_eq!(labels, ["L1", "L2", "L3"]);

        let lag = 0.95_f64.acos().to_degrees();
        for (k, (v, c)) in set
            .voltage_phasors
            .iter()
            .zip(&set.current_phasors)
            .enumerate()
        {
            let expected = 120.0 * f64::from(u8::try_from(k).unwrap());
            assert_eq!(v.angle, expected);
            assert!((c.angle - (expected - lag)).abs() < 1e-9);
            assert!((225.0..235.0).contains(&v.magnitude));
            assert!((5.0..5.4).contains(&c.magnitude));
            assert!((v.real.hypot(v.imaginary) - 230.0).abs() < 1e-9);
            assert!((c.real.hypot(c.imaginary) - 5.2).abs() < 1e-9);
        }
    }
}
