//! The guarded simulator and every caller-facing operation.
//!
//! [`Simulator`] owns the single [`InstrumentState`] and the shared random
//! source, each behind its own `tokio::sync::Mutex`. Every operation takes
//! the state guard for one read-modify-write and releases it before
//! returning. When both guards are needed the state guard is taken first.

use std::time::Duration;

use chrono::Utc;
use metersim_types::{
    Direction, HarmonicSpectrum, InstrumentConfig, InstrumentStatus, Measurements, PhasorSet,
    ProtocolLogEntry, SpotMeasurements, TamperEvent, UartLogEntry, Waveform,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::analysis;
use crate::config::SimulatorConfig;
use crate::control::{
    self, CONFIGURATION_UPDATED, ConfigurationUpdate, ControlError, FIRMWARE_LOADED,
    SIMULATION_RESET, SIMULATION_STARTED, SIMULATION_STOPPED,
};
use crate::export::{self, ExportError};
use crate::instrument::InstrumentState;
use crate::protocol;
use crate::tick::{self, TickSummary};

/// A rendered CSV export ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested attachment file name.
    pub file_name: String,
    /// CSV document.
    pub body: String,
}

/// Owner of the instrument state.
#[derive(Debug)]
pub struct Simulator {
    state: Mutex<InstrumentState>,
    rng: Mutex<StdRng>,
    firmware_load_delay: Duration,
}

impl Simulator {
    /// Build a simulator from loaded configuration.
    ///
    /// Uses `simulation.seed` when set, OS entropy otherwise.
    pub fn new(config: &SimulatorConfig) -> Self {
        let rng = config
            .simulation
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::from_parts(
            config.instrument.to_instrument_config(),
            config.simulation.log_capacity,
            Duration::from_millis(config.simulation.firmware_load_delay_ms),
            rng,
        )
    }

    /// Build a simulator from explicit parts.
    pub fn from_parts(
        config: InstrumentConfig,
        log_capacity: usize,
        firmware_load_delay: Duration,
        mut rng: StdRng,
    ) -> Self {
        let state = InstrumentState::new(config, log_capacity, &mut rng);
        Self {
            state: Mutex::new(state),
            rng: Mutex::new(rng),
            firmware_load_delay,
        }
    }

    /// Run one update step if the simulation is running.
    ///
    /// Returns `None` while idle.
    pub async fn tick(&self) -> Option<TickSummary> {
        let mut state = self.state.lock().await;
        if !state.is_running {
            return None;
        }
        let mut rng = self.rng.lock().await;
        tick::advance(&mut state, &mut *rng);
        Some(TickSummary {
            tick: state.ticks,
            timestamp: Utc::now(),
            measurements: state.measurements,
        })
    }

    /// Snapshot of run flags, measurements, and peripherals.
    pub async fn status(&self) -> InstrumentStatus {
        self.state.lock().await.status()
    }

    /// Latest measurements stamped with the current tick count.
    pub async fn latest(&self) -> TickSummary {
        let state = self.state.lock().await;
        TickSummary {
            tick: state.ticks,
            timestamp: Utc::now(),
            measurements: state.measurements,
        }
    }

    /// Latest measurements.
    pub async fn measurements(&self) -> Measurements {
        self.state.lock().await.measurements
    }

    /// Current instrument configuration.
    pub async fn configuration(&self) -> InstrumentConfig {
        self.state.lock().await.config.clone()
    }

    /// Apply a partial configuration update.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidConfiguration`] and leaves the
    /// configuration untouched if any field is out of range.
    pub async fn update_configuration(
        &self,
        update: ConfigurationUpdate,
    ) -> Result<&'static str, ControlError> {
        if let Err(e) = update.check() {
            warn!(error = %e, "Rejected configuration update");
            return Err(e);
        }
        let mut state = self.state.lock().await;
        update.apply_to(&mut state.config);
        info!(
            voltage = state.config.voltage,
            current = state.config.current,
            frequency = state.config.frequency,
            power_factor = state.config.power_factor,
            "Configuration updated"
        );
        Ok(CONFIGURATION_UPDATED)
    }

    /// Accept a firmware image by file name.
    ///
    /// Waits the configured load delay with no guard held, then marks
    /// firmware as loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidFormat`] without waiting if `name`
    /// does not end in `.hex` or `.bin`.
    pub async fn load_firmware(&self, name: &str) -> Result<&'static str, ControlError> {
        if !control::is_firmware_file(name) {
            warn!(file = name, "Rejected firmware image");
            return Err(ControlError::InvalidFormat);
        }

        tokio::time::sleep(self.firmware_load_delay).await;

        let mut state = self.state.lock().await;
        state.firmware_loaded = true;
        state.firmware_name = Some(name.to_owned());
        info!(file = name, "Firmware loaded");
        Ok(FIRMWARE_LOADED)
    }

    /// Start the updater.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NotReady`] if no firmware has been loaded.
    pub async fn start(&self) -> Result<&'static str, ControlError> {
        let mut state = self.state.lock().await;
        if !state.firmware_loaded {
            warn!("Start requested with no firmware loaded");
            return Err(ControlError::NotReady);
        }
        state.is_running = true;
        info!(firmware = ?state.firmware_name, "Simulation started");
        Ok(SIMULATION_STARTED)
    }

    /// Stop the updater. Always succeeds.
    pub async fn stop(&self) -> &'static str {
        self.state.lock().await.is_running = false;
        info!("Simulation stopped");
        SIMULATION_STOPPED
    }

    /// Stop the updater and zero every measurement, including energy.
    pub async fn reset(&self) -> &'static str {
        let mut state = self.state.lock().await;
        state.is_running = false;
        state.measurements = Measurements::ZERO;
        info!("Simulation reset");
        SIMULATION_RESET
    }

    /// Record an active tamper event of `kind`.
    pub async fn inject_tamper(&self, kind: &str) -> String {
        let event = TamperEvent {
            kind: kind.to_owned(),
            timestamp: Utc::now(),
            active: true,
        };
        self.state.lock().await.tamper_events.push(event);
        info!(kind, "Tamper event injected");
        format!("Tamper event injected: {kind}")
    }

    /// Mark every active tamper event of `kind` inactive.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NoActiveTamper`] if none was active.
    pub async fn clear_tamper(&self, kind: &str) -> Result<String, ControlError> {
        let mut state = self.state.lock().await;
        let mut cleared = 0_usize;
        for event in state
            .tamper_events
            .iter_mut()
            .filter(|e| e.active && e.kind == kind)
        {
            event.active = false;
            cleared = cleared.saturating_add(1);
        }

        if cleared == 0 {
            return Err(ControlError::NoActiveTamper {
                kind: kind.to_owned(),
            });
        }
        info!(kind, cleared, "Tamper event cleared");
        Ok(format!("Tamper event cleared: {kind}"))
    }

    /// Every recorded tamper event, oldest first.
    pub async fn tamper_events(&self) -> Vec<TamperEvent> {
        self.state.lock().await.tamper_events.to_vec()
    }

    /// Answer a protocol command and log the exchange.
    ///
    /// Appends a TX entry and an RX entry sharing one timestamp.
    pub async fn process_protocol(&self, protocol_name: &str, command: &str) -> String {
        let mut state = self.state.lock().await;
        let timestamp = Utc::now();

        let response = protocol::respond(protocol_name, command, &state.measurements);
        state.protocol_log.push_exchange(
            ProtocolLogEntry {
                timestamp,
                direction: Direction::Tx,
                protocol: protocol_name.to_owned(),
                data: command.to_owned(),
            },
            ProtocolLogEntry {
                timestamp,
                direction: Direction::Rx,
                protocol: protocol_name.to_owned(),
                data: response.clone(),
            },
        );

        debug!(
            protocol = protocol_name,
            command,
            response = %response,
            logged = state.protocol_log.len(),
            "Protocol exchange"
        );
        response
    }

    /// Echo a UART command and log the exchange.
    pub async fn send_uart(&self, command: &str) -> String {
        let response = format!("ECHO: {command}");
        let timestamp = Utc::now();

        let mut state = self.state.lock().await;
        state.uart_log.push_exchange(
            UartLogEntry {
                timestamp,
                direction: Direction::Tx,
                data: command.to_owned(),
            },
            UartLogEntry {
                timestamp,
                direction: Direction::Rx,
                data: response.clone(),
            },
        );

        debug!(command, logged = state.uart_log.len(), "UART exchange");
        response
    }

    /// Protocol exchange log, oldest first.
    pub async fn protocol_log(&self) -> Vec<ProtocolLogEntry> {
        self.state.lock().await.protocol_log.to_vec()
    }

    /// UART exchange log, oldest first.
    pub async fn uart_log(&self) -> Vec<UartLogEntry> {
        self.state.lock().await.uart_log.to_vec()
    }

    /// Sample the nominal voltage and current sinusoids from now.
    #[allow(clippy::cast_precision_loss)]
    pub async fn waveform(&self) -> Waveform {
        let config = self.configuration().await;
        let now = Utc::now();
        let epoch_secs =
            now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0;
        analysis::waveform(&config, epoch_secs)
    }

    /// Render the current measurements as a CSV attachment.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if CSV rendering fails.
    pub async fn measurements_csv(&self) -> Result<CsvExport, ExportError> {
        let measurements = self.measurements().await;
        let now = Utc::now();
        Ok(CsvExport {
            file_name: export::export_file_name(now),
            body: export::measurements_csv(&measurements, now)?,
        })
    }

    /// Draw synthetic spot power-quality readings.
    pub async fn spot_measurements(&self) -> SpotMeasurements {
        analysis::spot_measurements(&mut *self.rng.lock().await)
    }

    /// Draw a synthetic harmonic spectrum.
    pub async fn harmonics(&self) -> HarmonicSpectrum {
        analysis::harmonic_spectrum(&mut *self.rng.lock().await)
    }

    /// Draw a synthetic three-phase phasor set.
    pub async fn phasors(&self) -> PhasorSet {
        analysis::phasors(&mut *self.rng.lock().await)
    }
}
