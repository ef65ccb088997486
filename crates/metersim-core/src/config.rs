//! Configuration loading and typed config structures for the simulator.
//!
//! The optional configuration file is `metersim-config.yaml` in the working
//! directory (or a path given on the command line). Every field has a
//! default, so an empty or missing file yields a working setup.
//!
//! Precedence, lowest to highest: built-in defaults, YAML file, the `HOST`
//! and `PORT` environment variables, command-line flags. The last two are
//! applied by the binary through [`ServerSettings::apply_overrides`].
//!
//! Instrument boot values are range-checked at load time with the same
//! rules as a runtime configuration update.

use std::path::{Path, PathBuf};

use metersim_types::InstrumentConfig;
use serde::Deserialize;

use crate::control::ConfigurationUpdate;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "metersim-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The `PORT` override is not a valid TCP port.
    #[error("invalid PORT value {value:?}")]
    InvalidPort {
        /// The rejected value.
        value: String,
    },

    /// An `instrument` value is out of range.
    #[error("invalid instrument settings: {fields}")]
    InvalidInstrument {
        /// Comma-separated names of the rejected fields.
        fields: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulatorConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Updater timing, random source, and log sizing.
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Values the instrument boots with.
    #[serde(default)]
    pub instrument: InstrumentSettings,
}

impl SimulatorConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise
    /// see [`parse`](Self::parse).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML and
    /// [`ConfigError::InvalidInstrument`] if an instrument value is out of
    /// range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.instrument.check()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// See [`from_file`](Self::from_file).
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        Ok(Self::default())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/static`, if any.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl ServerSettings {
    /// Override host and port from `HOST` and `PORT` as returned by
    /// `lookup`. Keys the lookup does not answer are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if the `PORT` value does not
    /// parse as a `u16`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(raw) = lookup("PORT") {
            self.port = raw
                .trim()
                .parse()
                .map_err(|_parse| ConfigError::InvalidPort { value: raw.clone() })?;
        }
        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

/// Updater timing, random source, and log sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSettings {
    /// Milliseconds between updater ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Simulated firmware flashing time in milliseconds.
    #[serde(default = "default_firmware_load_delay_ms")]
    pub firmware_load_delay_ms: u64,

    /// Seed for the shared random source. `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Maximum entries retained per event log.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            firmware_load_delay_ms: default_firmware_load_delay_ms(),
            seed: None,
            log_capacity: default_log_capacity(),
        }
    }
}

/// Values the instrument boots with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstrumentSettings {
    /// Nominal line voltage in volts.
    #[serde(default = "default_voltage")]
    pub voltage: f64,

    /// Nominal load current in amperes.
    #[serde(default = "default_current")]
    pub current: f64,

    /// Nominal line frequency in hertz.
    #[serde(default = "default_frequency")]
    pub frequency: f64,

    /// Power factor in `(0, 1]`.
    #[serde(default = "default_power_factor")]
    pub power_factor: f64,

    /// Phase arrangement label.
    #[serde(default = "default_phase_config")]
    pub phase_config: String,
}

impl InstrumentSettings {
    /// Range-check every value the way a runtime update is checked.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInstrument`] naming each rejected
    /// field.
    pub fn check(&self) -> Result<(), ConfigError> {
        let update = ConfigurationUpdate {
            voltage: Some(self.voltage),
            current: Some(self.current),
            frequency: Some(self.frequency),
            power_factor: Some(self.power_factor),
            ..ConfigurationUpdate::default()
        };
        match update.invalid_fields() {
            Some(fields) => Err(ConfigError::InvalidInstrument { fields }),
            None => Ok(()),
        }
    }

    /// Build the boot-time instrument configuration.
    pub fn to_instrument_config(&self) -> InstrumentConfig {
        InstrumentConfig {
            voltage: self.voltage,
            current: self.current,
            frequency: self.frequency,
            power_factor: self.power_factor,
            phase_config: self.phase_config.clone(),
            ..InstrumentConfig::default()
        }
    }
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            voltage: default_voltage(),
            current: default_current(),
            frequency: default_frequency(),
            power_factor: default_power_factor(),
            phase_config: default_phase_config(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    5000
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_firmware_load_delay_ms() -> u64 {
    500
}

const fn default_log_capacity() -> usize {
    1000
}

const fn default_voltage() -> f64 {
    230.0
}

const fn default_current() -> f64 {
    5.0
}

const fn default_frequency() -> f64 {
    50.0
}

const fn default_power_factor() -> f64 {
    0.95
}

fn default_phase_config() -> String {
    "single".to_owned()
}
