//! Run-control errors, reply messages, and configuration updates.
//!
//! Every caller-facing operation answers with a human-readable message.
//! Success messages are the constants below; failures are
//! [`ControlError`] values whose `Display` is the message to show.

use metersim_types::InstrumentConfig;
use serde::Deserialize;
use validator::Validate;

/// Reply to a successful firmware load.
pub const FIRMWARE_LOADED: &str = "Firmware loaded successfully";
/// Reply to a successful start.
pub const SIMULATION_STARTED: &str = "Simulation started";
/// Reply to a stop.
pub const SIMULATION_STOPPED: &str = "Simulation stopped";
/// Reply to a reset.
pub const SIMULATION_RESET: &str = "Simulation reset";
/// Reply to a configuration update.
pub const CONFIGURATION_UPDATED: &str = "Configuration updated";

/// File extensions accepted as firmware images, compared
/// case-insensitively.
pub const FIRMWARE_EXTENSIONS: [&str; 2] = [".hex", ".bin"];

/// Run-control failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    /// The firmware file name has an unsupported extension.
    #[error("Invalid file format")]
    InvalidFormat,

    /// Start was requested before any firmware was loaded.
    #[error("No firmware loaded")]
    NotReady,

    /// A configuration update carried out-of-range values.
    #[error("Invalid configuration: {fields}")]
    InvalidConfiguration {
        /// Comma-separated names of the rejected fields.
        fields: String,
    },

    /// Clearing a tamper kind that has no active event.
    #[error("No active tamper event: {kind}")]
    NoActiveTamper {
        /// The requested tamper kind.
        kind: String,
    },
}

/// Whether `name` carries an accepted firmware extension.
pub fn is_firmware_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    FIRMWARE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// A partial configuration update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct ConfigurationUpdate {
    /// Nominal line voltage in volts.
    #[validate(range(min = 0.0))]
    pub voltage: Option<f64>,

    /// Nominal load current in amperes.
    #[validate(range(min = 0.0))]
    pub current: Option<f64>,

    /// Nominal line frequency in hertz.
    #[validate(range(exclusive_min = 0.0))]
    pub frequency: Option<f64>,

    /// Power factor, `(0, 1]`.
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub power_factor: Option<f64>,

    /// Phase arrangement label.
    pub phase_config: Option<String>,

    /// Free-form MCU descriptor; replaces the previous one wholesale.
    pub mcu_config: Option<serde_json::Value>,
}

impl ConfigurationUpdate {
    /// Validate every present field.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidConfiguration`] naming each
    /// out-of-range field in alphabetical order.
    pub fn check(&self) -> Result<(), ControlError> {
        match self.invalid_fields() {
            Some(fields) => Err(ControlError::InvalidConfiguration { fields }),
            None => Ok(()),
        }
    }

    /// Comma-separated, alphabetical names of out-of-range fields, or
    /// `None` when every present field is valid.
    pub fn invalid_fields(&self) -> Option<String> {
        let errors = self.validate().err()?;
        let mut names: Vec<String> = errors
            .field_errors()
            .keys()
            .map(ToString::to_string)
            .collect();
        names.sort();
        Some(names.join(", "))
    }

    /// Write every present field into `config`.
    pub fn apply_to(self, config: &mut InstrumentConfig) {
        if let Some(voltage) = self.voltage {
            config.voltage = voltage;
        }
        if let Some(current) = self.current {
            config.current = current;
        }
        if let Some(frequency) = self.frequency {
            config.frequency = frequency;
        }
        if let Some(power_factor) = self.power_factor {
            config.power_factor = power_factor;
        }
        if let Some(phase_config) = self.phase_config {
            config.phase_config = phase_config;
        }
        if let Some(mcu_config) = self.mcu_config {
            config.mcu_config = mcu_config;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn firmware_extension_is_case_insensitive() {
        assert!(is_firmware_file("meter.hex"));
        assert!(is_firmware_file("x.HEX"));
        assert!(is_firmware_file("image.Bin"));
        assert!(!is_firmware_file("x.txt"));
        assert!(!is_firmware_file("hex"));
        assert!(!is_firmware_file(""));
    }

    #[test]
    fn error_messages_are_caller_facing() {
        assert_eq!(ControlError::InvalidFormat.to_string(), "Invalid file format");
        assert_eq!(ControlError::NotReady.to_string(), "No firmware loaded");
        assert_eq!(
            ControlError::NoActiveTamper {
                kind: String::from("magnet")
            }
            .to_string(),
            "No active tamper event: magnet"
        );
    }

    #[test]
    fn partial_update_leaves_other_fields() {
        let update: ConfigurationUpdate =
            serde_json::from_str(r#"{"voltage": 240.0, "phase_config": "three"}"#).unwrap();
        assert!(update.check().is_ok());

        let mut config = InstrumentConfig::default();
        update.apply_to(&mut config);
        assert_eq!(config.voltage, 240.0);
        assert_eq!(config.phase_config, "three");
        assert_eq!(config.current, 5.0);
        assert_eq!(config.power_factor, 0.95);
    }

    #[test]
    fn mcu_config_is_replaced_wholesale() {
        let update: ConfigurationUpdate =
            serde_json::from_str(r#"{"mcu_config": {"family": "RL78"}}"#).unwrap();
        let mut config = InstrumentConfig::default();
        update.apply_to(&mut config);
        assert_eq!(config.mcu_config, serde_json::json!({"family": "RL78"}));
    }

    #[test]
    fn power_factor_must_be_in_unit_interval() {
        for pf in [0.0, -0.5, 1.01] {
            let update = ConfigurationUpdate {
                power_factor: Some(pf),
                ..ConfigurationUpdate::default()
            };
            assert_eq!(
                update.check(),
                Err(ControlError::InvalidConfiguration {
                    fields: String::from("power_factor")
                })
            );
        }
        let update = ConfigurationUpdate {
            power_factor: Some(1.0),
            ..ConfigurationUpdate::default()
        };
        assert!(update.check().is_ok());
    }

    #[test]
    fn rejected_fields_are_listed_alphabetically() {
        let update = ConfigurationUpdate {
            voltage: Some(-1.0),
            frequency: Some(0.0),
            ..ConfigurationUpdate::default()
        };
        let err = update.check().unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: frequency, voltage");
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(ConfigurationUpdate::default().check().is_ok());
    }
}
