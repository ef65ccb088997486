//! CSV rendering of the current measurements.

use chrono::{DateTime, Utc};
use metersim_types::Measurements;
use serde::Serialize;

/// Errors raised while rendering a CSV export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The CSV writer rejected a record.
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the in-memory buffer failed.
    #[error("csv flush failed: {0}")]
    Flush(String),

    /// The rendered bytes were not UTF-8.
    #[error("csv output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One row of the export: a single measurement field at one instant.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Timestamp")]
    timestamp: &'a str,
    #[serde(rename = "Parameter")]
    parameter: &'static str,
    #[serde(rename = "Value")]
    value: f64,
    #[serde(rename = "Unit")]
    unit: &'static str,
}

/// Attachment file name for an export taken at `at`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("simulation_data_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Render `measurements` as CSV with header `Timestamp,Parameter,Value,Unit`
/// and one row per field, every row stamped with `at`.
///
/// # Errors
///
/// Returns [`ExportError`] if the writer fails; with an in-memory buffer
/// this does not happen in practice.
pub fn measurements_csv(
    measurements: &Measurements,
    at: DateTime<Utc>,
) -> Result<String, ExportError> {
    let timestamp = at.to_rfc3339();
    let mut writer = csv::Writer::from_writer(Vec::new());

    for (field, value) in measurements.iter() {
        writer.serialize(ExportRow {
            timestamp: &timestamp,
            parameter: field.name(),
            value,
            unit: field.unit(),
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
