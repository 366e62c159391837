//! TOML-based settlement job configuration.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level job configuration parsed from TOML.
///
/// Describes one settlement run: where the entity and event rows come from,
/// which VPP and month to settle, and where to write the report. Load from
/// TOML with [`JobConfig::from_toml_file`]; CLI flags may fill or override
/// any field before [`JobConfig::validate`] runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Input file locations.
    #[serde(default)]
    pub input: InputConfig,
    /// Report selector.
    #[serde(default)]
    pub report: ReportConfig,
    /// Optional output sinks.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Input file locations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Path to the tagged entity rows CSV (required).
    pub entities: String,
    /// Path to the metering events CSV (required).
    pub events: String,
}

/// Report selector: which VPP and month to settle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// VPP name (required).
    pub vpp: String,
    /// Month selector, `"YYYY-MM"` (required).
    pub month: String,
}

/// Optional output sinks. An absent sink means no file is written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Write the full report as JSON to this path.
    pub json: Option<String>,
    /// Write the per-site rows as CSV to this path.
    pub csv: Option<String>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"report.month"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl JobConfig {
    /// Parses a job from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "job".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a job from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid. The month
    /// shape is checked here so the engine's date-prefix filter is never
    /// fed a malformed selector.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.input.entities.is_empty() {
            errors.push(ConfigError {
                field: "input.entities".into(),
                message: "path is required".into(),
            });
        }
        if self.input.events.is_empty() {
            errors.push(ConfigError {
                field: "input.events".into(),
                message: "path is required".into(),
            });
        }
        if self.report.vpp.is_empty() {
            errors.push(ConfigError {
                field: "report.vpp".into(),
                message: "vpp name is required".into(),
            });
        }
        if self.report.month.is_empty() {
            errors.push(ConfigError {
                field: "report.month".into(),
                message: "month selector is required".into(),
            });
        } else if !is_year_month(&self.report.month) {
            errors.push(ConfigError {
                field: "report.month".into(),
                message: format!(
                    "must be \"YYYY-MM\" with month 01-12, got \"{}\"",
                    self.report.month
                ),
            });
        }

        errors
    }
}

/// Checks the `"YYYY-MM"` shape: four digits, a dash, and a two-digit month
/// in 01..=12.
pub(crate) fn is_year_month(s: &str) -> bool {
    match s.split_once('-') {
        Some((year, month)) => {
            year.len() == 4
                && month.len() == 2
                && year.bytes().all(|b| b.is_ascii_digit())
                && month.bytes().all(|b| b.is_ascii_digit())
                && matches!(month.parse::<u8>(), Ok(1..=12))
        }
        None => false,
    }
}
