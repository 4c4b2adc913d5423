//! Compiler configuration
//!
//! Settings are read from TOML, optionally layered (a base file plus an
//! overlay whose values win), then adjusted from environment variables:
//!
//! ```toml
//! parameterized = true
//! strict_predicates = false
//!
//! [dialects.sqlserver]
//! timestamp_format = "%Y-%m-%dT%H:%M:%S%.3f"
//! max_statement_length = 1048576
//! ```
//!
//! Environment overrides: `RUSTF_SQL_PARAMETERIZED`, `RUSTF_SQL_STRICT`.

use crate::error::{Error, Result};
use crate::query_builder::DatabaseBackend;
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt::{self, Write as _};

#[cfg(feature = "config")]
use crate::error::ErrorContext;
#[cfg(feature = "config")]
use std::fs;
#[cfg(feature = "config")]
use std::path::Path;

/// Compiler-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Bind literals through placeholders unless a statement asks otherwise
    #[serde(default = "default_parameterized")]
    pub parameterized: bool,
    /// Fail on malformed predicates instead of dropping them with a warning
    #[serde(default)]
    pub strict_predicates: bool,
    /// Per-dialect overrides keyed by backend name (`sqlserver`, `mysql`, ...)
    #[serde(default)]
    pub dialects: BTreeMap<String, DialectOverrides>,
}

/// Overrides for one dialect; unset fields keep the dialect's defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialectOverrides {
    #[serde(default)]
    pub timestamp_format: Option<String>,
    #[serde(default)]
    pub timestamp_offset_format: Option<String>,
    #[serde(default)]
    pub max_statement_length: Option<usize>,
}

fn default_parameterized() -> bool {
    true
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            parameterized: default_parameterized(),
            strict_predicates: false,
            dialects: BTreeMap::new(),
        }
    }
}

impl CompilerConfig {
    /// Parse configuration from TOML text
    #[cfg(feature = "config")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CompilerConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    #[cfg(feature = "config")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let content = fs::read_to_string(path_ref).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}. Make sure the file exists and is readable.",
                path_ref.display(),
                e
            ))
        })?;

        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in '{}'", path_ref.display()))?;

        log::debug!(
            "Successfully loaded configuration from: {}",
            path_ref.display()
        );
        Ok(config)
    }

    /// Load a base file and merge an overlay over it at the TOML level
    ///
    /// A missing overlay is not an error; the base is used alone.
    #[cfg(feature = "config")]
    pub fn load_layered<P: AsRef<Path>, Q: AsRef<Path>>(base: P, overlay: Q) -> Result<Self> {
        let mut merged = Self::load_toml_value(base)?;

        let overlay = overlay.as_ref();
        if overlay.exists() {
            log::debug!("Merging configuration overlay: {}", overlay.display());
            let overlay_value = Self::load_toml_value(overlay)?;
            merged = serde_toml_merge::merge(merged, overlay_value)
                .map_err(|e| Error::config(format!("Failed to merge configuration files: {}", e)))?;
        } else {
            log::warn!(
                "Configuration overlay not found, using base only: {}",
                overlay.display()
            );
        }

        // Convert toml::Value to serde_json::Value for deserialization
        let json_value = serde_json::to_value(&merged)?;
        let config: CompilerConfig = serde_json::from_value(json_value)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "config")]
    fn load_toml_value<P: AsRef<Path>>(path: P) -> Result<toml::Value> {
        let path_ref = path.as_ref();

        let content = fs::read_to_string(path_ref).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path_ref.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}. Check TOML syntax.",
                path_ref.display(),
                e
            ))
        })
    }

    /// Apply `RUSTF_SQL_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = env::var("RUSTF_SQL_PARAMETERIZED") {
            self.parameterized = parse_flag("RUSTF_SQL_PARAMETERIZED", &value)?;
        }
        if let Ok(value) = env::var("RUSTF_SQL_STRICT") {
            self.strict_predicates = parse_flag("RUSTF_SQL_STRICT", &value)?;
        }
        Ok(())
    }

    /// Overrides for a backend, if configured
    ///
    /// Sections may use any accepted backend alias, e.g. `[dialects.mssql]`.
    pub fn dialect(&self, backend: DatabaseBackend) -> Option<&DialectOverrides> {
        self.dialects
            .iter()
            .find(|(name, _)| name.parse::<DatabaseBackend>().ok() == Some(backend))
            .map(|(_, overrides)| overrides)
    }

    /// Reject unknown dialect sections, unusable formats and zero limits
    ///
    /// Formats are tried on sample values, so `%z` in `timestamp_format` is
    /// caught here rather than when a naive timestamp is rendered.
    pub fn validate(&self) -> Result<()> {
        let naive = NaiveDateTime::default();
        let with_offset = Utc.from_utc_datetime(&naive).fixed_offset();

        for (name, overrides) in &self.dialects {
            name.parse::<DatabaseBackend>()
                .map_err(|_| Error::config(format!("Unknown dialect section '{}'", name)))?;

            if let Some(format) = &overrides.timestamp_format {
                check_format(name, format, naive.format(format))?;
            }
            if let Some(format) = &overrides.timestamp_offset_format {
                check_format(name, format, with_offset.format(format))?;
            }

            if overrides.max_statement_length == Some(0) {
                return Err(Error::config(format!(
                    "max_statement_length for dialect '{}' cannot be 0",
                    name
                )));
            }
        }

        Ok(())
    }
}

fn check_format(dialect: &str, format: &str, sample: impl fmt::Display) -> Result<()> {
    let mut rendered = String::new();
    write!(rendered, "{}", sample).map_err(|_| {
        Error::config(format!(
            "Invalid timestamp format '{}' for dialect '{}'",
            format, dialect
        ))
    })
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::config(format!("Invalid {} value '{}'", name, value))),
    }
}
