//! Configuration file loading and parsing.
//!
//! The engine reads optional settings from `config.toml` in the data
//! directory. If no config file exists, every setting falls back to its
//! default.
//!
//! ```toml
//! [labels]
//! default_color = "#428BCA"
//!
//! [query]
//! default_sort = "milestone_due_asc"
//!
//! [logging]
//! level = "info"
//! ```

use crate::labels::DEFAULT_COLOR;
use crate::query::SortKey;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure loaded from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuableConfig {
    /// Label creation settings (optional).
    pub labels: Option<LabelsConfig>,
    /// Query defaults (optional).
    pub query: Option<QueryConfig>,
    /// Logging settings for the binary (optional).
    pub logging: Option<LoggingConfig>,
}

/// Label creation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelsConfig {
    /// Color for labels created implicitly by name (default: "#428BCA").
    pub default_color: Option<String>,
}

/// Query defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Sort key used when a query names none (default: "recent").
    pub default_sort: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence
    /// (default: "warn").
    pub level: Option<String>,
}

impl IssuableConfig {
    /// Load configuration from `<root>/config.toml` if it exists.
    ///
    /// Returns the default config if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join("config.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path).context("Failed to read config.toml")?;
        let config: IssuableConfig =
            toml::from_str(&content).context("Failed to parse config.toml")?;

        Ok(config)
    }

    /// Color given to labels created by name.
    pub fn default_label_color(&self) -> String {
        self.labels
            .as_ref()
            .and_then(|l| l.default_color.clone())
            .unwrap_or_else(|| DEFAULT_COLOR.to_string())
    }

    /// Sort applied when a query names none; unknown keys degrade to
    /// `recent` like any other sort key.
    pub fn default_sort(&self) -> SortKey {
        self.query
            .as_ref()
            .and_then(|q| q.default_sort.as_deref())
            .map(SortKey::parse)
            .unwrap_or(SortKey::RECENT)
    }

    /// Default log filter directive.
    pub fn log_level(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| "warn".to_string())
    }
}
