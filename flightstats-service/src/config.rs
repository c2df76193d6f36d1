//! Application configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working setup:
//!
//! ```toml
//! database = "flight_stats.db"
//! log_level = "info"
//!
//! [ingest]
//! chunk_size = 10000
//! carrier = "GLO"
//! flight_group = "REGULAR"
//! nature = "DOMÉSTICA"
//! ```
//!
//! The row filter compares values exactly. The default `nature` is the
//! Portuguese label used by the published statistics files; files labelled in
//! English need `nature = "DOMESTIC"` under `[ingest]`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use flightstats_core::data::{IngestOptions, RowFilter, DEFAULT_CHUNK_SIZE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Default `env_logger` filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub ingest: IngestConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("flight_stats.db"),
            log_level: "info".to_string(),
            ingest: IngestConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// `[ingest]` table: chunking and the row filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub carrier: String,
    pub flight_group: String,
    /// Exact `NATUREZA` value to keep, e.g. `"DOMÉSTICA"` or `"DOMESTIC"`.
    pub nature: String,
    pub delimiter: char,
    pub preamble_lines: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let filter = RowFilter::default();
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            carrier: filter.carrier,
            flight_group: filter.flight_group,
            nature: filter.nature,
            delimiter: ';',
            preamble_lines: 1,
        }
    }
}

impl IngestConfig {
    /// Convert to the options the ingest pipeline takes.
    ///
    /// The delimiter must be a single ASCII character.
    pub fn to_options(&self) -> Result<IngestOptions, ConfigError> {
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::Invalid(format!(
                "delimiter {:?} is not an ASCII character",
                self.delimiter
            )));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be at least 1".into()));
        }
        Ok(IngestOptions {
            chunk_size: self.chunk_size,
            row_filter: RowFilter {
                carrier: self.carrier.clone(),
                flight_group: self.flight_group.clone(),
                nature: self.nature.clone(),
            },
            delimiter: self.delimiter as u8,
            preamble_lines: self.preamble_lines,
        })
    }
}
