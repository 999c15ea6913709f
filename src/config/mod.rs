//! Configuration for the MM1 tracer
//!
//! Every field has a default, so the TOML file is optional and may set any
//! subset of keys.
//!
//! # Example
//! ```toml
//! log_level = "mm1_trace=debug"
//!
//! [decoder]
//! strict_pixel_mode = false
//!
//! [plot]
//! cols = 100
//! rows = 40
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::decoder::DecoderConfig;
use crate::plot::PlotConfig;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default tracing filter directive, overridden by RUST_LOG
    pub log_level: String,
    pub decoder: DecoderConfig,
    pub plot: PlotConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            decoder: DecoderConfig::default(),
            plot: PlotConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "mm1_trace=warn".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plot.cols == 0 {
            return Err(ConfigError::InvalidValue {
                field: "plot.cols".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.plot.rows < 2 {
            return Err(ConfigError::InvalidValue {
                field: "plot.rows".to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_level".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
