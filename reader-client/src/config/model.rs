// src/config/model.rs

use log::LevelFilter;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Top-level runtime config
#[derive(Debug, Clone)]
pub struct Config {
    pub logging: LoggingConfig,
    pub reader:  ReaderSettings,
}

/// Mirror of the whole TOML document
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    #[serde(default)] pub logging: LoggingConfig,
    #[serde(default)] pub reader:  ReaderStub,
}

/// Mirror of the `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]            pub enable: bool,
    #[serde(default)]            pub file:   Option<String>,
    #[serde(default = "default_level")] pub level: String,
}
fn default_level() -> String { "INFO".into() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enable: false, file: None, level: default_level() }
    }
}

impl LoggingConfig {
    /// `level` as a filter; case-insensitive.
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        match self.level.to_uppercase().as_str() {
            "OFF"   => Ok(LevelFilter::Off),
            "ERROR" => Ok(LevelFilter::Error),
            "WARN"  => Ok(LevelFilter::Warn),
            "INFO"  => Ok(LevelFilter::Info),
            "DEBUG" => Ok(LevelFilter::Debug),
            "TRACE" => Ok(LevelFilter::Trace),
            _       => Err(ConfigError::InvalidLevel(self.level.clone())),
        }
    }
}

/// Raw `[reader]` table
#[derive(Debug, Default, Deserialize)]
pub struct ReaderStub {
    #[serde(default)] pub device_index: u32,
    /// humantime string, e.g. `"30s"`; absent → block without limit
    #[serde(default)] pub timeout:      Option<String>,
}

/// Fully-typed reader settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSettings {
    pub device_index: u32,
    pub timeout:      Option<Duration>,
}

/// All the ways config loading can go wrong
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("invalid duration '{0}': {1}")]
    InvalidDuration(String, #[source] humantime::DurationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TryFrom<ReaderStub> for ReaderSettings {
    type Error = ConfigError;

    fn try_from(stub: ReaderStub) -> Result<Self, Self::Error> {
        let timeout = stub
            .timeout
            .map(|t| humantime::parse_duration(&t).map_err(|e| ConfigError::InvalidDuration(t, e)))
            .transpose()?;
        Ok(ReaderSettings { device_index: stub.device_index, timeout })
    }
}
