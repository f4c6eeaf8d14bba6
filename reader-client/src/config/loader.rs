// src/config/loader.rs

//! # Configuration Loader
//!
//! Reads `config.toml`, deserializes it into `RawConfig` and validates it
//! into the runtime `Config`.

use crate::config::model::{Config, ConfigError, RawConfig, ReaderSettings};
use crate::reader_log;
use log::Level;
use std::{fs, path::Path};

/// Load and validate the configuration at `path`.
/// Logs at DEBUG before reading and INFO on success.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    reader_log!(Level::Debug, "config", "Reading config from {:?}", path);
    let txt = fs::read_to_string(path)?;
    let cfg = parse(&txt)?;
    reader_log!(Level::Info, "config", "Loaded config from {:?}", path);
    Ok(cfg)
}

/// Validate a TOML document without touching the filesystem.
pub fn parse(txt: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(txt)?;
    raw.logging.level_filter()?;
    let reader = ReaderSettings::try_from(raw.reader)?;
    reader_log!(
        Level::Debug,
        "config",
        "Reader ordinal {}, timeout={:?}",
        reader.device_index,
        reader.timeout
    );
    Ok(Config { logging: raw.logging, reader })
}
