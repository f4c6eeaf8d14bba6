// src/main.rs

//! Console host for the RFID reader filter driver.
//!
//! 1. Load `config.toml` next to the executable
//! 2. Set up structured logging
//! 3. List the reader interfaces currently present
//! 4. Request one card from the configured ordinal
//! 5. Print the text, or `Error`
//!
// ───── std / 3rd-party imports ──────────────────────────────────────────────
use anyhow::{Context, Result};
use chrono::Local;
use fern::Dispatch;
use std::{
    path::{Path, PathBuf},
    process, thread,
};

// ───── local imports ────────────────────────────────────────────────────────
use rfid_reader::config::{self, model::LoggingConfig, Config};

// ───── helpers ──────────────────────────────────────────────────────────────

/// Directory that contains the running executable.
fn exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot determine exe path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable must live in some directory")
}

/// Configure global logging as requested in `[logging]`.
fn setup_logging(exe_dir: &Path, logging: &LoggingConfig) -> Result<()> {
    let level = logging.level_filter()?;

    let log_path = logging
        .enable
        .then(|| exe_dir.join(logging.file.as_deref().unwrap_or("reader.log")));

    let mut dispatch = Dispatch::new()
        .format(|out, msg, record| {
            out.finish(format_args!(
                "[{}][{:5}][{}][pid={}][tid={:?}] {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                process::id(),
                thread::current().id(),
                msg
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = log_path {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

// ───── request ──────────────────────────────────────────────────────────────

#[cfg(windows)]
fn run(cfg: &Config) -> Result<bool> {
    use rfid_reader::{Reader, ERROR_SENTINEL};

    let reader = Reader::system().with_timeout(cfg.reader.timeout);

    match reader.device_paths() {
        Ok(paths) => {
            for (ordinal, path) in paths.iter().enumerate() {
                log::info!("reader #{ordinal}: {path}");
            }
        }
        Err(e) => log::warn!("cannot list reader interfaces: {e}"),
    }

    match reader.request_reader_data(cfg.reader.device_index) {
        Ok(text) => {
            println!("{text}");
            Ok(true)
        }
        Err(e) => {
            log::error!("reader #{}: {e}", cfg.reader.device_index);
            println!("{ERROR_SENTINEL}");
            Ok(false)
        }
    }
}

#[cfg(not(windows))]
fn run(_cfg: &Config) -> Result<bool> {
    log::error!("the reader filter driver is only reachable from a Windows host");
    println!("{}", rfid_reader::ERROR_SENTINEL);
    Ok(false)
}

fn main() -> Result<()> {
    // 1 ─ Context
    let exe_dir = exe_dir()?;
    let cfg_path = exe_dir.join("config.toml");
    let cfg = config::load(&cfg_path)
        .with_context(|| format!("loading {}", cfg_path.display()))?;

    // 2 ─ Logging
    setup_logging(&exe_dir, &cfg.logging).context("logging setup failed")?;
    log::info!("reader host started for ordinal {}", cfg.reader.device_index);

    // 3 ─ Request
    if !run(&cfg)? {
        process::exit(1);
    }
    Ok(())
}
