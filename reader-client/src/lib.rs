// src/lib.rs
// ────────────────────────────────────────────────────────────────────────────
// Public library entry point.  Re-export everything for both `main.rs` and
// integration tests.

pub mod macros;
pub mod error;
pub mod config;
pub mod comms;
pub mod keymap;
pub mod reader;

pub use error::{ReaderError, Result};
pub use reader::{read_card, Reader, ERROR_SENTINEL};

#[cfg(windows)]
pub use reader::request_reader_data;
