//! IOCTL channel to the reader filter driver.
//!
//! Opens the resolved device path and sends `IOCTL_REQUEST_READER_DATA`.
//! The driver parks the request until the reader emits a card, then
//! completes it with the raw scan codes.
//!
//! Key responsibilities:
//! - Open the device non-destructively (existing interface only).
//! - Send the control code with no input and a fixed-size output buffer.
//! - Tell OS failures apart from "completed, but nothing captured".
//! - Close the handle before returning, whatever the outcome.

use std::io;

use log::Level;
use shared::constants::{IOCTL_REQUEST_READER_DATA, SCAN_BUFFER_LEN};

use super::{DeviceApi, DeviceHandle, DevicePath};
use crate::error::{ReaderError, Result};
use crate::reader_log;

/// Scan codes returned by one request. Only the reported prefix is kept
/// visible; the rest of the driver buffer is undefined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanBuffer {
    bytes: [u8; SCAN_BUFFER_LEN],
    len: usize,
}

impl ScanBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Open `path`, request one card read and close the device again.
///
/// Blocks the calling thread until the driver completes the request.
pub fn query_scan_data<A: DeviceApi>(api: &A, path: &DevicePath) -> Result<ScanBuffer> {
    let device = DeviceHandle::open(api, path).map_err(|source| {
        reader_log!(Level::Warn, "channel", "Cannot open {}: {}", path, source);
        ReaderError::DeviceOpenFailed { path: path.to_string(), source }
    })?;

    let mut bytes = [0u8; SCAN_BUFFER_LEN];
    let returned = device.control(IOCTL_REQUEST_READER_DATA, &[], &mut bytes);
    drop(device);

    let returned = returned.map_err(|e| {
        reader_log!(Level::Warn, "channel", "IOCTL {:#x} failed: {}", IOCTL_REQUEST_READER_DATA, e);
        ReaderError::RequestFailed(e)
    })?;

    if returned == 0 {
        reader_log!(Level::Debug, "channel", "Request completed without scan codes");
        return Err(ReaderError::EmptyResponse);
    }
    if returned > SCAN_BUFFER_LEN {
        return Err(ReaderError::RequestFailed(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("driver reported {returned} bytes for a {SCAN_BUFFER_LEN}-byte buffer"),
        )));
    }

    reader_log!(Level::Debug, "channel", "Received {} scan code(s)", returned);
    Ok(ScanBuffer { bytes, len: returned })
}
