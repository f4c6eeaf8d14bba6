//! Failure taxonomy of the locate → open → query pipeline.
//!
//! Every variant is local and non-fatal. Callers that only want the legacy
//! text contract go through `Reader::request_reader_data_or_sentinel`, which
//! collapses all of them into `"Error"`.

use std::{io, time::Duration};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReaderError>;

#[derive(Debug, Error)]
pub enum ReaderError {
    /// No enumeration set could be opened, or nothing sits at the ordinal.
    #[error("no filter device interface present at ordinal {ordinal}")]
    DriverNotPresent { ordinal: u32 },

    /// An entry exists but its path could not be read back.
    #[error("device path resolution failed: {0}")]
    PathResolutionFailed(String),

    #[error("cannot open device {path}: {source}")]
    DeviceOpenFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("reader data request failed: {0}")]
    RequestFailed(#[source] io::Error),

    /// The driver completed the request without any scan codes.
    #[error("driver returned no scan codes")]
    EmptyResponse,

    #[error("no reader data within {0:?}")]
    Timeout(Duration),

    /// An earlier request is still waiting on the driver and cannot be
    /// picked up by this call.
    #[error("a request for ordinal {ordinal} is still pending")]
    RequestPending { ordinal: u32 },

    /// The request worker could not be started or vanished without a result.
    #[error("request worker failed: {0}")]
    Worker(String),
}
