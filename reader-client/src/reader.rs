//! Request entry points.
//!
//! `read_card` is the whole pipeline on the calling thread. `Reader` wraps
//! it with a scheduling policy:
//!
//!   • no timeout  → runs on the caller's thread, blocking until the driver
//!     completes the request.
//!   • timeout     → runs on a dedicated worker thread; the caller waits on a
//!     result channel and gets `ReaderError::Timeout` when it expires.
//!
//! A request whose caller timed out keeps its device handle and IOCTL until
//! the driver answers. `Reader` holds on to it: the next call for the same
//! ordinal waits on that request instead of issuing another one, and calls
//! for other ordinals get `ReaderError::RequestPending` until it settles.
//!
//! `request_reader_data_or_sentinel` keeps the original text contract:
//! translated text, or `"Error"`.

use std::{
    sync::{Arc, Mutex, PoisonError},
    thread,
    time::Duration,
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use log::Level;
use tokio::task::JoinHandle;

use crate::comms::{
    enumerate_device_paths, query_scan_data, resolve_device_path, DeviceApi, DevicePath,
    InterfaceClass,
};
use crate::error::{ReaderError, Result};
use crate::keymap::{translate, KeyboardLayout};
use crate::reader_log;

#[cfg(windows)]
use crate::{comms::win32::Win32Api, keymap::SystemLayout};

/// Text returned by the sentinel entry points on any failure.
pub const ERROR_SENTINEL: &str = "Error";

/// Locate → open → query → translate, blocking the calling thread.
pub fn read_card<A, L>(api: &A, layout: &L, device_index: u32) -> Result<String>
where
    A: DeviceApi,
    L: KeyboardLayout + ?Sized,
{
    let path = resolve_device_path(api, &InterfaceClass::FILTER_DEVICE, device_index)?;
    let scan = query_scan_data(api, &path)?;
    Ok(translate(layout, scan.as_bytes()))
}

/// A request running off the caller's thread.
enum InFlight {
    Worker {
        device_index: u32,
        rx: Receiver<Result<String>>,
    },
    Task {
        device_index: u32,
        task: JoinHandle<Result<String>>,
    },
}

impl InFlight {
    fn device_index(&self) -> u32 {
        match self {
            InFlight::Worker { device_index, .. } | InFlight::Task { device_index, .. } => {
                *device_index
            }
        }
    }

    /// The driver has answered.
    fn is_settled(&self) -> bool {
        match self {
            InFlight::Worker { rx, .. } => !rx.is_empty(),
            InFlight::Task { task, .. } => task.is_finished(),
        }
    }

    /// Blocking callers can only wait on a worker thread.
    fn resumable_blocking(&self) -> bool {
        matches!(self, InFlight::Worker { .. })
    }

    /// Async callers await a task, or collect a worker's finished result.
    fn resumable_async(&self) -> bool {
        match self {
            InFlight::Task { .. } => true,
            InFlight::Worker { rx, .. } => !rx.is_empty(),
        }
    }
}

enum Slot {
    Idle,
    /// A caller is waiting on this ordinal right now.
    Waiting(u32),
    /// Its caller gave up; the request is still with the driver.
    Detached(InFlight),
}

/// Exclusive right to issue or wait on a request. Dropping it with a request
/// still held parks that request in the slot for the next caller.
struct Claim<'a> {
    slot: &'a Mutex<Slot>,
    request: Option<InFlight>,
}

impl Claim<'_> {
    fn wait_blocking(&mut self, timeout: Option<Duration>) -> Result<String> {
        let Some(InFlight::Worker { device_index, rx }) = self.request.take() else {
            return Err(worker_exited());
        };
        let Some(limit) = timeout else {
            return rx.recv().unwrap_or_else(|_| Err(worker_exited()));
        };

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                reader_log!(Level::Warn, "reader", "Ordinal {} gave no data within {:?}", device_index, limit);
                self.request = Some(InFlight::Worker { device_index, rx });
                Err(ReaderError::Timeout(limit))
            }
            Err(RecvTimeoutError::Disconnected) => Err(worker_exited()),
        }
    }

    async fn wait_async(&mut self, timeout: Option<Duration>) -> Result<String> {
        if let Some(InFlight::Worker { .. }) = self.request {
            return match self.request.take() {
                Some(InFlight::Worker { rx, .. }) => {
                    rx.try_recv().unwrap_or_else(|_| Err(worker_exited()))
                }
                _ => Err(worker_exited()),
            };
        }
        let Some(InFlight::Task { device_index, task }) = self.request.as_mut() else {
            return Err(worker_exited());
        };
        let device_index = *device_index;

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    reader_log!(Level::Warn, "reader", "Ordinal {} gave no data within {:?}", device_index, limit);
                    return Err(ReaderError::Timeout(limit));
                }
            },
            None => task.await,
        };
        self.request = None;
        joined.map_err(|e| ReaderError::Worker(e.to_string()))?
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let next = match self.request.take() {
            Some(request) => Slot::Detached(request),
            None => Slot::Idle,
        };
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

fn worker_exited() -> ReaderError {
    ReaderError::Worker("worker exited without a result".into())
}

pub struct Reader<A, L> {
    api: Arc<A>,
    layout: Arc<L>,
    timeout: Option<Duration>,
    slot: Mutex<Slot>,
}

impl<A, L> Reader<A, L> {
    pub fn new(api: A, layout: L) -> Self {
        Self {
            api: Arc::new(api),
            layout: Arc::new(layout),
            timeout: None,
            slot: Mutex::new(Slot::Idle),
        }
    }

    /// `None` blocks the caller for as long as the driver holds the request.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Takes the slot for `device_index`. The returned claim carries the
    /// pending request to resume, if there is one this caller can wait on.
    fn claim(&self, device_index: u32, resumable: fn(&InFlight) -> bool) -> Result<Claim<'_>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let resumed = match std::mem::replace(&mut *slot, Slot::Waiting(device_index)) {
            Slot::Idle => None,
            Slot::Waiting(ordinal) => {
                *slot = Slot::Waiting(ordinal);
                return Err(ReaderError::RequestPending { ordinal });
            }
            Slot::Detached(request)
                if request.device_index() == device_index && resumable(&request) =>
            {
                Some(request)
            }
            // Answered, but for a caller that no longer asks for it.
            Slot::Detached(request) if request.is_settled() => None,
            Slot::Detached(request) => {
                let ordinal = request.device_index();
                *slot = Slot::Detached(request);
                return Err(ReaderError::RequestPending { ordinal });
            }
        };
        drop(slot);

        Ok(Claim {
            slot: &self.slot,
            request: resumed,
        })
    }
}

impl<A: DeviceApi, L: KeyboardLayout> Reader<A, L> {
    /// Paths of all attached reader interfaces, indexed by ordinal.
    pub fn device_paths(&self) -> Result<Vec<DevicePath>> {
        enumerate_device_paths(&*self.api, &InterfaceClass::FILTER_DEVICE)
    }
}

impl<A, L> Reader<A, L>
where
    A: DeviceApi + Send + Sync + 'static,
    L: KeyboardLayout + Send + Sync + 'static,
{
    pub fn request_reader_data(&self, device_index: u32) -> Result<String> {
        let mut claim = self.claim(device_index, InFlight::resumable_blocking)?;
        if claim.request.is_none() {
            if self.timeout.is_none() {
                return read_card(&*self.api, &*self.layout, device_index);
            }
            claim.request = Some(self.spawn_worker(device_index)?);
        }
        claim.wait_blocking(self.timeout)
    }

    /// Legacy contract: text on success, [`ERROR_SENTINEL`] otherwise.
    pub fn request_reader_data_or_sentinel(&self, device_index: u32) -> String {
        self.request_reader_data(device_index).unwrap_or_else(|e| {
            reader_log!(Level::Warn, "reader", "Request for ordinal {} failed: {}", device_index, e);
            ERROR_SENTINEL.to_string()
        })
    }

    /// Same pipeline on tokio's blocking pool, bounded by the configured
    /// timeout.
    pub async fn request_reader_data_async(&self, device_index: u32) -> Result<String> {
        let mut claim = self.claim(device_index, InFlight::resumable_async)?;
        if claim.request.is_none() {
            let api = Arc::clone(&self.api);
            let layout = Arc::clone(&self.layout);
            let task =
                tokio::task::spawn_blocking(move || read_card(&*api, &*layout, device_index));
            claim.request = Some(InFlight::Task { device_index, task });
        }
        claim.wait_async(self.timeout).await
    }

    fn spawn_worker(&self, device_index: u32) -> Result<InFlight> {
        let (tx, rx) = channel::bounded(1);
        let api = Arc::clone(&self.api);
        let layout = Arc::clone(&self.layout);

        thread::Builder::new()
            .name(format!("reader-request-{device_index}"))
            .spawn(move || {
                // The reader may be gone by now; the result is dropped then.
                let _ = tx.send(read_card(&*api, &*layout, device_index));
            })
            .map_err(|e| ReaderError::Worker(e.to_string()))?;

        Ok(InFlight::Worker { device_index, rx })
    }
}

#[cfg(windows)]
impl Reader<Win32Api, SystemLayout> {
    /// Live driver access with the active keyboard layout.
    pub fn system() -> Self {
        Reader::new(Win32Api, SystemLayout)
    }
}

/// Read one card from the reader at `device_index`, returning its text or
/// [`ERROR_SENTINEL`]. Blocks until the driver completes the request.
#[cfg(windows)]
pub fn request_reader_data(device_index: u32) -> String {
    Reader::system().request_reader_data_or_sentinel(device_index)
}
