//! Counting stand-in for the Win32 seam.
//!
//! Every acquire and release is tallied so tests can check that each
//! resource handed out is released exactly once.

#![allow(dead_code)]

use std::{
    io,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use rfid_reader::comms::{DeviceApi, DevicePath, InterfaceClass};

/// What a device does when its IOCTL arrives.
#[derive(Clone, Debug)]
pub enum Response {
    Data(Vec<u8>),
    Fail,
    /// Completes successfully but claims more bytes than the buffer holds.
    Overreport,
    /// `CreateFileW` fails, e.g. the device vanished after enumeration.
    OpenFails,
}

#[derive(Clone, Debug)]
pub struct MockDevice {
    pub path: String,
    pub response: Response,
}

impl MockDevice {
    pub fn new(index: usize, response: Response) -> Self {
        Self {
            path: format!(r"\\?\ROOT#KEYBOARD#{index:04}#{{39ad5308-66fc-11ea-bc55-0242ac130003}}"),
            response,
        }
    }
}

#[derive(Default, Debug)]
pub struct Counters {
    pub sets_opened: AtomicUsize,
    pub sets_destroyed: AtomicUsize,
    pub open_attempts: AtomicUsize,
    pub devices_opened: AtomicUsize,
    pub devices_closed: AtomicUsize,
    pub controls: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MockApi {
    pub devices: Vec<MockDevice>,
    pub no_driver: bool,
    pub enum_error: bool,
    pub zero_detail_len: bool,
    pub detail_error: bool,
    pub detail_overreport: bool,
    pub control_delay: Option<Duration>,
    pub counters: Counters,
}

impl MockApi {
    pub fn with_devices(devices: Vec<MockDevice>) -> Self {
        Self { devices, ..Self::default() }
    }

    pub fn with_responses(responses: impl IntoIterator<Item = Response>) -> Self {
        Self::with_devices(
            responses
                .into_iter()
                .enumerate()
                .map(|(i, r)| MockDevice::new(i, r))
                .collect(),
        )
    }

    /// Every acquired set and device has been released exactly once.
    pub fn assert_balanced(&self) {
        let c = &self.counters;
        assert_eq!(
            Counters::get(&c.sets_opened),
            Counters::get(&c.sets_destroyed),
            "enumeration set leaked or double-freed"
        );
        assert_eq!(
            Counters::get(&c.devices_opened),
            Counters::get(&c.devices_closed),
            "device handle leaked or double-closed"
        );
    }

    fn detail_record(path: &str) -> Vec<u8> {
        let mut record = 8u32.to_le_bytes().to_vec();
        for unit in path.encode_utf16().chain(Some(0)) {
            record.extend_from_slice(&unit.to_le_bytes());
        }
        record
    }
}

pub struct MockSet;

impl DeviceApi for MockApi {
    type InfoSet = MockSet;
    type Interface = usize;
    type Device = usize;

    fn open_interface_set(&self, class: &InterfaceClass) -> io::Result<MockSet> {
        if self.no_driver || *class != InterfaceClass::FILTER_DEVICE {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        self.counters.sets_opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockSet)
    }

    fn destroy_interface_set(&self, _set: &MockSet) {
        self.counters.sets_destroyed.fetch_add(1, Ordering::SeqCst);
    }

    fn enum_interface(
        &self,
        _set: &MockSet,
        _class: &InterfaceClass,
        index: u32,
    ) -> io::Result<Option<usize>> {
        if self.enum_error {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        let index = index as usize;
        Ok((index < self.devices.len()).then_some(index))
    }

    fn interface_detail_len(&self, _set: &MockSet, iface: &usize) -> io::Result<usize> {
        if self.zero_detail_len {
            return Ok(0);
        }
        Ok(Self::detail_record(&self.devices[*iface].path).len())
    }

    fn interface_detail(&self, _set: &MockSet, iface: &usize, buf: &mut [u8]) -> io::Result<usize> {
        if self.detail_error {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        let record = Self::detail_record(&self.devices[*iface].path);
        buf.copy_from_slice(&record);
        if self.detail_overreport {
            return Ok(buf.len() + 2);
        }
        Ok(record.len())
    }

    fn open_device(&self, path: &DevicePath) -> io::Result<usize> {
        self.counters.open_attempts.fetch_add(1, Ordering::SeqCst);
        let index = self
            .devices
            .iter()
            .position(|d| d.path == path.as_str())
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        if let Response::OpenFails = self.devices[index].response {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        self.counters.devices_opened.fetch_add(1, Ordering::SeqCst);
        Ok(index)
    }

    fn close_device(&self, _device: &usize) {
        self.counters.devices_closed.fetch_add(1, Ordering::SeqCst);
    }

    fn device_control(
        &self,
        device: &usize,
        code: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> io::Result<usize> {
        assert_eq!(code, 0x000B_4CDC);
        assert!(input.is_empty());
        self.counters.controls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.control_delay {
            thread::sleep(delay);
        }
        match &self.devices[*device].response {
            Response::Data(bytes) => {
                let n = bytes.len().min(output.len());
                output[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Response::Fail => Err(io::Error::new(io::ErrorKind::Other, "device not ready")),
            Response::Overreport => Ok(output.len() + 1),
            Response::OpenFails => unreachable!("device never opened"),
        }
    }
}
