//! Communication with the RFID reader filter driver.
//!
//! The driver publishes a device interface on a raw PDO per keyboard it
//! filters. Talking to it takes three steps:
//!
//!   ordinal ─▶ locator (SetupDi enumeration) ─▶ DevicePath
//!   DevicePath ─▶ ioctl (CreateFileW + DeviceIoControl) ─▶ ScanBuffer
//!
//! Every OS call goes through [`DeviceApi`] so the pipeline can be driven by
//! the real Win32 implementation or by a counting stand-in in tests.
//!
//! Key responsibilities:
//! - Resolve an interface ordinal to an openable path.
//! - Issue the reader-data IOCTL and validate what comes back.
//! - Release every enumeration set and device handle exactly once.

pub mod handles;
pub mod ioctl;
pub mod locator;

#[cfg(windows)]
pub mod win32;

use std::{fmt, io};

use shared::constants::FILTER_DEVICE_INTERFACE;

pub use handles::{DeviceHandle, InterfaceSet};
pub use ioctl::{query_scan_data, ScanBuffer};
pub use locator::{enumerate_device_paths, resolve_device_path};

/// 128-bit device interface class identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterfaceClass(u128);

impl InterfaceClass {
    /// The class registered by the reader filter driver.
    pub const FILTER_DEVICE: InterfaceClass = InterfaceClass(FILTER_DEVICE_INTERFACE);

    pub const fn from_u128(value: u128) -> Self {
        InterfaceClass(value)
    }

    pub const fn as_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for InterfaceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:04X}-{:012X}}}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF,
        )
    }
}

/// OS path of one device interface instance. Only lives for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DevicePath(String);

impl DevicePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DevicePath {
    fn from(path: String) -> Self {
        DevicePath(path)
    }
}

impl fmt::Display for DevicePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The OS calls the driver pipeline is built from.
///
/// Release methods take the resource by reference; [`InterfaceSet`] and
/// [`DeviceHandle`] call them from `Drop`, which is the only place they are
/// invoked.
pub trait DeviceApi {
    /// Enumeration set (`HDEVINFO`).
    type InfoSet;
    /// One interface entry of a set (`SP_DEVICE_INTERFACE_DATA`).
    type Interface;
    /// Open device handle.
    type Device;

    /// Open the set of *present* devices exposing `class`.
    fn open_interface_set(&self, class: &InterfaceClass) -> io::Result<Self::InfoSet>;

    fn destroy_interface_set(&self, set: &Self::InfoSet);

    /// Entry at `index`, or `None` once the set is exhausted.
    fn enum_interface(
        &self,
        set: &Self::InfoSet,
        class: &InterfaceClass,
        index: u32,
    ) -> io::Result<Option<Self::Interface>>;

    /// Bytes needed for the interface detail record.
    fn interface_detail_len(&self, set: &Self::InfoSet, iface: &Self::Interface)
        -> io::Result<usize>;

    /// Fill `buf` with the detail record (`cbSize` header, then a
    /// NUL-terminated UTF-16LE path). Returns the bytes that are meaningful.
    fn interface_detail(
        &self,
        set: &Self::InfoSet,
        iface: &Self::Interface,
        buf: &mut [u8],
    ) -> io::Result<usize>;

    /// Open for read/write with shared read/write, never creating anything.
    fn open_device(&self, path: &DevicePath) -> io::Result<Self::Device>;

    fn close_device(&self, device: &Self::Device);

    /// Synchronous control request. Returns the bytes written to `output`.
    fn device_control(
        &self,
        device: &Self::Device,
        code: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> io::Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_class_formats_as_registry_guid() {
        assert_eq!(
            InterfaceClass::FILTER_DEVICE.to_string(),
            "{39AD5308-66FC-11EA-BC55-0242AC130003}"
        );
    }
}
