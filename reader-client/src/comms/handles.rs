//! Scoped ownership of the OS resources a request acquires.
//!
//! Both wrappers follow the same shape: acquire on construction, release
//! on drop. Early returns in the locator and the channel therefore never
//! need their own cleanup.

use std::io;

use super::{DeviceApi, DevicePath, InterfaceClass};

/// Enumeration set of present interface instances; destroyed on drop.
pub struct InterfaceSet<'a, A: DeviceApi> {
    api: &'a A,
    raw: A::InfoSet,
}

impl<'a, A: DeviceApi> InterfaceSet<'a, A> {
    pub fn open(api: &'a A, class: &InterfaceClass) -> io::Result<Self> {
        let raw = api.open_interface_set(class)?;
        Ok(Self { api, raw })
    }

    pub fn interface(&self, class: &InterfaceClass, index: u32) -> io::Result<Option<A::Interface>> {
        self.api.enum_interface(&self.raw, class, index)
    }

    pub fn detail_len(&self, iface: &A::Interface) -> io::Result<usize> {
        self.api.interface_detail_len(&self.raw, iface)
    }

    pub fn detail(&self, iface: &A::Interface, buf: &mut [u8]) -> io::Result<usize> {
        self.api.interface_detail(&self.raw, iface, buf)
    }
}

impl<A: DeviceApi> Drop for InterfaceSet<'_, A> {
    fn drop(&mut self) {
        self.api.destroy_interface_set(&self.raw);
    }
}

/// Open handle to one device interface; closed on drop.
pub struct DeviceHandle<'a, A: DeviceApi> {
    api: &'a A,
    raw: A::Device,
}

impl<'a, A: DeviceApi> DeviceHandle<'a, A> {
    pub fn open(api: &'a A, path: &DevicePath) -> io::Result<Self> {
        let raw = api.open_device(path)?;
        Ok(Self { api, raw })
    }

    pub fn control(&self, code: u32, input: &[u8], output: &mut [u8]) -> io::Result<usize> {
        self.api.device_control(&self.raw, code, input, output)
    }
}

impl<A: DeviceApi> Drop for DeviceHandle<'_, A> {
    fn drop(&mut self) {
        self.api.close_device(&self.raw);
    }
}
