//! [`DeviceApi`] over SetupAPI and kernel32.

use std::{ffi::OsStr, io, mem, os::windows::prelude::OsStrExt, ptr, slice};

use windows_sys::core::GUID;
use windows_sys::Win32::{
    Devices::DeviceAndDriverInstallation::{
        SetupDiDestroyDeviceInfoList, SetupDiEnumDeviceInterfaces, SetupDiGetClassDevsW,
        SetupDiGetDeviceInterfaceDetailW, DIGCF_DEVICEINTERFACE, DIGCF_PRESENT, HDEVINFO,
        SP_DEVICE_INTERFACE_DATA, SP_DEVICE_INTERFACE_DETAIL_DATA_W,
    },
    Foundation::{
        CloseHandle, GetLastError, ERROR_INSUFFICIENT_BUFFER, ERROR_NO_MORE_ITEMS, GENERIC_READ,
        GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
    },
    Storage::FileSystem::{
        CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING,
    },
    System::IO::DeviceIoControl,
};

use super::{DeviceApi, DevicePath, InterfaceClass};

/// Live Win32 implementation. Stateless; every resource it hands out is
/// owned by the caller's guard.
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32Api;

/// `HDEVINFO` returned by `SetupDiGetClassDevsW`.
pub struct DevInfoSet(HDEVINFO);

/// File handle returned by `CreateFileW`.
pub struct FileHandle(HANDLE);

fn guid(class: &InterfaceClass) -> GUID {
    GUID::from_u128(class.as_u128())
}

fn is_invalid(handle: isize) -> bool {
    handle == 0 || handle == INVALID_HANDLE_VALUE as isize
}

fn len_u32(len: usize) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "buffer too large"))
}

impl DeviceApi for Win32Api {
    type InfoSet = DevInfoSet;
    type Interface = SP_DEVICE_INTERFACE_DATA;
    type Device = FileHandle;

    fn open_interface_set(&self, class: &InterfaceClass) -> io::Result<DevInfoSet> {
        let class = guid(class);
        let set = unsafe {
            SetupDiGetClassDevsW(
                &class,
                ptr::null(),
                ptr::null_mut(),
                DIGCF_PRESENT | DIGCF_DEVICEINTERFACE,
            )
        };
        if is_invalid(set as isize) {
            return Err(io::Error::last_os_error());
        }
        Ok(DevInfoSet(set))
    }

    fn destroy_interface_set(&self, set: &DevInfoSet) {
        unsafe { SetupDiDestroyDeviceInfoList(set.0) };
    }

    fn enum_interface(
        &self,
        set: &DevInfoSet,
        class: &InterfaceClass,
        index: u32,
    ) -> io::Result<Option<SP_DEVICE_INTERFACE_DATA>> {
        let class = guid(class);
        let mut data: SP_DEVICE_INTERFACE_DATA = unsafe { mem::zeroed() };
        data.cbSize = mem::size_of::<SP_DEVICE_INTERFACE_DATA>() as u32;

        let ok = unsafe { SetupDiEnumDeviceInterfaces(set.0, ptr::null(), &class, index, &mut data) };
        if ok != 0 {
            return Ok(Some(data));
        }
        match unsafe { GetLastError() } {
            ERROR_NO_MORE_ITEMS => Ok(None),
            code => Err(io::Error::from_raw_os_error(code as i32)),
        }
    }

    fn interface_detail_len(
        &self,
        set: &DevInfoSet,
        iface: &SP_DEVICE_INTERFACE_DATA,
    ) -> io::Result<usize> {
        let mut required = 0u32;
        let ok = unsafe {
            SetupDiGetDeviceInterfaceDetailW(
                set.0,
                iface,
                ptr::null_mut(),
                0,
                &mut required,
                ptr::null_mut(),
            )
        };
        // A zero-sized probe is expected to fail with ERROR_INSUFFICIENT_BUFFER.
        if ok == 0 {
            let code = unsafe { GetLastError() };
            if code != ERROR_INSUFFICIENT_BUFFER {
                return Err(io::Error::from_raw_os_error(code as i32));
            }
        }
        Ok(required as usize)
    }

    fn interface_detail(
        &self,
        set: &DevInfoSet,
        iface: &SP_DEVICE_INTERFACE_DATA,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        if buf.len() < mem::size_of::<u32>() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "detail buffer below header size"));
        }
        let size = len_u32(buf.len())?;

        // The record must be u32-aligned; stage it and copy out.
        let mut staging = vec![0u32; buf.len().div_ceil(4)];
        let detail = staging.as_mut_ptr() as *mut SP_DEVICE_INTERFACE_DETAIL_DATA_W;
        unsafe { (*detail).cbSize = mem::size_of::<SP_DEVICE_INTERFACE_DETAIL_DATA_W>() as u32 };

        let ok = unsafe {
            SetupDiGetDeviceInterfaceDetailW(
                set.0,
                iface,
                detail,
                size,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }

        let filled = unsafe { slice::from_raw_parts(staging.as_ptr() as *const u8, buf.len()) };
        buf.copy_from_slice(filled);
        Ok(buf.len())
    }

    fn open_device(&self, path: &DevicePath) -> io::Result<FileHandle> {
        let wide: Vec<u16> = OsStr::new(path.as_str())
            .encode_wide()
            .chain(Some(0))
            .collect();

        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                ptr::null(),
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                ptr::null_mut(),
            )
        };
        if is_invalid(handle as isize) {
            return Err(io::Error::last_os_error());
        }
        Ok(FileHandle(handle))
    }

    fn close_device(&self, device: &FileHandle) {
        unsafe { CloseHandle(device.0) };
    }

    fn device_control(
        &self,
        device: &FileHandle,
        code: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> io::Result<usize> {
        let in_ptr = if input.is_empty() { ptr::null() } else { input.as_ptr().cast() };
        let mut returned = 0u32;

        let ok = unsafe {
            DeviceIoControl(
                device.0,
                code,
                in_ptr,
                len_u32(input.len())?,
                output.as_mut_ptr().cast(),
                len_u32(output.len())?,
                &mut returned,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(returned as usize)
    }
}
