//! HID enumeration and transport seam.
//!
//! The session only needs to list interfaces, look up a numeric property,
//! resolve a path and open it. [`HidApiBus`] provides that on top of
//! `hidapi`; tests substitute an in-memory bus.

use std::ffi::{CStr, CString};
use std::io;

use hidapi::{DeviceInfo, HidApi, HidDevice, HidError};

/// Numeric interface property the session filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    VendorId,
    ProductId,
}

/// Enumerates HID interfaces and opens them.
pub trait HidBus {
    type Interface;
    type Handle: HidHandle;

    /// All HID interfaces currently present.
    fn interfaces(&self) -> io::Result<Vec<Self::Interface>>;

    /// Look up a numeric property; `None` if the interface does not expose it.
    fn property(&self, interface: &Self::Interface, key: Property) -> Option<u16>;

    /// Resolve an interface to an openable device path.
    fn path(&self, interface: &Self::Interface) -> io::Result<CString>;

    /// Open a device path for read/write, shared with other readers and writers.
    fn open(&self, path: &CStr) -> io::Result<Self::Handle>;
}

/// Blocking report I/O on an open device.
pub trait HidHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

// =============================================================================
// hidapi backend
// =============================================================================

/// [`HidBus`] backed by the system HID library.
pub struct HidApiBus {
    api: HidApi,
}

impl HidApiBus {
    /// Initialize the HID library and take a snapshot of present devices.
    pub fn new() -> io::Result<Self> {
        let api = HidApi::new().map_err(into_io_error)?;
        Ok(Self { api })
    }
}

impl HidBus for HidApiBus {
    type Interface = DeviceInfo;
    type Handle = HidDevice;

    fn interfaces(&self) -> io::Result<Vec<DeviceInfo>> {
        Ok(self.api.device_list().cloned().collect())
    }

    fn property(&self, interface: &DeviceInfo, key: Property) -> Option<u16> {
        match key {
            Property::VendorId => Some(interface.vendor_id()),
            Property::ProductId => Some(interface.product_id()),
        }
    }

    fn path(&self, interface: &DeviceInfo) -> io::Result<CString> {
        Ok(interface.path().to_owned())
    }

    fn open(&self, path: &CStr) -> io::Result<HidDevice> {
        self.api.open_path(path).map_err(into_io_error)
    }
}

impl HidHandle for HidDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        HidDevice::read(self, buf).map_err(into_io_error)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        HidDevice::write(self, buf).map_err(into_io_error)
    }
}

/// Keep the OS error when hidapi has one, otherwise wrap the message.
fn into_io_error(err: HidError) -> io::Error {
    match err {
        HidError::IoError { error } => error,
        other => io::Error::other(other.to_string()),
    }
}
