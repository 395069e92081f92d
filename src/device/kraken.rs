//! NZXT Kraken X52 device implementation.
//!
//! High-level interface for reading telemetry from and uploading speed
//! curves to a Kraken X52.

use std::ffi::CString;

use hidapi::HidDevice;
use tracing::{debug, info, trace, warn};

use super::backend::{HidApiBus, HidBus, HidHandle, Property};
use crate::config::{Profile, SpeedProfile};
use crate::error::{EIO, KrakenError, OpenStep, Result};
use crate::protocol::{
    CONTROL_REPORT_LENGTH, Channel, KRAKEN_X52_PID, NZXT_VID, STATUS_READ_LENGTH,
    STATUS_REPORT_LENGTH, Status, build_level_cmd,
};

// =============================================================================
// KrakenX52
// =============================================================================

/// NZXT Kraken X52 device handle.
///
/// Owns the open HID handle; it is released when the session is closed or
/// dropped, whichever comes first.
///
/// # Example
///
/// ```no_run
/// use nzxt_kraken_x52::config::SpeedProfile;
/// use nzxt_kraken_x52::device::KrakenX52;
///
/// let mut kraken = KrakenX52::open()?;
/// println!("{}", kraken.read_status()?);
///
/// kraken.set_profile(SpeedProfile::Silent)?;
/// kraken.close();
/// # Ok::<(), nzxt_kraken_x52::error::KrakenError>(())
/// ```
pub struct KrakenX52<H: HidHandle = HidDevice> {
    device: H,
}

impl KrakenX52 {
    /// Open the first Kraken X52 found on the system.
    ///
    /// # Errors
    /// Returns `NotFound` if no Kraken X52 is connected, or `OpenFailure`
    /// if one is present but cannot be opened.
    pub fn open() -> Result<Self> {
        let bus = HidApiBus::new().map_err(|e| KrakenError::open(OpenStep::Enumerate, &e))?;
        Self::open_with(&bus)
    }

    /// List the device paths of all connected Kraken X52 interfaces.
    pub fn list_devices() -> Result<Vec<String>> {
        let bus = HidApiBus::new().map_err(|e| KrakenError::open(OpenStep::Enumerate, &e))?;
        let paths = find_matching(&bus)?;

        Ok(paths
            .into_iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect())
    }
}

impl<H: HidHandle> KrakenX52<H> {
    /// Open the first Kraken X52 exposed by `bus`.
    pub fn open_with<B>(bus: &B) -> Result<Self>
    where
        B: HidBus<Handle = H>,
    {
        let interfaces = bus
            .interfaces()
            .map_err(|e| KrakenError::open(OpenStep::Enumerate, &e))?;

        let Some(interface) = interfaces.iter().find(|i| is_kraken(bus, i)) else {
            debug!(count = interfaces.len(), "no Kraken X52 among HID interfaces");
            return Err(KrakenError::NotFound);
        };

        let path = bus
            .path(interface)
            .map_err(|e| KrakenError::open(OpenStep::InterfaceDetails, &e))?;
        let device = bus
            .open(&path)
            .map_err(|e| KrakenError::open(OpenStep::OpenFile, &e))?;

        info!(path = %path.to_string_lossy(), "opened Kraken X52");
        Ok(Self { device })
    }

    /// Wrap an already open handle.
    pub fn from_handle(device: H) -> Self {
        Self { device }
    }

    /// Block until the device sends its next status report.
    ///
    /// # Errors
    /// Returns `ReadFailure` on an I/O error or a report shorter than 64 bytes.
    pub fn read_status(&mut self) -> Result<Status> {
        let mut buf = [0u8; STATUS_READ_LENGTH];
        let read = self.device.read(&mut buf).map_err(|e| KrakenError::read(&e))?;

        if read < STATUS_REPORT_LENGTH {
            warn!(read, "short status report");
            return Err(KrakenError::ReadFailure { code: EIO });
        }

        Status::parse(&buf[..read])
    }

    /// Upload a speed curve, one breakpoint per report.
    ///
    /// Stops at the first failed write. Breakpoints already written stay
    /// applied on the device; nothing is read back.
    pub fn send_profile(&mut self, profile: &Profile) -> Result<()> {
        let channel = profile.channel();

        for (index, level) in profile.levels().iter().enumerate() {
            let cmd = build_level_cmd(channel, index as u8, *level);
            trace!(%channel, index, temp = level.temp, duty = level.duty, "writing level");
            self.write(&cmd)?;
        }

        info!(%channel, levels = profile.levels().len(), "profile applied");
        Ok(())
    }

    /// Apply a pre-defined profile: the fan curve, then the pump curve.
    ///
    /// If the fan upload fails the pump curve is not attempted.
    pub fn set_profile(&mut self, profile: SpeedProfile) -> Result<()> {
        for curve in profile.curves() {
            self.send_profile(&curve)?;
        }
        Ok(())
    }

    /// Run a channel at a fixed duty, reaching 100% from 60°C.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if duty is above 100.
    pub fn set_fixed_level(&mut self, channel: Channel, duty: u8) -> Result<()> {
        if duty > 100 {
            return Err(KrakenError::InvalidArgument {
                value: format!("{channel} duty {duty}%"),
            });
        }

        self.send_profile(&Profile::fixed(channel, duty))
    }

    /// Release the device handle.
    pub fn close(self) {
        debug!("closing Kraken X52");
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn write(&mut self, data: &[u8; CONTROL_REPORT_LENGTH]) -> Result<()> {
        let written = self.device.write(data).map_err(|e| KrakenError::write(&e))?;

        if written < CONTROL_REPORT_LENGTH {
            warn!(written, "short control report write");
            return Err(KrakenError::WriteFailure { code: EIO });
        }
        Ok(())
    }
}

impl<H: HidHandle> std::fmt::Debug for KrakenX52<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KrakenX52").finish_non_exhaustive()
    }
}

fn is_kraken<B: HidBus>(bus: &B, interface: &B::Interface) -> bool {
    bus.property(interface, Property::VendorId) == Some(NZXT_VID)
        && bus.property(interface, Property::ProductId) == Some(KRAKEN_X52_PID)
}

/// Paths of every matching interface, or `NotFound` if there are none.
fn find_matching<B: HidBus>(bus: &B) -> Result<Vec<CString>> {
    let interfaces = bus
        .interfaces()
        .map_err(|e| KrakenError::open(OpenStep::Enumerate, &e))?;

    let mut paths = Vec::new();
    for interface in interfaces.iter().filter(|i| is_kraken(bus, i)) {
        let path = bus
            .path(interface)
            .map_err(|e| KrakenError::open(OpenStep::InterfaceDetails, &e))?;
        paths.push(path);
    }

    if paths.is_empty() {
        return Err(KrakenError::NotFound);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::ffi::CStr;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use crate::protocol::{FanLevel, parse_level_cmd};

    #[derive(Clone)]
    struct FakeInterface {
        vendor: Option<u16>,
        product: Option<u16>,
        path: &'static str,
    }

    impl FakeInterface {
        fn kraken(path: &'static str) -> Self {
            Self {
                vendor: Some(NZXT_VID),
                product: Some(KRAKEN_X52_PID),
                path,
            }
        }
    }

    #[derive(Default)]
    struct Wire {
        writes: Vec<Vec<u8>>,
        attempts: usize,
        opened: Vec<String>,
    }

    struct FakeHandle {
        wire: Rc<RefCell<Wire>>,
        reads: VecDeque<io::Result<Vec<u8>>>,
        fail_write_at: Option<usize>,
    }

    impl HidHandle for FakeHandle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let report = self
                .reads
                .pop_front()
                .unwrap_or_else(|| Err(io::Error::from_raw_os_error(5)))?;
            buf[..report.len()].copy_from_slice(&report);
            Ok(report.len())
        }

        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut wire = self.wire.borrow_mut();
            let attempt = wire.attempts;
            wire.attempts += 1;

            if self.fail_write_at == Some(attempt) {
                return Err(io::Error::from_raw_os_error(32));
            }
            wire.writes.push(buf.to_vec());
            Ok(buf.len())
        }
    }

    struct FakeBus {
        interfaces: io::Result<Vec<FakeInterface>>,
        path_error: Option<i32>,
        open_error: Option<i32>,
        wire: Rc<RefCell<Wire>>,
        reads: RefCell<VecDeque<io::Result<Vec<u8>>>>,
        fail_write_at: Option<usize>,
    }

    impl FakeBus {
        fn new(interfaces: Vec<FakeInterface>) -> Self {
            Self {
                interfaces: Ok(interfaces),
                path_error: None,
                open_error: None,
                wire: Rc::default(),
                reads: RefCell::default(),
                fail_write_at: None,
            }
        }

        fn with_kraken() -> Self {
            Self::new(vec![FakeInterface::kraken("/dev/hidraw3")])
        }

        fn session(&self) -> KrakenX52<FakeHandle> {
            KrakenX52::open_with(self).unwrap()
        }

        fn written(&self) -> Vec<(crate::protocol::Destination, FanLevel)> {
            self.wire
                .borrow()
                .writes
                .iter()
                .map(|w| parse_level_cmd(w).unwrap())
                .collect()
        }
    }

    impl HidBus for FakeBus {
        type Interface = FakeInterface;
        type Handle = FakeHandle;

        fn interfaces(&self) -> io::Result<Vec<FakeInterface>> {
            match &self.interfaces {
                Ok(list) => Ok(list.clone()),
                Err(e) => Err(io::Error::from_raw_os_error(e.raw_os_error().unwrap_or(5))),
            }
        }

        fn property(&self, interface: &FakeInterface, key: Property) -> Option<u16> {
            match key {
                Property::VendorId => interface.vendor,
                Property::ProductId => interface.product,
            }
        }

        fn path(&self, interface: &FakeInterface) -> io::Result<CString> {
            if let Some(code) = self.path_error {
                return Err(io::Error::from_raw_os_error(code));
            }
            Ok(CString::new(interface.path).unwrap())
        }

        fn open(&self, path: &CStr) -> io::Result<FakeHandle> {
            if let Some(code) = self.open_error {
                return Err(io::Error::from_raw_os_error(code));
            }
            self.wire
                .borrow_mut()
                .opened
                .push(path.to_string_lossy().into_owned());

            Ok(FakeHandle {
                wire: Rc::clone(&self.wire),
                reads: self.reads.take(),
                fail_write_at: self.fail_write_at,
            })
        }
    }

    fn status_report() -> Vec<u8> {
        let mut buf = vec![0u8; 64];
        buf[0] = 0x04;
        buf[1] = 29;
        buf[2] = 4;
        buf[3..5].copy_from_slice(&[0x04, 0x1A]);
        buf[5..7].copy_from_slice(&[0x03, 0xE8]);
        buf[11] = 6;
        buf[13] = 0;
        buf[14] = 2;
        buf
    }

    #[test]
    fn test_open_skips_other_devices() {
        let bus = FakeBus::new(vec![
            FakeInterface {
                vendor: None,
                product: None,
                path: "/dev/hidraw0",
            },
            FakeInterface {
                vendor: Some(0x046D),
                product: Some(KRAKEN_X52_PID),
                path: "/dev/hidraw1",
            },
            FakeInterface {
                vendor: Some(NZXT_VID),
                product: Some(0x2007),
                path: "/dev/hidraw2",
            },
            FakeInterface {
                vendor: Some(NZXT_VID),
                product: None,
                path: "/dev/hidraw4",
            },
            FakeInterface::kraken("/dev/hidraw5"),
            FakeInterface::kraken("/dev/hidraw6"),
        ]);

        bus.session();
        assert_eq!(bus.wire.borrow().opened, vec!["/dev/hidraw5".to_string()]);
    }

    #[test]
    fn test_not_found() {
        let bus = FakeBus::new(vec![FakeInterface {
            vendor: Some(NZXT_VID),
            product: Some(0x2007),
            path: "/dev/hidraw0",
        }]);
        let err = KrakenX52::open_with(&bus).unwrap_err();
        assert_eq!(err, KrakenError::NotFound);
        assert!(bus.wire.borrow().opened.is_empty());
    }

    #[test]
    fn test_open_failures_are_not_not_found() {
        let mut bus = FakeBus::with_kraken();
        bus.open_error = Some(13);
        let err = KrakenX52::open_with(&bus).unwrap_err();
        assert_eq!(
            err,
            KrakenError::OpenFailure {
                step: OpenStep::OpenFile,
                code: 13
            }
        );

        let mut bus = FakeBus::with_kraken();
        bus.path_error = Some(2);
        let err = KrakenX52::open_with(&bus).unwrap_err();
        assert!(matches!(
            err,
            KrakenError::OpenFailure {
                step: OpenStep::InterfaceDetails,
                ..
            }
        ));

        let mut bus = FakeBus::with_kraken();
        bus.interfaces = Err(io::Error::from_raw_os_error(12));
        let err = KrakenX52::open_with(&bus).unwrap_err();
        assert_eq!(err.message(), "Failed to get HID devices");
        assert_eq!(err.code(), 12);
    }

    #[test]
    fn test_read_status() {
        let bus = FakeBus::with_kraken();
        bus.reads.borrow_mut().push_back(Ok(status_report()));

        let mut framed = vec![0x00];
        framed.extend(status_report());
        bus.reads.borrow_mut().push_back(Ok(framed));

        let mut kraken = bus.session();
        let first = kraken.read_status().unwrap();
        assert_eq!(first.fan_rpm, 1050);
        assert_eq!(first.pump_rpm, 1000);
        assert_eq!(first.liquid_temp.to_string(), "29.4");
        assert_eq!(kraken.read_status().unwrap(), first);
    }

    #[test]
    fn test_read_failures() {
        let bus = FakeBus::with_kraken();
        bus.reads.borrow_mut().push_back(Ok(vec![0x04; 12]));
        bus.reads
            .borrow_mut()
            .push_back(Err(io::Error::from_raw_os_error(19)));

        let mut kraken = bus.session();
        assert_eq!(
            kraken.read_status().unwrap_err(),
            KrakenError::ReadFailure { code: EIO }
        );
        let err = kraken.read_status().unwrap_err();
        assert_eq!(err, KrakenError::ReadFailure { code: 19 });
        assert_eq!(err.message(), "Cannot read status");
    }

    #[test]
    fn test_send_profile_in_order() {
        let bus = FakeBus::with_kraken();
        let mut kraken = bus.session();

        let [fan, _] = SpeedProfile::Silent.curves();
        kraken.send_profile(&fan).unwrap();

        let written = bus.written();
        assert_eq!(written.len(), 8);
        for (i, (dest, level)) in written.iter().enumerate() {
            assert_eq!(dest.channel, Channel::Fan);
            assert_eq!(dest.index as usize, i);
            assert!(dest.persist);
            assert_eq!(*level, fan.levels()[i]);
        }
        assert!(bus.wire.borrow().writes.iter().all(|w| w.len() == 65));
    }

    #[test]
    fn test_send_profile_stops_on_write_failure() {
        let mut bus = FakeBus::with_kraken();
        bus.fail_write_at = Some(3);
        let mut kraken = bus.session();

        let [_, pump] = SpeedProfile::Silent.curves();
        let err = kraken.send_profile(&pump).unwrap_err();

        assert_eq!(err, KrakenError::WriteFailure { code: 32 });
        assert_eq!(bus.wire.borrow().attempts, 4);
        let indices: Vec<u8> = bus.written().iter().map(|(d, _)| d.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_set_profile_sends_fan_then_pump() {
        let bus = FakeBus::with_kraken();
        let mut kraken = bus.session();
        kraken.set_profile(SpeedProfile::Performance).unwrap();

        let channels: Vec<Channel> = bus.written().iter().map(|(d, _)| d.channel).collect();
        assert_eq!(channels.len(), 13);
        assert!(channels[..7].iter().all(|&c| c == Channel::Fan));
        assert!(channels[7..].iter().all(|&c| c == Channel::Pump));
    }

    #[test]
    fn test_set_profile_fails_fast() {
        let mut bus = FakeBus::with_kraken();
        bus.fail_write_at = Some(2);
        let mut kraken = bus.session();

        assert!(kraken.set_profile(SpeedProfile::Silent).is_err());
        let written = bus.written();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|(d, _)| d.channel == Channel::Fan));
    }

    #[test]
    fn test_set_fixed_level() {
        let bus = FakeBus::with_kraken();
        let mut kraken = bus.session();
        kraken.set_fixed_level(Channel::Fan, 25).unwrap();
        kraken.set_fixed_level(Channel::Pump, 60).unwrap();

        let written = bus.written();
        assert_eq!(written.len(), 4);
        assert_eq!(written[1].1, FanLevel::new(60, 100));
        assert_eq!(written[2].0.channel, Channel::Pump);
        assert_eq!(written[2].0.index, 0);
        assert_eq!(written[2].1, FanLevel::new(0, 60));

        assert!(matches!(
            kraken.set_fixed_level(Channel::Pump, 101),
            Err(KrakenError::InvalidArgument { .. })
        ));
        assert_eq!(bus.written().len(), 4);
    }

    #[test]
    fn test_find_matching_lists_every_kraken() {
        let bus = FakeBus::new(vec![
            FakeInterface::kraken("/dev/hidraw1"),
            FakeInterface {
                vendor: Some(0x046D),
                product: Some(0xC52B),
                path: "/dev/hidraw2",
            },
            FakeInterface::kraken("/dev/hidraw7"),
        ]);

        let paths = find_matching(&bus).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1].to_str().unwrap(), "/dev/hidraw7");

        let empty = FakeBus::new(vec![]);
        assert_eq!(find_matching(&empty).unwrap_err(), KrakenError::NotFound);
    }
}
