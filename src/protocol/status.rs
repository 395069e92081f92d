//! Device status parsing for the Kraken X52.
//!
//! The device pushes a 64-byte status report roughly once a second.
//! Depending on the HID transport the read may also carry a leading
//! report ID, making it 65 bytes long.

use byteorder::{BigEndian, ByteOrder};
use serde::Serialize;

use crate::error::{EIO, KrakenError, Result};

// =============================================================================
// Report Layout
// =============================================================================

/// Length of a status report without any transport framing.
pub const STATUS_REPORT_LENGTH: usize = 64;

/// Read buffer length: status report plus an optional report ID.
pub const STATUS_READ_LENGTH: usize = STATUS_REPORT_LENGTH + 1;

/// Offset for liquid temperature whole degrees.
const OFFSET_TEMP_INT: usize = 1;
/// Offset for liquid temperature tenths.
const OFFSET_TEMP_DEC: usize = 2;
/// Fan RPM, big-endian (high byte first).
const OFFSET_FAN_RPM: usize = 3;
/// Pump RPM, big-endian (high byte first).
const OFFSET_PUMP_RPM: usize = 5;
/// Firmware major version.
const OFFSET_FW_MAJOR: usize = 11;
/// Firmware minor version.
const OFFSET_FW_MINOR: usize = 13;
/// Firmware incremental version.
const OFFSET_FW_INCREMENTAL: usize = 14;

// =============================================================================
// Status Structures
// =============================================================================

/// Liquid temperature as reported by the device.
///
/// `tenths` is passed through as sent; the firmware is expected to keep it
/// below 10 but nothing here relies on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Temperature {
    pub degrees: u8,
    pub tenths: u8,
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.degrees, self.tenths)
    }
}

/// Firmware version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub incremental: u8,
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.incremental)
    }
}

/// One snapshot of device telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Status {
    /// Liquid coolant temperature.
    pub liquid_temp: Temperature,
    /// Fan speed in RPM.
    pub fan_rpm: u16,
    /// Pump speed in RPM.
    pub pump_rpm: u16,
    /// Firmware version.
    pub firmware: FirmwareVersion,
}

impl Status {
    /// Parse a status report.
    ///
    /// # Arguments
    /// * `buf` - Bytes returned by a single read: either the bare 64-byte
    ///   report or a report ID followed by it
    ///
    /// # Errors
    /// Returns `ReadFailure` if fewer than 64 bytes are available.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let report = strip_report_id(buf).ok_or(KrakenError::ReadFailure { code: EIO })?;

        Ok(Status {
            liquid_temp: Temperature {
                degrees: report[OFFSET_TEMP_INT],
                tenths: report[OFFSET_TEMP_DEC],
            },
            fan_rpm: decode_rpm(&report[OFFSET_FAN_RPM..OFFSET_FAN_RPM + 2]),
            pump_rpm: decode_rpm(&report[OFFSET_PUMP_RPM..OFFSET_PUMP_RPM + 2]),
            firmware: FirmwareVersion {
                major: report[OFFSET_FW_MAJOR],
                minor: report[OFFSET_FW_MINOR],
                incremental: report[OFFSET_FW_INCREMENTAL],
            },
        })
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Liquid: {} C, Fan: {} RPM, Pump: {} RPM, Firmware: {}",
            self.liquid_temp, self.fan_rpm, self.pump_rpm, self.firmware
        )
    }
}

/// Decode a big-endian RPM pair (high byte first).
pub fn decode_rpm(bytes: &[u8]) -> u16 {
    BigEndian::read_u16(bytes)
}

/// Return the 64-byte report body, dropping a leading report ID if present.
fn strip_report_id(buf: &[u8]) -> Option<&[u8]> {
    match buf.len() {
        n if n >= STATUS_READ_LENGTH => Some(&buf[1..STATUS_READ_LENGTH]),
        STATUS_REPORT_LENGTH => Some(buf),
        _ => None,
    }
}
