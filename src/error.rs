//! Error types for Kraken X52 operations.
//!
//! Every failure carries a non-zero numeric code and a static description of
//! the step that failed. The code is the OS error reported by the HID layer
//! when one is available.

use std::io;

use thiserror::Error;

/// Generic I/O failure, used when the HID layer reports no OS code.
pub const EIO: u32 = 5;

/// No such device.
pub const ENODEV: u32 = 19;

/// Invalid argument.
pub const EINVAL: u32 = 22;

/// Step of the open procedure that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStep {
    /// Listing the HID interfaces present on the system.
    Enumerate,
    /// Resolving the matched interface to a device path.
    InterfaceDetails,
    /// Opening the device path for read/write.
    OpenFile,
}

impl OpenStep {
    pub const fn message(&self) -> &'static str {
        match self {
            OpenStep::Enumerate => "Failed to get HID devices",
            OpenStep::InterfaceDetails => "Cannot get device interface details",
            OpenStep::OpenFile => "Cannot open device file",
        }
    }
}

impl std::fmt::Display for OpenStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Main error type for Kraken device operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KrakenError {
    /// No interface with the Kraken X52 vendor/product ID is present.
    #[error("Kraken not found")]
    NotFound,

    /// A matching device exists but could not be opened.
    #[error("{step}: error code {code:08X}H")]
    OpenFailure { step: OpenStep, code: u32 },

    /// Reading a status report failed or returned a short report.
    #[error("Cannot read status: error code {code:08X}H")]
    ReadFailure { code: u32 },

    /// Writing a curve breakpoint failed. Earlier breakpoints stay applied.
    #[error("Failed to write fan/pump level from profile: error code {code:08X}H")]
    WriteFailure { code: u32 },

    /// Unknown profile or out-of-range profile parameter.
    #[error("Invalid profile type '{value}': error code {einval:08X}H", einval = EINVAL)]
    InvalidArgument { value: String },
}

impl KrakenError {
    /// Numeric error code. Never 0.
    pub fn code(&self) -> u32 {
        match self {
            KrakenError::NotFound => ENODEV,
            KrakenError::OpenFailure { code, .. }
            | KrakenError::ReadFailure { code }
            | KrakenError::WriteFailure { code } => *code,
            KrakenError::InvalidArgument { .. } => EINVAL,
        }
    }

    /// Static description of the failing step.
    pub fn message(&self) -> &'static str {
        match self {
            KrakenError::NotFound => "Kraken not found",
            KrakenError::OpenFailure { step, .. } => step.message(),
            KrakenError::ReadFailure { .. } => "Cannot read status",
            KrakenError::WriteFailure { .. } => "Failed to write fan/pump level from profile",
            KrakenError::InvalidArgument { .. } => "Invalid profile type",
        }
    }

    pub(crate) fn open(step: OpenStep, err: &io::Error) -> Self {
        KrakenError::OpenFailure {
            step,
            code: os_code(err),
        }
    }

    pub(crate) fn read(err: &io::Error) -> Self {
        KrakenError::ReadFailure { code: os_code(err) }
    }

    pub(crate) fn write(err: &io::Error) -> Self {
        KrakenError::WriteFailure { code: os_code(err) }
    }
}

/// OS code carried by an I/O error, falling back to `EIO`.
pub fn os_code(err: &io::Error) -> u32 {
    match err.raw_os_error() {
        Some(code) if code != 0 => code as u32,
        _ => EIO,
    }
}

/// Result type alias for Kraken operations.
pub type Result<T> = std::result::Result<T, KrakenError>;
