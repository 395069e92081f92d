//! HID control report definitions and builders for the Kraken X52.
//!
//! Speed curves are uploaded one breakpoint per report. Each report carries
//! a destination byte that selects the channel, the breakpoint index and
//! whether the device should persist the value to its firmware.

use serde::Serialize;

// =============================================================================
// Constants
// =============================================================================

/// NZXT Vendor ID.
pub const NZXT_VID: u16 = 0x1E71;

/// Kraken X52 Product ID.
pub const KRAKEN_X52_PID: u16 = 0x170E;

/// Length of a control report, including the leading report marker.
pub const CONTROL_REPORT_LENGTH: usize = 65;

/// Report marker (byte 0 of every control report).
pub const CMD_REPORT_MARKER: u8 = 0x02;

/// Fan/pump level command marker (byte 1).
pub const CMD_SET_LEVEL: u8 = 0x4D;

/// Destination flag: persist the breakpoint to device firmware.
pub const DEST_PERSIST: u8 = 0x80;

/// Destination flag: the breakpoint targets the pump.
pub const DEST_PUMP: u8 = 0x40;

/// Low 6 bits of the destination byte hold the breakpoint index.
pub const DEST_INDEX_MASK: u8 = 0x3F;

/// Largest number of breakpoints a single profile can address.
pub const MAX_LEVELS: usize = DEST_INDEX_MASK as usize + 1;

const OFFSET_MARKER: usize = 0;
const OFFSET_COMMAND: usize = 1;
const OFFSET_DESTINATION: usize = 2;
const OFFSET_TEMP: usize = 3;
const OFFSET_DUTY: usize = 4;

// =============================================================================
// Speed Channels
// =============================================================================

/// Speed control channel identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Radiator fans.
    Fan,
    /// Pump.
    Pump,
}

impl Channel {
    /// Destination bits selecting this channel.
    pub const fn destination_bits(&self) -> u8 {
        match self {
            Channel::Fan => 0,
            Channel::Pump => DEST_PUMP,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Fan => write!(f, "Fan"),
            Channel::Pump => write!(f, "Pump"),
        }
    }
}

// =============================================================================
// Breakpoints
// =============================================================================

/// One point of a speed curve: at `temp` °C and above, run at `duty` percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FanLevel {
    /// Liquid temperature threshold in °C.
    pub temp: u8,
    /// Duty cycle percentage (0-100).
    pub duty: u8,
}

impl FanLevel {
    pub const fn new(temp: u8, duty: u8) -> Self {
        Self { temp, duty }
    }
}

/// Decoded form of the destination byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub channel: Channel,
    /// Breakpoint index, 0-63.
    pub index: u8,
    pub persist: bool,
}

impl Destination {
    /// Build a persisting destination for the given breakpoint.
    pub const fn persistent(channel: Channel, index: u8) -> Self {
        Self {
            channel,
            index: index & DEST_INDEX_MASK,
            persist: true,
        }
    }

    /// Pack into the wire byte.
    pub const fn to_byte(self) -> u8 {
        let persist = if self.persist { DEST_PERSIST } else { 0 };
        persist | self.channel.destination_bits() | (self.index & DEST_INDEX_MASK)
    }

    /// Unpack a wire byte.
    pub const fn from_byte(byte: u8) -> Self {
        let channel = if byte & DEST_PUMP != 0 {
            Channel::Pump
        } else {
            Channel::Fan
        };

        Self {
            channel,
            index: byte & DEST_INDEX_MASK,
            persist: byte & DEST_PERSIST != 0,
        }
    }
}

// =============================================================================
// Command Builders
// =============================================================================

/// Build the control report for a single curve breakpoint.
///
/// The device always receives the persist flag. `index` is masked to its low
/// 6 bits; callers go through [`crate::config::Profile`], which never holds
/// more than [`MAX_LEVELS`] breakpoints.
///
/// # Returns
/// A 65-byte HID report ready to send to the device.
pub fn build_level_cmd(
    channel: Channel,
    index: u8,
    level: FanLevel,
) -> [u8; CONTROL_REPORT_LENGTH] {
    let mut buf = [0u8; CONTROL_REPORT_LENGTH];

    buf[OFFSET_MARKER] = CMD_REPORT_MARKER;
    buf[OFFSET_COMMAND] = CMD_SET_LEVEL;
    buf[OFFSET_DESTINATION] = Destination::persistent(channel, index).to_byte();
    buf[OFFSET_TEMP] = level.temp;
    buf[OFFSET_DUTY] = level.duty;

    buf
}

/// Split a control report back into its destination and breakpoint.
///
/// Returns `None` if the buffer is not a fan/pump level report.
pub fn parse_level_cmd(buf: &[u8]) -> Option<(Destination, FanLevel)> {
    if buf.len() < CONTROL_REPORT_LENGTH
        || buf[OFFSET_MARKER] != CMD_REPORT_MARKER
        || buf[OFFSET_COMMAND] != CMD_SET_LEVEL
    {
        return None;
    }

    Some((
        Destination::from_byte(buf[OFFSET_DESTINATION]),
        FanLevel::new(buf[OFFSET_TEMP], buf[OFFSET_DUTY]),
    ))
}
