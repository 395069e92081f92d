//! Speed profile configurations for the Kraken X52.
//!
//! Provides the built-in Silent and Performance curves and the two-point
//! curves used for one-shot fixed speeds.

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::{KrakenError, Result};
use crate::protocol::{Channel, FanLevel, MAX_LEVELS};

// =============================================================================
// Profile
// =============================================================================

/// A speed curve for one channel.
///
/// Breakpoints are sent in order and the device applies the last one whose
/// threshold the liquid temperature has reached, so order matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    channel: Channel,
    levels: Cow<'static, [FanLevel]>,
}

impl Profile {
    /// Build a profile from owned breakpoints.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an empty curve or one with more
    /// breakpoints than the destination byte can index.
    pub fn new(channel: Channel, levels: Vec<FanLevel>) -> Result<Self> {
        if levels.is_empty() || levels.len() > MAX_LEVELS {
            return Err(KrakenError::InvalidArgument {
                value: format!("{} curve with {} levels", channel, levels.len()),
            });
        }

        Ok(Self {
            channel,
            levels: Cow::Owned(levels),
        })
    }

    const fn builtin(channel: Channel, levels: &'static [FanLevel]) -> Self {
        Self {
            channel,
            levels: Cow::Borrowed(levels),
        }
    }

    /// Two-point override: `duty` from 0°C, full speed from 60°C.
    ///
    /// The curve jumps straight to 100% at 60°C; there is no ramp between.
    pub fn fixed(channel: Channel, duty: u8) -> Self {
        Self {
            channel,
            levels: Cow::Owned(vec![
                FanLevel::new(0, duty),
                FanLevel::new(FIXED_CEILING_TEMP, 100),
            ]),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn levels(&self) -> &[FanLevel] {
        &self.levels
    }
}

/// Temperature at which a fixed override hands over to full speed.
pub const FIXED_CEILING_TEMP: u8 = 60;

// =============================================================================
// Speed Profiles
// =============================================================================

/// Pre-defined speed profile. Each one covers both the fan and the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedProfile {
    /// Silent mode - low speeds, ramps up from 35°C.
    Silent,
    /// Performance mode - aggressive cooling curve.
    Performance,
}

impl SpeedProfile {
    /// The fan curve followed by the pump curve.
    pub fn curves(&self) -> [Profile; 2] {
        match self {
            SpeedProfile::Silent => [SILENT_FAN, SILENT_PUMP],
            SpeedProfile::Performance => [PERFORMANCE_FAN, PERFORMANCE_PUMP],
        }
    }

    /// Get profile name for display.
    pub fn name(&self) -> &'static str {
        match self {
            SpeedProfile::Silent => "Silent",
            SpeedProfile::Performance => "Performance",
        }
    }
}

impl std::fmt::Display for SpeedProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SpeedProfile {
    type Err = KrakenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "silent" => Ok(SpeedProfile::Silent),
            "perf" | "performance" => Ok(SpeedProfile::Performance),
            _ => Err(KrakenError::InvalidArgument { value: s.into() }),
        }
    }
}

// =============================================================================
// Pre-defined Profile Curves
// =============================================================================

/// Silent fan curve.
pub const PROFILE_SILENT: [FanLevel; 8] = [
    FanLevel::new(0, 25),
    FanLevel::new(35, 35),
    FanLevel::new(40, 45),
    FanLevel::new(45, 55),
    FanLevel::new(50, 75),
    FanLevel::new(55, 85),
    FanLevel::new(60, 100),
    FanLevel::new(100, 100),
];

/// Performance fan curve.
pub const PROFILE_PERFORMANCE: [FanLevel; 7] = [
    FanLevel::new(0, 50),
    FanLevel::new(40, 60),
    FanLevel::new(45, 70),
    FanLevel::new(50, 80),
    FanLevel::new(55, 90),
    FanLevel::new(60, 100),
    FanLevel::new(100, 100),
];

/// Pump Silent curve.
pub const PROFILE_PUMP_SILENT: [FanLevel; 7] = [
    FanLevel::new(0, 50),
    FanLevel::new(36, 60),
    FanLevel::new(40, 70),
    FanLevel::new(45, 80),
    FanLevel::new(50, 90),
    FanLevel::new(55, 100),
    FanLevel::new(100, 100),
];

/// Pump Performance curve.
pub const PROFILE_PUMP_PERFORMANCE: [FanLevel; 6] = [
    FanLevel::new(0, 70),
    FanLevel::new(40, 80),
    FanLevel::new(45, 85),
    FanLevel::new(50, 90),
    FanLevel::new(55, 100),
    FanLevel::new(100, 100),
];

const SILENT_FAN: Profile = Profile::builtin(Channel::Fan, &PROFILE_SILENT);
const SILENT_PUMP: Profile = Profile::builtin(Channel::Pump, &PROFILE_PUMP_SILENT);
const PERFORMANCE_FAN: Profile = Profile::builtin(Channel::Fan, &PROFILE_PERFORMANCE);
const PERFORMANCE_PUMP: Profile = Profile::builtin(Channel::Pump, &PROFILE_PUMP_PERFORMANCE);
