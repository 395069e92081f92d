//! NZXT Kraken X52 Library
//!
//! A Rust driver for the NZXT Kraken X52 liquid cooler.
//!
//! # Features
//!
//! - Read device status (liquid temperature, fan/pump RPM, firmware version)
//! - Upload the built-in Silent and Performance fan/pump curves
//! - Run the fan or pump at a fixed duty
//!
//! # Example
//!
//! ```no_run
//! use nzxt_kraken_x52::device::KrakenX52;
//! use nzxt_kraken_x52::protocol::Channel;
//! use nzxt_kraken_x52::config::SpeedProfile;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut kraken = KrakenX52::open()?;
//!
//!     // Blocks until the next report arrives
//!     let status = kraken.read_status()?;
//!     println!("{}", status);
//!
//!     // Apply a profile to both fan and pump
//!     kraken.set_profile(SpeedProfile::Performance)?;
//!
//!     // Or pin the pump at 80%
//!     kraken.set_fixed_level(Channel::Pump, 80)?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod output;
pub mod protocol;

// Re-exports for convenience
pub use config::{Profile, SpeedProfile};
pub use device::KrakenX52;
pub use error::{KrakenError, Result};
pub use protocol::{Channel, Status};
