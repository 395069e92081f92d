//! Device discovery and session management.

pub mod backend;
pub mod kraken;

pub use backend::{HidApiBus, HidBus, HidHandle, Property};
pub use kraken::KrakenX52;
