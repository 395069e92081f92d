//! HID protocol implementation for the NZXT Kraken X52.
//!
//! This module contains the report layouts, command builders and status
//! parsing. Everything here is pure translation between byte buffers and
//! typed values.

pub mod commands;
pub mod status;

pub use commands::*;
pub use status::*;
