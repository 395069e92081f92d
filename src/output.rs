//! Console output for status lines and errors.
//!
//! The sink is created once by the binary and handed to whatever needs to
//! print; nothing in the library writes to stdout directly.

use std::io::{self, Write};

use crate::error::KrakenError;
use crate::protocol::Status;

/// How status snapshots are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `Liquid: 29.4 C, Fan: 1050 RPM, ...`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Line-oriented writer for status reports and error messages.
pub struct Console<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Print one status snapshot and flush, so a polling loop shows each read.
    pub fn status(&mut self, status: &Status) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{status}")?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, status)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    /// Print an error as `<message>: error code XXXXXXXXH`.
    pub fn error(&mut self, err: &KrakenError) -> io::Result<()> {
        writeln!(self.out, "{err}")?;
        self.out.flush()
    }

    /// Print a plain line.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
