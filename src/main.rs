//! NZXT Kraken X52 Control CLI
//!
//! Command-line interface for monitoring and controlling the NZXT Kraken X52.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nzxt_kraken_x52::config::SpeedProfile;
use nzxt_kraken_x52::device::KrakenX52;
use nzxt_kraken_x52::output::{Console, OutputFormat};
use nzxt_kraken_x52::protocol::Channel;
use nzxt_kraken_x52::KrakenError;

// =============================================================================
// CLI Arguments
// =============================================================================

/// NZXT Kraken X52 Control Tool
///
/// Without a command, prints the device status until a read fails.
#[derive(Parser, Debug)]
#[command(name = "kraken-x52")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print status reports as JSON lines
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Apply the Silent fan and pump curves
    Silent,

    /// Apply the Performance fan and pump curves
    Perf,

    /// Run the fan at 25% and the pump at 60%
    Test,

    /// Run the fan and pump at 100%
    Max,

    /// List connected Kraken X52 devices
    List,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<ExitCode> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            e.print().context("Failed to print usage")?;
            return Ok(if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            });
        }
    };

    init_tracing();

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut console = Console::new(io::stdout().lock(), format);

    match args.command {
        Some(Command::List) => cmd_list(&mut console),
        command => run(command, &mut console),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Open the device, run one command and release the device on every path.
fn run<W: Write>(command: Option<Command>, console: &mut Console<W>) -> Result<ExitCode> {
    let mut kraken = match KrakenX52::open() {
        Ok(kraken) => kraken,
        Err(e) => {
            console.error(&e).context("Failed to write to stdout")?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let outcome = match command {
        None => cmd_monitor(&mut kraken, console),
        Some(Command::Silent) => cmd_profile(&mut kraken, SpeedProfile::Silent),
        Some(Command::Perf) => cmd_profile(&mut kraken, SpeedProfile::Performance),
        Some(Command::Test) => cmd_fixed(&mut kraken, 25, 60),
        Some(Command::Max) => cmd_fixed(&mut kraken, 100, 100),
        Some(Command::List) => unreachable!("list does not open the device"),
    };

    kraken.close();

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<KrakenError>() {
            Some(e) => {
                console.error(e).context("Failed to write to stdout")?;
                Ok(ExitCode::FAILURE)
            }
            None => Err(err),
        },
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Print every status report until a read fails.
fn cmd_monitor<W: Write>(kraken: &mut KrakenX52, console: &mut Console<W>) -> Result<()> {
    loop {
        let status = kraken.read_status()?;
        console
            .status(&status)
            .context("Failed to write status")?;
    }
}

fn cmd_profile(kraken: &mut KrakenX52, profile: SpeedProfile) -> Result<()> {
    kraken.set_profile(profile)?;
    tracing::info!(%profile, "profile applied to fan and pump");
    Ok(())
}

fn cmd_fixed(kraken: &mut KrakenX52, fan_duty: u8, pump_duty: u8) -> Result<()> {
    kraken.set_fixed_level(Channel::Fan, fan_duty)?;
    kraken.set_fixed_level(Channel::Pump, pump_duty)?;
    Ok(())
}

fn cmd_list<W: Write>(console: &mut Console<W>) -> Result<ExitCode> {
    let devices = match KrakenX52::list_devices() {
        Ok(devices) => devices,
        Err(KrakenError::NotFound) => {
            console.error(&KrakenError::NotFound)?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            console.error(&e)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    for path in &devices {
        console.line(path)?;
    }
    Ok(ExitCode::SUCCESS)
}
