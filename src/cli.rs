//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Programmer to use [available: {}]",
        i2cflash_bus::programmer_names_short()
    )
}

#[derive(Parser)]
#[command(name = "i2cflash")]
#[command(author, version, about = "I2C EEPROM/flash firmware writer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Job options shared by write and verify
///
/// Every option can also come from a `--config` job file; options given on
/// the command line win.
#[derive(clap::Args, Debug, Clone)]
pub struct JobArgs {
    #[arg(short, long, help = programmer_help())]
    pub programmer: String,

    /// Job file (TOML format, [job] table)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// I2C bus (0 or 1) [default: 0]
    #[arg(short, long)]
    pub bus: Option<u8>,

    /// I2C target address (7-bit, hex or decimal, e.g. 0x50)
    #[arg(short = 'a', long, value_parser = parse_hex_u32)]
    pub slave_address: Option<u32>,

    /// Internal address length in bytes (1-4) [default: 2]
    #[arg(short = 'l', long)]
    pub int_addr_length: Option<u8>,

    /// Firmware image to write
    #[arg(short, long)]
    pub firmware: Option<PathBuf>,

    /// Internal address where writing starts (hex or decimal) [default: 0]
    #[arg(short = 's', long, value_parser = parse_hex_u32, conflicts_with = "start_chunk")]
    pub start_address: Option<u32>,

    /// Start at chunk N, i.e. at address N * chunk size
    #[arg(long)]
    pub start_chunk: Option<u32>,

    /// Bytes per I2C transaction [default: 128]
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// I2C bus clock in Hz (100000 or 400000) [default: 400000]
    #[arg(long)]
    pub baudrate: Option<u32>,

    /// Wait after each write for the chip's write cycle, in µs (0 disables) [default: 5000]
    #[arg(long)]
    pub write_cycle_us: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a firmware image to an I2C memory chip
    Write {
        #[command(flatten)]
        job: JobArgs,

        /// Read the chip back and compare after writing
        #[arg(long)]
        verify: bool,
    },

    /// Compare chip contents against a firmware image
    Verify {
        #[command(flatten)]
        job: JobArgs,
    },

    /// List available programmers
    ListProgrammers,
}
