//! i2cflash - Write firmware images to I2C EEPROM and flash chips
//!
//! The image is streamed into the chip in fixed-size chunks, one addressed
//! I2C write per chunk, through a USB adapter (CH341A) or a Linux i2c-dev
//! bus.
//!
//! # Architecture
//!
//! - `i2cflash-core` holds the job configuration and the chunked writer,
//!   written against the `I2cMaster` trait
//! - `i2cflash-bus` opens a programmer by name and returns a `BusHandle`
//! - This binary parses the command line, builds the job and renders
//!   progress

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let result = match cli.command {
        Commands::Write { job, verify } => commands::run_write(&job, verify),
        Commands::Verify { job } => commands::run_verify(&job),
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
