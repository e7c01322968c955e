//! Write and verify command implementations

use i2cflash_bus::open_bus;
use i2cflash_core::error::{ConfigError, WriteError};
use i2cflash_core::job::{WriteJob, WriteJobBuilder};
use i2cflash_core::writer::{run_job, verify_job};

use super::progress::IndicatifProgress;
use crate::cli::JobArgs;

/// Build the job from a job file (if any) overlaid with command-line options
pub fn build_job(args: &JobArgs, verify: Option<bool>) -> Result<WriteJob, ConfigError> {
    let base = match &args.config {
        Some(path) => WriteJobBuilder::from_toml_file(path)?,
        None => WriteJobBuilder::new(),
    };

    let mut cli = WriteJobBuilder::new();
    if let Some(bus) = args.bus {
        cli = cli.bus_id(bus);
    }
    if let Some(addr) = args.slave_address {
        cli = cli.target_address(addr);
    }
    if let Some(width) = args.int_addr_length {
        cli = cli.address_width(width);
    }
    if let Some(firmware) = &args.firmware {
        cli = cli.firmware(firmware);
    }
    if let Some(addr) = args.start_address {
        cli = cli.start_address(addr);
    }
    if let Some(index) = args.start_chunk {
        cli = cli.start_chunk(index);
    }
    if let Some(size) = args.chunk_size {
        cli = cli.chunk_size(size);
    }
    if let Some(hz) = args.baudrate {
        cli = cli.baudrate(hz);
    }
    if let Some(us) = args.write_cycle_us {
        cli = cli.write_cycle_us(us);
    }
    if let Some(verify) = verify {
        cli = cli.verify(verify);
    }

    base.merge(cli).build()
}

/// Run the write command
pub fn run_write(args: &JobArgs, verify: bool) -> Result<(), WriteError> {
    // A bare `--verify` flag can only turn verification on
    let job = build_job(args, verify.then_some(true))?;
    let mut bus = open_bus(&args.programmer, job.bus_id)?;

    let mut progress = IndicatifProgress::new();
    run_job(&mut bus, &job, &mut progress)?;
    Ok(())
}

/// Run the verify command
pub fn run_verify(args: &JobArgs) -> Result<(), WriteError> {
    let job = build_job(args, None)?;
    let mut bus = open_bus(&args.programmer, job.bus_id)?;

    let mut progress = IndicatifProgress::new();
    let verified = verify_job(&mut bus, &job, &mut progress)?;
    drop(progress);

    println!(
        "Verified {} bytes at 0x{:X}: contents match",
        verified, job.start_address
    );
    Ok(())
}
