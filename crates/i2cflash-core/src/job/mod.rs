//! Write job configuration
//!
//! A [`WriteJob`] is the validated, immutable description of one run of the
//! writer. It is built once through [`WriteJobBuilder`], which collects
//! options from the command line and/or a TOML job file, fills in defaults
//! and validates ranges before anything touches the bus.

mod job_file;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::i2c::{AddressWidth, TargetAddress, FAST_MODE};

/// Default I2C bus
pub const DEFAULT_BUS: u8 = 0;
/// Default internal address length in bytes
pub const DEFAULT_ADDRESS_WIDTH: u8 = 2;
/// Default bytes per transaction
pub const DEFAULT_CHUNK_SIZE: usize = 128;
/// Default bus clock in Hz
pub const DEFAULT_BAUDRATE: u32 = FAST_MODE;
/// Default wait after each write for the chip's internal write cycle
pub const DEFAULT_WRITE_CYCLE_US: u32 = 5_000;

/// Highest bus id accepted
const MAX_BUS: u8 = 1;

/// Validated description of a firmware write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteJob {
    /// Physical I2C bus (0 or 1)
    pub bus_id: u8,
    /// Target chip bus address
    pub target: TargetAddress,
    /// Internal address encoding width
    pub address_width: AddressWidth,
    /// Firmware image to write
    pub firmware: PathBuf,
    /// Internal address of the first byte written
    pub start_address: u32,
    /// Bytes per transaction
    pub chunk_size: usize,
    /// Bus clock in Hz
    pub baudrate: u32,
    /// Read back and compare after writing
    pub verify: bool,
    /// Delay after each transaction, in microseconds
    pub write_cycle_us: u32,
}

impl WriteJob {
    /// Check that an image of `len` bytes fits the internal address space
    pub fn check_image_size(&self, len: u64) -> Result<(), ConfigError> {
        let end = self.start_address as u64 + len;
        let limit = self.address_width.max_address_space();
        if end > limit {
            return Err(ConfigError::ImageExceedsAddressSpace {
                end,
                width: self.address_width.bytes(),
                limit,
            });
        }
        Ok(())
    }

    /// Number of transactions needed for an image of `len` bytes
    pub fn total_chunks(&self, len: u64) -> usize {
        len.div_ceil(self.chunk_size as u64) as usize
    }
}

/// Builder collecting job options before validation
///
/// Every field is optional; `build()` applies defaults. Two builders can be
/// layered with [`merge`](Self::merge) so command-line options override a
/// job file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteJobBuilder {
    bus_id: Option<u8>,
    target_address: Option<u32>,
    address_width: Option<u8>,
    firmware: Option<PathBuf>,
    start_address: Option<u32>,
    start_chunk: Option<u32>,
    chunk_size: Option<usize>,
    baudrate: Option<u32>,
    verify: Option<bool>,
    write_cycle_us: Option<u32>,
}

impl WriteJobBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the I2C bus
    pub fn bus_id(mut self, bus_id: u8) -> Self {
        self.bus_id = Some(bus_id);
        self
    }

    /// Set the 7-bit target address
    pub fn target_address(mut self, addr: u32) -> Self {
        self.target_address = Some(addr);
        self
    }

    /// Set the internal address length in bytes
    pub fn address_width(mut self, bytes: u8) -> Self {
        self.address_width = Some(bytes);
        self
    }

    /// Set the firmware path
    pub fn firmware(mut self, path: impl Into<PathBuf>) -> Self {
        self.firmware = Some(path.into());
        self
    }

    /// Set the internal address where writing starts
    pub fn start_address(mut self, addr: u32) -> Self {
        self.start_address = Some(addr);
        self
    }

    /// Set the start as a chunk index (legacy option)
    ///
    /// Converted to `index * chunk_size` when the job is built.
    pub fn start_chunk(mut self, index: u32) -> Self {
        self.start_chunk = Some(index);
        self
    }

    /// Set the bytes per transaction
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    /// Set the bus clock in Hz
    pub fn baudrate(mut self, hz: u32) -> Self {
        self.baudrate = Some(hz);
        self
    }

    /// Enable or disable read-back verification
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    /// Set the post-write delay in microseconds
    pub fn write_cycle_us(mut self, us: u32) -> Self {
        self.write_cycle_us = Some(us);
        self
    }

    /// Firmware path, if set
    pub fn firmware_path(&self) -> Option<&Path> {
        self.firmware.as_deref()
    }

    /// Layer `overrides` on top of `self`
    ///
    /// Fields set in `overrides` win. The start position is taken as a
    /// unit: if `overrides` sets either a start address or a start chunk,
    /// both come from `overrides`.
    pub fn merge(self, overrides: WriteJobBuilder) -> Self {
        let (start_address, start_chunk) =
            if overrides.start_address.is_some() || overrides.start_chunk.is_some() {
                (overrides.start_address, overrides.start_chunk)
            } else {
                (self.start_address, self.start_chunk)
            };

        Self {
            bus_id: overrides.bus_id.or(self.bus_id),
            target_address: overrides.target_address.or(self.target_address),
            address_width: overrides.address_width.or(self.address_width),
            firmware: overrides.firmware.or(self.firmware),
            start_address,
            start_chunk,
            chunk_size: overrides.chunk_size.or(self.chunk_size),
            baudrate: overrides.baudrate.or(self.baudrate),
            verify: overrides.verify.or(self.verify),
            write_cycle_us: overrides.write_cycle_us.or(self.write_cycle_us),
        }
    }

    /// Apply defaults and validate
    pub fn build(self) -> Result<WriteJob, ConfigError> {
        let bus_id = self.bus_id.unwrap_or(DEFAULT_BUS);
        if bus_id > MAX_BUS {
            return Err(ConfigError::InvalidBus(bus_id));
        }

        let target = TargetAddress::new(
            self.target_address
                .ok_or(ConfigError::Missing("slave_address"))?,
        )?;
        let address_width =
            AddressWidth::from_bytes(self.address_width.unwrap_or(DEFAULT_ADDRESS_WIDTH))?;
        let firmware = self.firmware.ok_or(ConfigError::Missing("firmware"))?;

        let chunk_size = self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }

        let start_address = match (self.start_address, self.start_chunk) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingStart),
            (Some(addr), None) => addr,
            (None, Some(index)) => {
                let addr = (index as u64) * (chunk_size as u64);
                let addr = u32::try_from(addr).map_err(|_| {
                    ConfigError::InvalidParameter(format!(
                        "start chunk {} x {} bytes overflows the address range",
                        index, chunk_size
                    ))
                })?;
                log::debug!(
                    "Start chunk {} ({} bytes/chunk) -> start address 0x{:X}",
                    index,
                    chunk_size,
                    addr
                );
                addr
            }
            (None, None) => 0,
        };

        let baudrate = self.baudrate.unwrap_or(DEFAULT_BAUDRATE);
        if baudrate == 0 {
            return Err(ConfigError::UnsupportedBaudrate(0));
        }

        if start_address as usize % chunk_size != 0 {
            log::warn!(
                "Start address 0x{:X} is not aligned to the {}-byte chunk size",
                start_address,
                chunk_size
            );
        }

        Ok(WriteJob {
            bus_id,
            target,
            address_width,
            firmware,
            start_address,
            chunk_size,
            baudrate,
            verify: self.verify.unwrap_or(false),
            write_cycle_us: self.write_cycle_us.unwrap_or(DEFAULT_WRITE_CYCLE_US),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> WriteJobBuilder {
        WriteJobBuilder::new()
            .target_address(0x50)
            .firmware("fw.bin")
    }

    #[test]
    fn test_defaults() {
        let job = minimal().build().unwrap();
        assert_eq!(job.bus_id, 0);
        assert_eq!(job.target.get(), 0x50);
        assert_eq!(job.address_width, AddressWidth::TwoByte);
        assert_eq!(job.start_address, 0);
        assert_eq!(job.chunk_size, 128);
        assert_eq!(job.baudrate, 400_000);
        assert!(!job.verify);
        assert_eq!(job.write_cycle_us, DEFAULT_WRITE_CYCLE_US);
    }

    #[test]
    fn test_missing_required() {
        let err = WriteJobBuilder::new().firmware("fw.bin").build().unwrap_err();
        assert_eq!(err, ConfigError::Missing("slave_address"));

        let err = WriteJobBuilder::new().target_address(0x50).build().unwrap_err();
        assert_eq!(err, ConfigError::Missing("firmware"));
    }

    #[test]
    fn test_range_checks() {
        assert_eq!(
            minimal().chunk_size(0).build().unwrap_err(),
            ConfigError::ZeroChunkSize
        );
        assert_eq!(
            minimal().bus_id(2).build().unwrap_err(),
            ConfigError::InvalidBus(2)
        );
        assert_eq!(
            minimal().address_width(5).build().unwrap_err(),
            ConfigError::InvalidAddressWidth(5)
        );
        assert_eq!(
            minimal().target_address(0x80).build().unwrap_err(),
            ConfigError::InvalidTargetAddress(0x80)
        );
    }

    #[test]
    fn test_start_chunk_converts_to_address() {
        let job = minimal().start_chunk(3).chunk_size(64).build().unwrap();
        assert_eq!(job.start_address, 192);
    }

    #[test]
    fn test_start_conflict() {
        let err = minimal().start_chunk(1).start_address(0).build().unwrap_err();
        assert_eq!(err, ConfigError::ConflictingStart);
    }

    #[test]
    fn test_merge_overrides() {
        let file = minimal().chunk_size(32).start_chunk(2).baudrate(100_000);
        let cli = WriteJobBuilder::new().start_address(0x1000).verify(true);
        let job = file.merge(cli).build().unwrap();

        assert_eq!(job.chunk_size, 32);
        assert_eq!(job.baudrate, 100_000);
        assert_eq!(job.start_address, 0x1000);
        assert!(job.verify);
    }

    #[test]
    fn test_check_image_size() {
        let job = minimal().address_width(1).start_address(0xF0).build().unwrap();
        assert!(job.check_image_size(0x10).is_ok());
        assert_eq!(
            job.check_image_size(0x11),
            Err(ConfigError::ImageExceedsAddressSpace {
                end: 0x101,
                width: 1,
                limit: 0x100,
            })
        );
    }

    #[test]
    fn test_total_chunks() {
        let job = minimal().build().unwrap();
        assert_eq!(job.total_chunks(0), 0);
        assert_eq!(job.total_chunks(128), 1);
        assert_eq!(job.total_chunks(300), 3);
    }
}
