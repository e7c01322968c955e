//! Linux I2C device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the
//! `I2cMaster` trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use i2cflash_core::error::{Error as CoreError, Result as CoreResult};
use i2cflash_core::i2c::{piece_addresses, I2cRead, I2cWrite};
use i2cflash_core::programmer::{I2cFeatures, I2cMaster};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::time::Duration;

/// Largest message the i2c-dev driver accepts
const MAX_MSG_LEN: usize = 8192;

/// Linux i2c-dev ioctl definitions
mod ioctl {
    use nix::ioctl_write_ptr_bad;

    /// Combined read/write transfer (one STOP at the end)
    const I2C_RDWR: u16 = 0x0707;

    /// Message flag: read data, from slave to master
    pub const I2C_M_RD: u16 = 0x0001;

    /// This must match the kernel's struct i2c_msg layout
    #[repr(C)]
    pub struct I2cMsg {
        pub addr: u16,
        pub flags: u16,
        pub len: u16,
        pub buf: *mut u8,
    }

    /// This must match the kernel's struct i2c_rdwr_ioctl_data layout
    #[repr(C)]
    pub struct I2cRdwrData {
        pub msgs: *mut I2cMsg,
        pub nmsgs: u32,
    }

    ioctl_write_ptr_bad!(i2c_rdwr, I2C_RDWR, I2cRdwrData);
}

/// Configuration for opening a Linux I2C device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
}

impl LinuxI2cConfig {
    /// Configuration for the device node of a bus number
    pub fn for_bus(bus: u8) -> Self {
        Self {
            device: format!("/dev/i2c-{}", bus),
        }
    }
}

/// Linux I2C programmer using the i2c-dev interface
///
/// The bus clock belongs to the kernel driver (device tree or module
/// parameter), so `configure()` only records what was asked for.
pub struct LinuxI2c {
    /// File handle for the i2c-dev node
    file: File,
    device: String,
}

impl LinuxI2c {
    /// Open a Linux I2C device with the given configuration
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        log::debug!("linux_i2c: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        log::info!("linux_i2c: Opened {}", config.device);

        Ok(Self {
            file,
            device: config.device.clone(),
        })
    }

    /// Open the device node of a bus number
    pub fn open_bus(bus: u8) -> Result<Self> {
        Self::open(&LinuxI2cConfig::for_bus(bus))
    }

    /// Run a list of messages as one combined transaction
    fn rdwr(&mut self, addr: u8, msgs: &mut [ioctl::I2cMsg]) -> Result<()> {
        let mut data = ioctl::I2cRdwrData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: msgs.len() as u32,
        };

        // SAFETY: every message buffer outlives the call and `len` matches it
        unsafe { ioctl::i2c_rdwr(self.file.as_raw_fd(), &mut data) }
            .map_err(|source| LinuxI2cError::TransferFailed { addr, source })?;
        Ok(())
    }
}

impl I2cMaster for LinuxI2c {
    fn features(&self) -> I2cFeatures {
        I2cFeatures::READ
    }

    fn max_write_len(&self) -> usize {
        // Room for a four-byte internal address in the same message
        MAX_MSG_LEN - 4
    }

    fn configure(&mut self, baudrate: u32) -> CoreResult<()> {
        log::debug!(
            "linux_i2c: bus clock is set by the kernel for {}, ignoring {} Hz",
            self.device,
            baudrate
        );
        Ok(())
    }

    fn transmit(&mut self, xfer: &I2cWrite<'_>) -> CoreResult<()> {
        let addr = xfer.target.get();
        let mut bytes = xfer.to_bytes();
        if bytes.len() > MAX_MSG_LEN {
            return Err(CoreError::PayloadTooLarge);
        }

        let mut msgs = [ioctl::I2cMsg {
            addr: addr as u16,
            flags: 0,
            len: bytes.len() as u16,
            buf: bytes.as_mut_ptr(),
        }];

        self.rdwr(addr, &mut msgs).map_err(|e| {
            log::debug!("linux_i2c: {}", e);
            CoreError::from(e)
        })
    }

    fn receive(&mut self, xfer: &mut I2cRead<'_>) -> CoreResult<()> {
        let addr = xfer.target.get();
        let mut header = vec![0u8; xfer.header_len()];
        let addresses = piece_addresses(xfer.address, xfer.buf.len(), MAX_MSG_LEN);

        for (piece, address) in xfer.buf.chunks_mut(MAX_MSG_LEN).zip(addresses) {
            xfer.address_width.encode(address, &mut header);
            let mut msgs = [
                ioctl::I2cMsg {
                    addr: addr as u16,
                    flags: 0,
                    len: header.len() as u16,
                    buf: header.as_mut_ptr(),
                },
                ioctl::I2cMsg {
                    addr: addr as u16,
                    flags: ioctl::I2C_M_RD,
                    len: piece.len() as u16,
                    buf: piece.as_mut_ptr(),
                },
            ];

            self.rdwr(addr, &mut msgs).map_err(|e| {
                log::debug!("linux_i2c: {}", e);
                CoreError::from(e)
            })?;
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }
}

/// Parse programmer options into a LinuxI2cConfig
///
/// Without `dev=`, the device node is derived from `bus`.
pub fn parse_options(options: &[(&str, &str)], bus: u8) -> Result<LinuxI2cConfig> {
    let mut config = LinuxI2cConfig::for_bus(bus);

    for (key, value) in options {
        match *key {
            "dev" => {
                if value.is_empty() {
                    return Err(LinuxI2cError::InvalidParameter(
                        "Empty dev= value".to_string(),
                    ));
                }
                config.device = value.to_string();
            }
            _ => {
                log::warn!("linux_i2c: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}
