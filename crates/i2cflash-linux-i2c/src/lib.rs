//! i2cflash-linux-i2c - Linux i2c-dev support
//!
//! This crate provides access to I2C controllers through the Linux
//! `/dev/i2c-N` device interface.
//!
//! # Overview
//!
//! Every write is issued as a single `I2C_RDWR` message, so the internal
//! address and the payload go out between one START and one STOP. Reads use
//! a two-message `I2C_RDWR` (address write, repeated START, read).
//!
//! # Example
//!
//! ```no_run
//! use i2cflash_linux_i2c::LinuxI2c;
//! use i2cflash_core::i2c::{AddressWidth, I2cWrite, TargetAddress};
//! use i2cflash_core::programmer::I2cMaster;
//!
//! let mut i2c = LinuxI2c::open_bus(1)?;
//! let target = TargetAddress::new(0x50)?;
//! i2c.transmit(&I2cWrite::new(target, 0x0000, AddressWidth::TwoByte, &[0xAA]))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with i2cflash CLI
//!
//! ```bash
//! # Bus 1 -> /dev/i2c-1
//! i2cflash write -p linux_i2c --bus 1 --slave-address 0x50 --firmware fw.bin
//!
//! # Explicit device node
//! i2cflash write -p linux_i2c:dev=/dev/i2c-7 --slave-address 0x50 --firmware fw.bin
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with i2c-dev support enabled (`CONFIG_I2C_CHARDEV`)
//! - Read/write access to `/dev/i2c-N` (usually the `i2c` group)
//! - The bus clock is configured by the kernel driver, not by this crate

mod device;
mod error;

pub use device::{parse_options, LinuxI2c, LinuxI2cConfig};
pub use error::{LinuxI2cError, Result};
