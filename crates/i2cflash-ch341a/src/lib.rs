//! i2cflash-ch341a - CH341A USB programmer support
//!
//! This crate provides support for the CH341A USB adapter as an I2C master.
//! The CH341A is a cheap and widely available USB programmer commonly used
//! for programming 24Cxx EEPROMs.
//!
//! # Protocol Overview
//!
//! The CH341A communicates via USB bulk transfers. I2C traffic is sent as
//! `I2C_STREAM` command packets of at most 32 bytes, each carrying bus
//! primitives (START, STOP, write bytes, read bytes). A long write is split
//! across several packets with START only in the first and STOP only in the
//! last, so it stays a single bus transaction.
//!
//! # Example
//!
//! ```no_run
//! use i2cflash_ch341a::Ch341a;
//! use i2cflash_core::i2c::{AddressWidth, I2cWrite, TargetAddress};
//! use i2cflash_core::programmer::I2cMaster;
//!
//! let mut ch341a = Ch341a::open()?;
//! ch341a.configure(400_000)?;
//! let target = TargetAddress::new(0x50)?;
//! ch341a.transmit(&I2cWrite::new(target, 0x0000, AddressWidth::TwoByte, &[0xAA]))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod device;
mod error;
mod protocol;

pub use device::Ch341a;
pub use error::{Ch341aError, Result};
