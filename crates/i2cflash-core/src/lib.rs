//! i2cflash-core - Core library for I2C EEPROM/flash programming
//!
//! This crate provides the pieces needed to stream a firmware image into
//! an I2C memory chip: transaction types, the `I2cMaster` trait that every
//! adapter implements, the `WriteJob` configuration and the chunked writer.
//!
//! # Example
//!
//! ```ignore
//! use i2cflash_core::job::WriteJobBuilder;
//! use i2cflash_core::writer::{run_job, NoProgress};
//!
//! let job = WriteJobBuilder::new()
//!     .target_address(0x50)
//!     .firmware("eeprom.bin")
//!     .build()?;
//!
//! let stats = run_job(&mut master, &job, &mut NoProgress)?;
//! println!("Wrote {} bytes in {} chunks", stats.bytes_written, stats.chunks_written);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod i2c;
pub mod job;
pub mod programmer;
pub mod writer;

pub use error::{ConfigError, Error, Result, WriteError};
