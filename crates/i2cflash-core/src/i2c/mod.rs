//! I2C types and transaction structures
//!
//! This module provides types for representing addressed I2C memory
//! transactions: the 7-bit target address, the width of the chip's
//! internal address, and the write/read transaction shapes.

mod address;
mod transaction;

pub use address::{AddressWidth, TargetAddress};
pub use transaction::{piece_addresses, I2cRead, I2cWrite};

/// Standard-mode bus clock (100 kHz)
pub const STANDARD_MODE: u32 = 100_000;

/// Fast-mode bus clock (400 kHz)
pub const FAST_MODE: u32 = 400_000;
