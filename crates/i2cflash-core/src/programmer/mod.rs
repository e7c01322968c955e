//! Programmer traits and abstractions
//!
//! This module defines the trait that every I2C adapter implements so the
//! writer can drive it without knowing the hardware behind it.

mod traits;

pub use traits::*;
