//! CLI command implementations
//!
//! The commands open a programmer through `i2cflash-bus` and hand it to the
//! core writer together with an indicatif progress sink.

mod list;
mod progress;
mod write;

pub use list::list_programmers;
pub use write::{run_verify, run_write};
