//! Programmer registry and bus handle
//!
//! This crate opens I2C programmers by name and hands the CLI a single
//! [`BusHandle`] type, whatever adapter sits behind it. The CLI never
//! depends on adapter crates directly.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              CLI (bin/i2cflash)              │
//! │  - Only imports i2cflash-bus and -core       │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │          i2cflash-bus (this crate)           │
//! │  - open_bus(): programmer string -> handle   │
//! │  - BusHandle: owns the boxed I2cMaster       │
//! └──────────────────────────────────────────────┘
//!                       │
//!         ┌─────────────┴─────────────┐
//!         ▼                           ▼
//! ┌──────────────────┐   ┌──────────────────────────┐
//! │  i2cflash-core   │   │  Adapter crates          │
//! │  - I2cMaster     │   │  - dummy, ch341a,        │
//! │  - run_job()     │   │    linux-i2c             │
//! └──────────────────┘   └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use i2cflash_bus::open_bus;
//! use i2cflash_core::writer::{run_job, NoProgress};
//!
//! let mut bus = open_bus("ch341a", job.bus_id)?;
//! run_job(&mut bus, &job, &mut NoProgress)?;
//! ```

mod handle;
mod registry;

pub use handle::BusHandle;
pub use registry::{
    available_programmers, open_bus, parse_programmer_params, programmer_names_short,
    ProgrammerParams,
};
