//! Programmer trait definitions

use crate::error::{Error, Result};
use crate::i2c::{I2cRead, I2cWrite};
use bitflags::bitflags;

bitflags! {
    /// I2C master feature flags
    ///
    /// These flags indicate what capabilities a programmer supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct I2cFeatures: u32 {
        /// Can perform random reads (needed for verification)
        const READ         = 1 << 0;
        /// Bus clock can be set from software
        const SPEED_CONFIG = 1 << 1;
    }
}

impl Default for I2cFeatures {
    fn default() -> Self {
        I2cFeatures::empty()
    }
}

/// I2C master trait
///
/// This trait represents a programmer that can issue addressed I2C memory
/// transactions. All calls block until the transaction has completed or
/// failed.
///
/// ## Lifecycle
///
/// 1. The programmer is opened by its crate (device discovery is not part
///    of this trait)
/// 2. `configure()` is called once with the bus clock
/// 3. `transmit()` / `receive()` are called sequentially
/// 4. Dropping the programmer releases the bus
///
/// ## Example
///
/// ```ignore
/// impl I2cMaster for MyAdapter {
///     fn features(&self) -> I2cFeatures {
///         I2cFeatures::READ | I2cFeatures::SPEED_CONFIG
///     }
///
///     fn max_write_len(&self) -> usize {
///         256
///     }
///
///     fn configure(&mut self, baudrate: u32) -> Result<()> {
///         self.set_clock(baudrate).map_err(|_| Error::UnsupportedSpeed)
///     }
///
///     fn transmit(&mut self, xfer: &I2cWrite<'_>) -> Result<()> {
///         self.bus_write(xfer.target.get(), &xfer.to_bytes())
///             .map_err(|_| Error::Nack)
///     }
///
///     fn delay_us(&mut self, us: u32) {
///         std::thread::sleep(std::time::Duration::from_micros(us as u64));
///     }
/// }
/// ```
pub trait I2cMaster {
    /// Get the features supported by this programmer
    fn features(&self) -> I2cFeatures;

    /// Get the maximum payload (excluding internal address) of one write
    fn max_write_len(&self) -> usize;

    /// Set the bus clock in Hz
    ///
    /// Called once before the first transaction. Returns
    /// `Error::UnsupportedSpeed` if the programmer cannot run at `baudrate`.
    fn configure(&mut self, baudrate: u32) -> Result<()>;

    /// Execute a single addressed write
    fn transmit(&mut self, xfer: &I2cWrite<'_>) -> Result<()>;

    /// Execute a single random read
    ///
    /// Only programmers reporting `I2cFeatures::READ` need to implement this.
    fn receive(&mut self, _xfer: &mut I2cRead<'_>) -> Result<()> {
        Err(Error::ReadNotSupported)
    }

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}

// Blanket impl for boxed masters to allow trait objects
impl I2cMaster for Box<dyn I2cMaster + Send> {
    fn features(&self) -> I2cFeatures {
        (**self).features()
    }

    fn max_write_len(&self) -> usize {
        (**self).max_write_len()
    }

    fn configure(&mut self, baudrate: u32) -> Result<()> {
        (**self).configure(baudrate)
    }

    fn transmit(&mut self, xfer: &I2cWrite<'_>) -> Result<()> {
        (**self).transmit(xfer)
    }

    fn receive(&mut self, xfer: &mut I2cRead<'_>) -> Result<()> {
        (**self).receive(xfer)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Information about a programmer
#[derive(Debug, Clone)]
pub struct ProgrammerInfo {
    /// Name of the programmer
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description
    pub description: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::{AddressWidth, TargetAddress};

    struct WriteOnly {
        sent: usize,
    }

    impl I2cMaster for WriteOnly {
        fn features(&self) -> I2cFeatures {
            I2cFeatures::default()
        }

        fn max_write_len(&self) -> usize {
            64
        }

        fn configure(&mut self, _baudrate: u32) -> Result<()> {
            Ok(())
        }

        fn transmit(&mut self, _xfer: &I2cWrite<'_>) -> Result<()> {
            self.sent += 1;
            Ok(())
        }

        fn delay_us(&mut self, _us: u32) {}
    }

    fn send_one<M: I2cMaster>(master: &mut M) -> Result<()> {
        let target = TargetAddress::new(0x50).unwrap();
        master.transmit(&I2cWrite::new(target, 0, AddressWidth::TwoByte, &[1, 2]))
    }

    #[test]
    fn test_boxed_master_delegates() {
        let mut boxed: Box<dyn I2cMaster + Send> = Box::new(WriteOnly { sent: 0 });
        assert_eq!(boxed.max_write_len(), 64);
        send_one(&mut boxed).unwrap();
    }

    #[test]
    fn test_receive_defaults_to_unsupported() {
        let mut master = WriteOnly { sent: 0 };
        let target = TargetAddress::new(0x50).unwrap();
        let mut buf = [0u8; 2];
        let mut xfer = I2cRead::new(target, 0, AddressWidth::TwoByte, &mut buf);
        assert_eq!(master.receive(&mut xfer), Err(Error::ReadNotSupported));
        assert!(!master.features().contains(I2cFeatures::READ));
        send_one(&mut master).unwrap();
        assert_eq!(master.sent, 1);
    }
}
