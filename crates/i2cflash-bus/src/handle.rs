//! BusHandle - an opened programmer, ready for a write job

use i2cflash_core::error::Result;
use i2cflash_core::i2c::{I2cRead, I2cWrite};
use i2cflash_core::programmer::{I2cFeatures, I2cMaster};

/// An opened I2C programmer
///
/// The handle owns the adapter. Dropping it closes the adapter and releases
/// the bus, on every exit path of the caller.
pub struct BusHandle {
    master: Box<dyn I2cMaster + Send>,
    programmer: &'static str,
    bus_id: u8,
}

impl BusHandle {
    pub(crate) fn new(master: Box<dyn I2cMaster + Send>, programmer: &'static str, bus_id: u8) -> Self {
        Self {
            master,
            programmer,
            bus_id,
        }
    }

    /// Canonical name of the programmer behind this handle
    pub fn programmer(&self) -> &'static str {
        self.programmer
    }

    /// Bus the handle was opened for
    pub fn bus_id(&self) -> u8 {
        self.bus_id
    }
}

impl I2cMaster for BusHandle {
    fn features(&self) -> I2cFeatures {
        self.master.features()
    }

    fn max_write_len(&self) -> usize {
        self.master.max_write_len()
    }

    fn configure(&mut self, baudrate: u32) -> Result<()> {
        self.master.configure(baudrate)
    }

    fn transmit(&mut self, xfer: &I2cWrite<'_>) -> Result<()> {
        self.master.transmit(xfer)
    }

    fn receive(&mut self, xfer: &mut I2cRead<'_>) -> Result<()> {
        self.master.receive(xfer)
    }

    fn delay_us(&mut self, us: u32) {
        self.master.delay_us(us)
    }
}

impl Drop for BusHandle {
    fn drop(&mut self) {
        log::debug!("Closing {} (bus {})", self.programmer, self.bus_id);
    }
}
