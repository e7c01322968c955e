//! CH341A device implementation
//!
//! This module provides the main `Ch341a` struct that implements USB
//! communication with the CH341A programmer and the `I2cMaster` trait.

use std::time::Duration;

use i2cflash_core::error::{Error as CoreError, Result as CoreResult};
use i2cflash_core::i2c::{piece_addresses, I2cRead, I2cWrite};
use i2cflash_core::programmer::{I2cFeatures, I2cMaster};
use nusb::transfer::{Buffer, Bulk, In, Out};
use nusb::{Endpoint, MaybeFuture};

use crate::error::{Ch341aError, Result};
use crate::protocol::*;

const USB_TIMEOUT: Duration = Duration::from_secs(5);

/// CH341A USB programmer
///
/// This struct represents a connection to a CH341A USB device and implements
/// the `I2cMaster` trait for writing to I2C memory chips. All methods are
/// synchronous and blocking.
pub struct Ch341a {
    /// Bulk OUT endpoint for writes
    out_ep: Endpoint<Bulk, Out>,
    /// Bulk IN endpoint for reads
    in_ep: Endpoint<Bulk, In>,
}

impl Ch341a {
    /// Open a CH341A device
    ///
    /// Searches for a CH341A device (VID:1a86 PID:5512) and opens it.
    /// Returns an error if no device is found or if the device cannot be opened.
    pub fn open() -> Result<Self> {
        Self::open_nth(0)
    }

    /// Open the nth CH341A device (0-indexed)
    ///
    /// Useful when multiple CH341A devices are connected.
    pub fn open_nth(index: usize) -> Result<Self> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| Ch341aError::OpenFailed(e.to_string()))?
            .filter(|d| d.vendor_id() == CH341A_USB_VENDOR && d.product_id() == CH341A_USB_PRODUCT)
            .collect();

        let device_info = devices.get(index).ok_or(Ch341aError::DeviceNotFound)?;

        log::info!(
            "Opening CH341A device at bus {} address {}",
            device_info.busnum(),
            device_info.device_address()
        );

        let device = device_info
            .open()
            .wait()
            .map_err(|e| Ch341aError::OpenFailed(e.to_string()))?;

        let interface = device
            .claim_interface(0)
            .wait()
            .map_err(|e| Ch341aError::ClaimFailed(e.to_string()))?;

        let out_ep = interface
            .endpoint::<Bulk, Out>(WRITE_EP)
            .map_err(|e| Ch341aError::ClaimFailed(e.to_string()))?;
        let in_ep = interface
            .endpoint::<Bulk, In>(READ_EP)
            .map_err(|e| Ch341aError::ClaimFailed(e.to_string()))?;

        Ok(Self { out_ep, in_ep })
    }

    /// Write one command packet to the OUT endpoint
    fn usb_write(&mut self, data: &[u8]) -> Result<()> {
        let buf = Buffer::from(data.to_vec());
        self.out_ep.submit(buf);

        let completion = match self.out_ep.wait_next_complete(USB_TIMEOUT) {
            Some(c) => c,
            None => {
                self.drain_all_pending();
                return Err(Ch341aError::Timeout);
            }
        };

        completion
            .status
            .map_err(|e| Ch341aError::TransferFailed(e.to_string()))?;

        log::trace!("USB write {} bytes", data.len());
        Ok(())
    }

    /// Read `len` bytes produced by previously sent packets
    fn usb_read(&mut self, len: usize) -> Result<Vec<u8>> {
        let request_len = self.in_ep.max_packet_size();
        let mut out = Vec::with_capacity(len);

        while out.len() < len {
            self.in_ep.submit(Buffer::new(request_len));

            let completion = match self.in_ep.wait_next_complete(USB_TIMEOUT) {
                Some(c) => c,
                None => {
                    self.drain_all_pending();
                    return Err(Ch341aError::Timeout);
                }
            };
            completion
                .status
                .map_err(|e| Ch341aError::TransferFailed(e.to_string()))?;

            let take = completion_len(completion.actual_len, len - out.len())?;
            out.extend_from_slice(&completion.buffer[..take]);
        }

        log::trace!("USB read {} bytes", len);
        Ok(out)
    }

    /// Check that `addr` acknowledges its address byte
    fn probe(&mut self, addr: u8) -> Result<()> {
        self.usb_write(&probe_packet(addr))?;
        let status = self.usb_read(1)?;
        if status[0] & I2C_NACK_BIT != 0 {
            return Err(Ch341aError::Nack(addr));
        }
        Ok(())
    }

    fn write_transaction(&mut self, xfer: &I2cWrite<'_>) -> Result<()> {
        self.probe(xfer.target.get())?;

        let mut bytes = Vec::with_capacity(1 + xfer.header_len() + xfer.data.len());
        bytes.push(xfer.target.write_byte());
        bytes.extend_from_slice(&xfer.to_bytes());

        for pkt in write_packets(&bytes) {
            self.usb_write(&pkt)?;
        }
        Ok(())
    }

    fn read_transaction(&mut self, xfer: &mut I2cRead<'_>) -> Result<()> {
        self.probe(xfer.target.get())?;

        let write_addr = xfer.target.write_byte();
        let read_addr = xfer.target.read_byte();
        let mut header = vec![0u8; xfer.header_len()];
        let addresses = piece_addresses(xfer.address, xfer.buf.len(), I2C_READ_CHUNK);

        for (piece, address) in xfer.buf.chunks_mut(I2C_READ_CHUNK).zip(addresses) {
            xfer.address_width.encode(address, &mut header);
            self.usb_write(&set_address_packet(write_addr, &header))?;
            self.usb_write(&read_packet(read_addr, piece.len()))?;

            let data = self.usb_read(piece.len())?;
            piece.copy_from_slice(&data);
        }
        Ok(())
    }

    /// Cancel and drain all pending transfers on both endpoints.
    fn drain_all_pending(&mut self) {
        self.out_ep.cancel_all();
        while self.out_ep.pending() > 0 {
            let _ = self.out_ep.wait_next_complete(Duration::from_secs(1));
        }
        self.in_ep.cancel_all();
        while self.in_ep.pending() > 0 {
            let _ = self.in_ep.wait_next_complete(Duration::from_secs(1));
        }
    }
}

/// Number of bytes to keep from an IN completion (empty completions fail)
fn completion_len(actual_len: usize, remaining: usize) -> Result<usize> {
    if actual_len == 0 {
        return Err(Ch341aError::TransferFailed(
            "adapter returned an empty read".to_string(),
        ));
    }
    Ok(actual_len.min(remaining))
}

impl Drop for Ch341a {
    fn drop(&mut self) {
        // Drain any pending transfers before shutdown to avoid panics
        self.drain_all_pending();

        if let Err(e) = self.usb_write(&release_pins_packet()) {
            log::warn!("Failed to release pins on close: {}", e);
        }
    }
}

impl I2cMaster for Ch341a {
    fn features(&self) -> I2cFeatures {
        I2cFeatures::READ | I2cFeatures::SPEED_CONFIG
    }

    fn max_write_len(&self) -> usize {
        MAX_WRITE_LEN
    }

    fn configure(&mut self, baudrate: u32) -> CoreResult<()> {
        let speed = speed_bits(baudrate).ok_or(CoreError::UnsupportedSpeed)?;
        self.usb_write(&config_packet(speed))?;
        log::info!("CH341A configured for I2C at {} Hz", baudrate);
        Ok(())
    }

    fn transmit(&mut self, xfer: &I2cWrite<'_>) -> CoreResult<()> {
        if xfer.data.len() > MAX_WRITE_LEN {
            return Err(CoreError::PayloadTooLarge);
        }
        self.write_transaction(xfer).map_err(|e| {
            log::debug!("CH341A write to {} failed: {}", xfer.target, e);
            CoreError::from(e)
        })
    }

    fn receive(&mut self, xfer: &mut I2cRead<'_>) -> CoreResult<()> {
        self.read_transaction(xfer).map_err(|e| {
            log::debug!("CH341A read from {} failed: {}", xfer.target, e);
            CoreError::from(e)
        })
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_len() {
        assert_eq!(completion_len(32, 5).unwrap(), 5);
        assert_eq!(completion_len(3, 5).unwrap(), 3);
    }

    #[test]
    fn test_empty_completion_fails() {
        assert!(matches!(
            completion_len(0, 5),
            Err(Ch341aError::TransferFailed(_))
        ));
    }
}
