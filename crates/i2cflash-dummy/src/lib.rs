//! i2cflash-dummy - In-memory I2C EEPROM emulator for testing
//!
//! This crate provides a dummy programmer with a 24Cxx-style EEPROM behind
//! it. It's useful for testing and development without real hardware.
//!
//! The emulation follows what real parts do with a page write: bytes that
//! run past the end of the page wrap around to the start of the same page.

use i2cflash_core::error::{Error, Result};
use i2cflash_core::i2c::{I2cRead, I2cWrite, FAST_MODE, STANDARD_MODE};
use i2cflash_core::programmer::{I2cFeatures, I2cMaster};

/// Configuration for the dummy EEPROM
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// 7-bit bus address the chip answers on
    pub target_address: u8,
    /// Memory size in bytes
    pub size: usize,
    /// Page size for writes
    pub page_size: usize,
    /// Largest payload accepted in one transaction
    pub max_write_len: usize,
    /// Bus clocks the emulated adapter accepts
    pub supported_speeds: Vec<u32>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            target_address: 0x50,
            size: 64 * 1024, // 24C512
            page_size: 128,
            max_write_len: 256,
            supported_speeds: vec![STANDARD_MODE, FAST_MODE],
        }
    }
}

/// A write as seen on the emulated bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedWrite {
    /// Target address the write was sent to
    pub target: u8,
    /// Internal address
    pub address: u32,
    /// Payload
    pub data: Vec<u8>,
}

/// Dummy I2C programmer with an emulated EEPROM
pub struct DummyEeprom {
    config: DummyConfig,
    data: Vec<u8>,
    baudrate: Option<u32>,
    writes: Vec<LoggedWrite>,
    fail_on: Option<(usize, Error)>,
    attempts: usize,
    total_delay_us: u64,
}

impl DummyEeprom {
    /// Create a new dummy EEPROM with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            baudrate: None,
            writes: Vec::new(),
            fail_on: None,
            attempts: 0,
            total_delay_us: 0,
        }
    }

    /// Create a new dummy EEPROM with default configuration (24C512 at 0x50)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get a reference to the memory contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the memory contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Bus clock set by the last successful `configure()`
    pub fn baudrate(&self) -> Option<u32> {
        self.baudrate
    }

    /// Every write that reached the chip, in order
    pub fn transactions(&self) -> &[LoggedWrite] {
        &self.writes
    }

    /// Sum of all requested delays
    pub fn total_delay_us(&self) -> u64 {
        self.total_delay_us
    }

    /// Make the `n`th write attempt (1-based) fail with `err`
    pub fn fail_on_transaction(&mut self, n: usize, err: Error) {
        self.fail_on = Some((n, err));
    }

    fn check_target(&self, target: u8) -> Result<()> {
        if target != self.config.target_address {
            log::debug!("dummy: no device at 0x{:02X}", target);
            return Err(Error::Nack);
        }
        Ok(())
    }

    fn program(&mut self, address: usize, payload: &[u8]) {
        let page = self.config.page_size;
        let base = address - address % page;
        let offset = address % page;

        if offset + payload.len() > page {
            log::warn!(
                "dummy: write of {} bytes at 0x{:X} crosses a {}-byte page, wrapping",
                payload.len(),
                address,
                page
            );
        }

        for (i, &byte) in payload.iter().enumerate() {
            self.data[base + (offset + i) % page] = byte;
        }
    }
}

impl I2cMaster for DummyEeprom {
    fn features(&self) -> I2cFeatures {
        I2cFeatures::READ | I2cFeatures::SPEED_CONFIG
    }

    fn max_write_len(&self) -> usize {
        self.config.max_write_len
    }

    fn configure(&mut self, baudrate: u32) -> Result<()> {
        if !self.config.supported_speeds.contains(&baudrate) {
            return Err(Error::UnsupportedSpeed);
        }
        log::debug!("dummy: bus clock {} Hz", baudrate);
        self.baudrate = Some(baudrate);
        Ok(())
    }

    fn transmit(&mut self, xfer: &I2cWrite<'_>) -> Result<()> {
        self.attempts += 1;
        if let Some((n, err)) = self.fail_on {
            if self.attempts == n {
                return Err(err);
            }
        }

        if self.baudrate.is_none() {
            return Err(Error::ProgrammerNotReady);
        }
        self.check_target(xfer.target.get())?;
        if xfer.data.len() > self.config.max_write_len {
            return Err(Error::PayloadTooLarge);
        }

        let address = xfer.address as usize;
        if address + xfer.data.len() > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }

        self.program(address, xfer.data);
        self.writes.push(LoggedWrite {
            target: xfer.target.get(),
            address: xfer.address,
            data: xfer.data.to_vec(),
        });
        Ok(())
    }

    fn receive(&mut self, xfer: &mut I2cRead<'_>) -> Result<()> {
        self.check_target(xfer.target.get())?;

        let address = xfer.address as usize;
        let len = xfer.buf.len();
        if address + len > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }

        xfer.buf.copy_from_slice(&self.data[address..address + len]);
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.total_delay_us += us as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2cflash_core::error::{ConfigError, WriteError};
    use i2cflash_core::i2c::{AddressWidth, TargetAddress};
    use i2cflash_core::job::WriteJobBuilder;
    use i2cflash_core::writer::{run_job, NoProgress};

    fn configured() -> DummyEeprom {
        let mut eeprom = DummyEeprom::new_default();
        eeprom.configure(FAST_MODE).unwrap();
        eeprom
    }

    fn target() -> TargetAddress {
        TargetAddress::new(0x50).unwrap()
    }

    #[test]
    fn test_write_and_read_back() {
        let mut eeprom = configured();
        let data = [0xDE, 0xAD, 0xBE, 0xEF];
        eeprom
            .transmit(&I2cWrite::new(target(), 0x100, AddressWidth::TwoByte, &data))
            .unwrap();

        let mut buf = [0u8; 4];
        eeprom
            .receive(&mut I2cRead::new(
                target(),
                0x100,
                AddressWidth::TwoByte,
                &mut buf,
            ))
            .unwrap();
        assert_eq!(buf, data);
        assert_eq!(eeprom.transactions().len(), 1);
        assert_eq!(eeprom.transactions()[0].address, 0x100);
    }

    #[test]
    fn test_wrong_target_nacks() {
        let mut eeprom = configured();
        let other = TargetAddress::new(0x51).unwrap();
        let err = eeprom
            .transmit(&I2cWrite::new(other, 0, AddressWidth::TwoByte, &[0]))
            .unwrap_err();
        assert_eq!(err, Error::Nack);
        assert!(eeprom.transactions().is_empty());
    }

    #[test]
    fn test_page_wrap() {
        let mut eeprom = configured();
        let data = [1u8, 2, 3, 4];
        eeprom
            .transmit(&I2cWrite::new(target(), 126, AddressWidth::TwoByte, &data))
            .unwrap();

        assert_eq!(&eeprom.data()[126..128], &[1, 2]);
        assert_eq!(&eeprom.data()[0..2], &[3, 4]);
        assert_eq!(eeprom.data()[128], 0xFF);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut eeprom = configured();
        let err = eeprom
            .transmit(&I2cWrite::new(target(), 0xFFFE, AddressWidth::TwoByte, &[0; 4]))
            .unwrap_err();
        assert_eq!(err, Error::AddressOutOfBounds);
    }

    #[test]
    fn test_unsupported_speed() {
        let mut eeprom = DummyEeprom::new_default();
        assert_eq!(eeprom.configure(1_000_000), Err(Error::UnsupportedSpeed));
        assert_eq!(eeprom.baudrate(), None);
    }

    #[test]
    fn test_write_before_configure() {
        let mut eeprom = DummyEeprom::new_default();
        let err = eeprom
            .transmit(&I2cWrite::new(target(), 0, AddressWidth::TwoByte, &[0]))
            .unwrap_err();
        assert_eq!(err, Error::ProgrammerNotReady);
    }

    fn firmware(dir: &tempfile::TempDir, len: usize) -> (std::path::PathBuf, Vec<u8>) {
        let path = dir.path().join("fw.bin");
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();
        (path, data)
    }

    #[test]
    fn test_run_job_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (path, data) = firmware(&dir, 300);

        let job = WriteJobBuilder::new()
            .target_address(0x50)
            .firmware(&path)
            .verify(true)
            .build()
            .unwrap();

        let mut eeprom = DummyEeprom::new_default();
        let stats = run_job(&mut eeprom, &job, &mut NoProgress).unwrap();

        assert_eq!(stats.chunks_written, 3);
        assert!(stats.verified);
        assert_eq!(&eeprom.data()[..300], &data[..]);
        assert_eq!(eeprom.data()[300], 0xFF);

        let layout: Vec<(u32, usize)> = eeprom
            .transactions()
            .iter()
            .map(|w| (w.address, w.data.len()))
            .collect();
        assert_eq!(layout, vec![(0, 128), (128, 128), (256, 44)]);
        assert_eq!(eeprom.total_delay_us(), 3 * job.write_cycle_us as u64);
    }

    #[test]
    fn test_run_job_legacy_start_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let (path, data) = firmware(&dir, 64);

        let job = WriteJobBuilder::new()
            .target_address(0x50)
            .firmware(&path)
            .chunk_size(64)
            .start_chunk(0x40)
            .build()
            .unwrap();

        let mut eeprom = DummyEeprom::new_default();
        run_job(&mut eeprom, &job, &mut NoProgress).unwrap();

        assert_eq!(eeprom.transactions().len(), 1);
        assert_eq!(eeprom.transactions()[0].address, 0x1000);
        assert_eq!(&eeprom.data()[0x1000..0x1040], &data[..]);
    }

    #[test]
    fn test_run_job_stops_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (path, data) = firmware(&dir, 300);

        let job = WriteJobBuilder::new()
            .target_address(0x50)
            .firmware(&path)
            .build()
            .unwrap();

        let mut eeprom = DummyEeprom::new_default();
        eeprom.fail_on_transaction(2, Error::Timeout);
        let err = run_job(&mut eeprom, &job, &mut NoProgress).unwrap_err();

        assert!(matches!(
            err,
            WriteError::Transport {
                chunk: 1,
                address: 128,
                source: Error::Timeout
            }
        ));
        assert_eq!(eeprom.transactions().len(), 1);
        assert_eq!(&eeprom.data()[..128], &data[..128]);
        assert!(eeprom.data()[128..300].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_run_job_wrong_target() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = firmware(&dir, 16);

        let job = WriteJobBuilder::new()
            .target_address(0x57)
            .firmware(&path)
            .build()
            .unwrap();

        let mut eeprom = DummyEeprom::new_default();
        let err = run_job(&mut eeprom, &job, &mut NoProgress).unwrap_err();
        assert!(matches!(
            err,
            WriteError::Transport {
                chunk: 0,
                address: 0,
                source: Error::Nack
            }
        ));
    }

    #[test]
    fn test_run_job_unsupported_baudrate() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = firmware(&dir, 16);

        let job = WriteJobBuilder::new()
            .target_address(0x50)
            .firmware(&path)
            .baudrate(3_400_000)
            .build()
            .unwrap();

        let mut eeprom = DummyEeprom::new_default();
        let err = run_job(&mut eeprom, &job, &mut NoProgress).unwrap_err();
        assert!(matches!(
            err,
            WriteError::Configuration(ConfigError::UnsupportedBaudrate(3_400_000))
        ));
        assert!(eeprom.transactions().is_empty());
    }
}
