//! Target and internal address types

use crate::error::ConfigError;
use core::fmt;

/// 7-bit I2C target (slave) address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetAddress(u8);

impl TargetAddress {
    /// Validate a 7-bit address
    pub fn new(addr: u32) -> Result<Self, ConfigError> {
        if addr > 0x7F {
            return Err(ConfigError::InvalidTargetAddress(addr));
        }
        let addr = addr as u8;
        if addr <= 0x07 || addr >= 0x78 {
            log::warn!("I2C address 0x{:02X} is in a reserved range", addr);
        }
        Ok(Self(addr))
    }

    /// The 7-bit address value
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Address byte for a write (R/W bit clear)
    pub const fn write_byte(&self) -> u8 {
        self.0 << 1
    }

    /// Address byte for a read (R/W bit set)
    pub const fn read_byte(&self) -> u8 {
        (self.0 << 1) | 1
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Width of the internal memory address sent at the start of a transaction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// 1-byte address (24C01 - 24C16)
    OneByte,
    /// 2-byte address (24C32 - 24C512)
    #[default]
    TwoByte,
    /// 3-byte address (24CM01 and larger)
    ThreeByte,
    /// 4-byte address
    FourByte,
}

impl AddressWidth {
    /// Build from a byte count
    pub fn from_bytes(bytes: u8) -> Result<Self, ConfigError> {
        match bytes {
            1 => Ok(Self::OneByte),
            2 => Ok(Self::TwoByte),
            3 => Ok(Self::ThreeByte),
            4 => Ok(Self::FourByte),
            _ => Err(ConfigError::InvalidAddressWidth(bytes)),
        }
    }

    /// Returns the number of address bytes
    pub const fn bytes(&self) -> u8 {
        match self {
            Self::OneByte => 1,
            Self::TwoByte => 2,
            Self::ThreeByte => 3,
            Self::FourByte => 4,
        }
    }

    /// Number of distinct internal addresses (256^width)
    pub const fn max_address_space(&self) -> u64 {
        1u64 << (8 * self.bytes() as u32)
    }

    /// Encode an address big-endian into the first `bytes()` bytes of `buf`
    pub fn encode(&self, address: u32, buf: &mut [u8]) {
        let be = address.to_be_bytes();
        let n = self.bytes() as usize;
        buf[..n].copy_from_slice(&be[4 - n..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_address_bytes() {
        let addr = TargetAddress::new(0x50).unwrap();
        assert_eq!(addr.write_byte(), 0xA0);
        assert_eq!(addr.read_byte(), 0xA1);
        assert_eq!(addr.to_string(), "0x50");
    }

    #[test]
    fn test_target_address_rejects_8bit() {
        assert_eq!(
            TargetAddress::new(0xA0),
            Err(ConfigError::InvalidTargetAddress(0xA0))
        );
    }

    #[test]
    fn test_encode_big_endian() {
        let mut buf = [0u8; 4];
        AddressWidth::TwoByte.encode(0x1234, &mut buf);
        assert_eq!(&buf[..2], &[0x12, 0x34]);

        AddressWidth::ThreeByte.encode(0x01_2345, &mut buf);
        assert_eq!(&buf[..3], &[0x01, 0x23, 0x45]);

        AddressWidth::OneByte.encode(0x1FF, &mut buf);
        assert_eq!(buf[0], 0xFF);
    }

    #[test]
    fn test_address_space() {
        assert_eq!(AddressWidth::OneByte.max_address_space(), 256);
        assert_eq!(AddressWidth::TwoByte.max_address_space(), 65536);
        assert_eq!(AddressWidth::FourByte.max_address_space(), 1 << 32);
        assert!(AddressWidth::from_bytes(0).is_err());
        assert!(AddressWidth::from_bytes(5).is_err());
    }
}
