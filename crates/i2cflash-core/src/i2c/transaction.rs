//! I2C memory transaction structures

use super::{AddressWidth, TargetAddress};

/// A single addressed write
///
/// Designed to avoid allocation - the payload is borrowed from the caller's
/// chunk buffer. On the wire this is:
/// `START, target|W, internal address (big-endian), payload..., STOP`.
#[derive(Debug, Clone, Copy)]
pub struct I2cWrite<'a> {
    /// Target chip bus address
    pub target: TargetAddress,
    /// Internal memory address of the first payload byte
    pub address: u32,
    /// Encoding width of `address`
    pub address_width: AddressWidth,
    /// Bytes to program
    pub data: &'a [u8],
}

impl<'a> I2cWrite<'a> {
    /// Create a write transaction
    pub fn new(
        target: TargetAddress,
        address: u32,
        address_width: AddressWidth,
        data: &'a [u8],
    ) -> Self {
        Self {
            target,
            address,
            address_width,
            data,
        }
    }

    /// Number of internal address bytes preceding the payload
    pub fn header_len(&self) -> usize {
        self.address_width.bytes() as usize
    }

    /// Encode the internal address into `buf`
    pub fn encode_header(&self, buf: &mut [u8]) {
        self.address_width.encode(self.address, buf);
    }

    /// Internal address followed by the payload, as sent after the address byte
    pub fn to_bytes(&self) -> Vec<u8> {
        let header_len = self.header_len();
        let mut out = vec![0u8; header_len + self.data.len()];
        self.encode_header(&mut out);
        out[header_len..].copy_from_slice(self.data);
        out
    }
}

/// A single random read: write the internal address, repeated START, read
pub struct I2cRead<'a> {
    /// Target chip bus address
    pub target: TargetAddress,
    /// Internal memory address to read from
    pub address: u32,
    /// Encoding width of `address`
    pub address_width: AddressWidth,
    /// Buffer to read into
    pub buf: &'a mut [u8],
}

impl<'a> I2cRead<'a> {
    /// Create a read transaction
    pub fn new(
        target: TargetAddress,
        address: u32,
        address_width: AddressWidth,
        buf: &'a mut [u8],
    ) -> Self {
        Self {
            target,
            address,
            address_width,
            buf,
        }
    }

    /// Number of internal address bytes
    pub fn header_len(&self) -> usize {
        self.address_width.bytes() as usize
    }

    /// Encode the internal address into `buf`
    pub fn encode_header(&self, buf: &mut [u8]) {
        self.address_width.encode(self.address, buf);
    }
}

/// Internal address of each `piece`-byte slice of a `len`-byte read
///
/// Each address is derived from its offset, so a read that ends exactly at
/// the top of a four-byte address space never computes an address past it.
pub fn piece_addresses(address: u32, len: usize, piece: usize) -> impl Iterator<Item = u32> {
    (0..len)
        .step_by(piece.max(1))
        .map(move |offset| address.wrapping_add(offset as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_to_bytes() {
        let target = TargetAddress::new(0x50).unwrap();
        let xfer = I2cWrite::new(target, 0x0100, AddressWidth::TwoByte, &[0xDE, 0xAD]);
        assert_eq!(xfer.header_len(), 2);
        assert_eq!(xfer.to_bytes(), vec![0x01, 0x00, 0xDE, 0xAD]);
    }

    #[test]
    fn test_read_header() {
        let target = TargetAddress::new(0x50).unwrap();
        let mut buf = [0u8; 4];
        let xfer = I2cRead::new(target, 0x01_0000, AddressWidth::ThreeByte, &mut buf);
        let mut header = [0u8; 3];
        xfer.encode_header(&mut header);
        assert_eq!(header, [0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_piece_addresses() {
        let addrs: Vec<u32> = piece_addresses(0x100, 70, 31).collect();
        assert_eq!(addrs, vec![0x100, 0x11F, 0x13E]);
        assert_eq!(piece_addresses(0, 0, 31).count(), 0);
    }

    #[test]
    fn test_piece_addresses_at_top_of_address_space() {
        // Last 40 bytes below 2^32, read in 31-byte pieces
        let addrs: Vec<u32> = piece_addresses(u32::MAX - 39, 40, 31).collect();
        assert_eq!(addrs, vec![0xFFFF_FFD8, 0xFFFF_FFF7]);
    }
}
