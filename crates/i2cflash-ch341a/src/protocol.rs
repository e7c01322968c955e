//! CH341A USB protocol constants and I2C stream packet builders
//!
//! The CH341A takes 32-byte command packets on its bulk OUT endpoint. I2C
//! traffic goes through the `I2C_STREAM` command, whose sub-commands drive
//! the bus one primitive at a time (START, STOP, write N bytes, read N
//! bytes). Bytes read from the bus are returned on the bulk IN endpoint.

/// USB vendor ID (WCH)
pub const CH341A_USB_VENDOR: u16 = 0x1A86;
/// USB product ID (CH341 in serial/parallel mode)
pub const CH341A_USB_PRODUCT: u16 = 0x5512;

/// Bulk OUT endpoint
pub const WRITE_EP: u8 = 0x02;
/// Bulk IN endpoint
pub const READ_EP: u8 = 0x82;

/// Maximum length of one command packet
pub const CH341_PACKET_LENGTH: usize = 0x20;

// Commands
pub const CH341A_CMD_I2C_STREAM: u8 = 0xAA;
pub const CH341A_CMD_UIO_STREAM: u8 = 0xAB;

// I2C stream sub-commands
pub const CH341A_CMD_I2C_STM_STA: u8 = 0x74;
pub const CH341A_CMD_I2C_STM_STO: u8 = 0x75;
/// Write bytes; low 5 bits hold the count, which follows inline
pub const CH341A_CMD_I2C_STM_OUT: u8 = 0x80;
/// Read bytes with ACK; low 5 bits hold the count (0 = one byte with NACK)
pub const CH341A_CMD_I2C_STM_IN: u8 = 0xC0;
/// Set stream mode; low 2 bits select the bus clock
pub const CH341A_CMD_I2C_STM_SET: u8 = 0x60;
pub const CH341A_CMD_I2C_STM_END: u8 = 0x00;

// UIO stream sub-commands
pub const CH341A_CMD_UIO_STM_DIR: u8 = 0x40;
pub const CH341A_CMD_UIO_STM_END: u8 = 0x20;

// Stream speed settings
pub const CH341A_STM_I2C_20K: u8 = 0x00;
pub const CH341A_STM_I2C_100K: u8 = 0x01;
pub const CH341A_STM_I2C_400K: u8 = 0x02;
pub const CH341A_STM_I2C_750K: u8 = 0x03;

/// All D0-D7 pins as inputs
pub const UIO_DIR_INPUT: u8 = 0x00;

/// Bit set in the ACK status byte when the target did not acknowledge
pub const I2C_NACK_BIT: u8 = 0x80;

/// Payload bytes that fit in one I2C write packet
///
/// A packet holds `I2C_STREAM`, optional `STA`, `OUT|n`, n bytes, optional
/// `STO`, and `END`.
pub const I2C_WRITE_CHUNK: usize = CH341_PACKET_LENGTH - 5;

/// Largest count one `IN` sub-command can request
pub const I2C_READ_CHUNK: usize = 0x1F;

/// Largest write the adapter accepts in one job transaction
pub const MAX_WRITE_LEN: usize = 4 * 1024;

/// Map a bus clock in Hz to the stream speed setting
pub fn speed_bits(baudrate: u32) -> Option<u8> {
    match baudrate {
        20_000 => Some(CH341A_STM_I2C_20K),
        100_000 => Some(CH341A_STM_I2C_100K),
        400_000 => Some(CH341A_STM_I2C_400K),
        750_000 => Some(CH341A_STM_I2C_750K),
        _ => None,
    }
}

/// Packet setting the I2C stream speed
pub fn config_packet(speed: u8) -> Vec<u8> {
    vec![
        CH341A_CMD_I2C_STREAM,
        CH341A_CMD_I2C_STM_SET | (speed & 0x3),
        CH341A_CMD_I2C_STM_END,
    ]
}

/// Packet probing whether `addr` acknowledges
///
/// The device answers with one status byte; `I2C_NACK_BIT` set means NACK.
pub fn probe_packet(addr: u8) -> Vec<u8> {
    vec![
        CH341A_CMD_I2C_STREAM,
        CH341A_CMD_I2C_STM_STA,
        CH341A_CMD_I2C_STM_OUT, // count 0: write one byte, return ACK status
        addr << 1,
        CH341A_CMD_I2C_STM_STO,
        CH341A_CMD_I2C_STM_END,
    ]
}

/// Build the packets for one complete write transaction
///
/// `bytes` is everything after START: the address byte with the W bit, the
/// internal address, then the payload. START goes in the first packet and
/// STOP in the last.
pub fn write_packets(bytes: &[u8]) -> Vec<Vec<u8>> {
    let count = bytes.len().div_ceil(I2C_WRITE_CHUNK).max(1);

    bytes
        .chunks(I2C_WRITE_CHUNK)
        .enumerate()
        .map(|(i, piece)| {
            let mut pkt = Vec::with_capacity(CH341_PACKET_LENGTH);
            pkt.push(CH341A_CMD_I2C_STREAM);
            if i == 0 {
                pkt.push(CH341A_CMD_I2C_STM_STA);
            }
            pkt.push(CH341A_CMD_I2C_STM_OUT | piece.len() as u8);
            pkt.extend_from_slice(piece);
            if i == count - 1 {
                pkt.push(CH341A_CMD_I2C_STM_STO);
            }
            pkt.push(CH341A_CMD_I2C_STM_END);
            pkt
        })
        .collect()
}

/// Build the packet reading `len` bytes after a (repeated) START
///
/// `len` must be between 1 and `I2C_READ_CHUNK`. All bytes but the last are
/// ACKed; the last is NACKed and followed by STOP.
pub fn read_packet(read_addr: u8, len: usize) -> Vec<u8> {
    let mut pkt = vec![
        CH341A_CMD_I2C_STREAM,
        CH341A_CMD_I2C_STM_STA,
        CH341A_CMD_I2C_STM_OUT | 1,
        read_addr,
    ];
    if len > 1 {
        pkt.push(CH341A_CMD_I2C_STM_IN | (len - 1) as u8);
    }
    pkt.push(CH341A_CMD_I2C_STM_IN);
    pkt.push(CH341A_CMD_I2C_STM_STO);
    pkt.push(CH341A_CMD_I2C_STM_END);
    pkt
}

/// Packet sending the internal address of a random read, without STOP
pub fn set_address_packet(write_addr: u8, header: &[u8]) -> Vec<u8> {
    let mut pkt = vec![
        CH341A_CMD_I2C_STREAM,
        CH341A_CMD_I2C_STM_STA,
        CH341A_CMD_I2C_STM_OUT | (header.len() + 1) as u8,
        write_addr,
    ];
    pkt.extend_from_slice(header);
    pkt.push(CH341A_CMD_I2C_STM_END);
    pkt
}

/// Packet releasing the D0-D7 pins
pub fn release_pins_packet() -> Vec<u8> {
    vec![
        CH341A_CMD_UIO_STREAM,
        CH341A_CMD_UIO_STM_DIR | UIO_DIR_INPUT,
        CH341A_CMD_UIO_STM_END,
    ]
}
