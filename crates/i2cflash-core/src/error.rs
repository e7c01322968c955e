//! Error types for i2cflash-core
//!
//! Two layers live here:
//! - [`Error`] is the small, `Copy` transport error that `I2cMaster`
//!   implementations return for a single bus transaction.
//! - [`WriteError`] is the job-level taxonomy returned by the write
//!   operation. It wraps transport errors together with where they happened.

use core::fmt;
use std::path::PathBuf;

/// Bus-level error returned by a programmer for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bus errors
    /// Target did not acknowledge its address or a data byte
    Nack,
    /// Transaction did not complete in time
    Timeout,
    /// Bus error (misplaced START/STOP, stuck line)
    BusError,
    /// Lost arbitration to another bus master
    ArbitrationLost,

    // Programmer errors
    /// USB or kernel transfer failed
    TransferFailed,
    /// Requested bus speed is not supported by the programmer
    UnsupportedSpeed,
    /// Programmer cannot perform read transactions
    ReadNotSupported,
    /// Programmer is not ready (disconnected or not configured)
    ProgrammerNotReady,
    /// General programmer error
    ProgrammerError,

    // Address errors
    /// Internal address is beyond the memory size
    AddressOutOfBounds,
    /// Payload is larger than the programmer can send in one transaction
    PayloadTooLarge,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "target did not acknowledge (NACK)"),
            Self::Timeout => write!(f, "I2C transaction timed out"),
            Self::BusError => write!(f, "I2C bus error"),
            Self::ArbitrationLost => write!(f, "I2C arbitration lost"),
            Self::TransferFailed => write!(f, "transfer to programmer failed"),
            Self::UnsupportedSpeed => write!(f, "bus speed not supported by programmer"),
            Self::ReadNotSupported => write!(f, "programmer does not support reads"),
            Self::ProgrammerNotReady => write!(f, "programmer not ready"),
            Self::ProgrammerError => write!(f, "programmer error"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::PayloadTooLarge => write!(f, "payload too large for a single transaction"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

/// Invalid or out-of-range job option, detected before any transaction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Required option was not supplied
    #[error("missing required option: {0}")]
    Missing(&'static str),

    /// I2C bus id outside 0..=1
    #[error("invalid I2C bus {0} (expected 0 or 1)")]
    InvalidBus(u8),

    /// Target address does not fit in 7 bits
    #[error("invalid I2C target address 0x{0:X} (7-bit addresses only)")]
    InvalidTargetAddress(u32),

    /// Internal address width outside 1..=4
    #[error("invalid internal address length {0} (expected 1-4 bytes)")]
    InvalidAddressWidth(u8),

    /// Chunk size of zero
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    /// Chunk size above what the programmer sends in one transaction
    #[error("chunk size {chunk_size} exceeds programmer limit of {max} bytes")]
    ChunkTooLarge {
        /// Requested chunk size
        chunk_size: usize,
        /// Programmer limit
        max: usize,
    },

    /// Both a start address and a legacy start chunk were given
    #[error("start address and start chunk are mutually exclusive")]
    ConflictingStart,

    /// Image does not fit in the space reachable with the address width
    #[error(
        "image ends at 0x{end:X}, beyond the {width}-byte internal address space (0x{limit:X})"
    )]
    ImageExceedsAddressSpace {
        /// First address after the image
        end: u64,
        /// Internal address width in bytes
        width: u8,
        /// Size of the addressable space
        limit: u64,
    },

    /// Programmer cannot run at the requested clock
    #[error("unsupported I2C baudrate {0} Hz")]
    UnsupportedBaudrate(u32),

    /// Read-back verification requested on a write-only programmer
    #[error("verification requested but programmer cannot read")]
    VerifyUnsupported,

    /// Programmer name not known to the registry
    #[error("unknown programmer: {0}")]
    UnknownProgrammer(String),

    /// Malformed programmer parameter or option value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Job file could not be parsed
    #[error("invalid job file: {0}")]
    JobFile(String),
}

/// Error returned by the write job
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// No programmer hardware was found; nothing was written
    #[error("programmer not available: {0}")]
    ConnectionUnavailable(String),

    /// Firmware file missing, unreadable, or failed mid-read
    #[error("cannot read firmware {}: {source}", path.display())]
    FileAccess {
        /// Firmware path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Bus transaction failed; chunks before `chunk` are on the chip
    #[error("transaction {chunk} at address 0x{address:X} failed: {source}")]
    Transport {
        /// Zero-based index of the failing chunk
        chunk: usize,
        /// Internal address of the failing chunk
        address: u32,
        /// Transport error
        #[source]
        source: Error,
    },

    /// Invalid option, detected before any transaction
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Read-back data differs from the firmware image
    #[error("verify failed at 0x{address:X}: expected 0x{expected:02X}, found 0x{found:02X}")]
    VerifyMismatch {
        /// Address of the first differing byte
        address: u32,
        /// Byte from the image
        expected: u8,
        /// Byte read from the chip
        found: u8,
    },
}

impl WriteError {
    /// Wrap an I/O error with the firmware path it came from
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_names_location() {
        let err = WriteError::Transport {
            chunk: 1,
            address: 0x80,
            source: Error::Nack,
        };
        assert_eq!(
            err.to_string(),
            "transaction 1 at address 0x80 failed: target did not acknowledge (NACK)"
        );
    }

    #[test]
    fn config_error_is_transparent() {
        let err = WriteError::from(ConfigError::UnsupportedBaudrate(1_000_000));
        assert_eq!(err.to_string(), "unsupported I2C baudrate 1000000 Hz");
    }
}
