//! Error types for Linux i2c-dev operations

use thiserror::Error;

/// Linux I2C specific errors
#[derive(Debug, Error)]
pub enum LinuxI2cError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I2C_RDWR ioctl failed
    #[error("I2C transfer to 0x{addr:02X} failed: {source}")]
    TransferFailed {
        addr: u8,
        #[source]
        source: nix::Error,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for Linux I2C operations
pub type Result<T> = std::result::Result<T, LinuxI2cError>;

impl From<LinuxI2cError> for i2cflash_core::error::Error {
    fn from(e: LinuxI2cError) -> Self {
        use i2cflash_core::error::Error;
        use nix::errno::Errno;

        match e {
            LinuxI2cError::TransferFailed { source, .. } => match source {
                // No ACK: EREMOTEIO from most adapters, ENXIO from some
                Errno::EREMOTEIO | Errno::ENXIO => Error::Nack,
                Errno::ETIMEDOUT => Error::Timeout,
                Errno::EAGAIN => Error::ArbitrationLost,
                Errno::EPROTO => Error::BusError,
                _ => Error::TransferFailed,
            },
            LinuxI2cError::OpenFailed { .. } => Error::ProgrammerNotReady,
            LinuxI2cError::InvalidParameter(_) => Error::ProgrammerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use i2cflash_core::error::Error;
    use nix::errno::Errno;

    fn map(errno: Errno) -> Error {
        LinuxI2cError::TransferFailed {
            addr: 0x50,
            source: errno,
        }
        .into()
    }

    #[test]
    fn test_errno_mapping() {
        assert_eq!(map(Errno::EREMOTEIO), Error::Nack);
        assert_eq!(map(Errno::ENXIO), Error::Nack);
        assert_eq!(map(Errno::ETIMEDOUT), Error::Timeout);
        assert_eq!(map(Errno::EAGAIN), Error::ArbitrationLost);
        assert_eq!(map(Errno::EIO), Error::TransferFailed);
    }
}
