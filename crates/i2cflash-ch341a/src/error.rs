//! Error types for CH341A programmer

use std::fmt;

/// Result type for CH341A operations
pub type Result<T> = std::result::Result<T, Ch341aError>;

/// Errors that can occur when using the CH341A programmer
#[derive(Debug)]
pub enum Ch341aError {
    /// Device not found
    DeviceNotFound,
    /// Failed to open device
    OpenFailed(String),
    /// Failed to claim interface
    ClaimFailed(String),
    /// USB transfer failed
    TransferFailed(String),
    /// Timeout during operation
    Timeout,
    /// Target did not acknowledge
    Nack(u8),
}

impl fmt::Display for Ch341aError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ch341aError::DeviceNotFound => {
                write!(f, "CH341A device not found (VID:1a86 PID:5512)")
            }
            Ch341aError::OpenFailed(msg) => write!(f, "Failed to open CH341A: {}", msg),
            Ch341aError::ClaimFailed(msg) => write!(f, "Failed to claim interface: {}", msg),
            Ch341aError::TransferFailed(msg) => write!(f, "USB transfer failed: {}", msg),
            Ch341aError::Timeout => write!(f, "Timeout during USB transfer"),
            Ch341aError::Nack(addr) => write!(f, "No ACK from device at 0x{:02X}", addr),
        }
    }
}

impl std::error::Error for Ch341aError {}

impl From<Ch341aError> for i2cflash_core::error::Error {
    fn from(e: Ch341aError) -> Self {
        use i2cflash_core::error::Error;
        match e {
            Ch341aError::Nack(_) => Error::Nack,
            Ch341aError::Timeout => Error::Timeout,
            Ch341aError::DeviceNotFound => Error::ProgrammerNotReady,
            Ch341aError::OpenFailed(_) | Ch341aError::ClaimFailed(_) => Error::ProgrammerError,
            Ch341aError::TransferFailed(_) => Error::TransferFailed,
        }
    }
}
