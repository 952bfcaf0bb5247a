//! Error types for canlink.

use thiserror::Error;

/// Main error type for all canlink operations.
///
/// Noisy-line conditions (corrupt frames, unknown type bytes, malformed
/// error codes) are deliberately absent: the scanner resynchronizes past
/// them without surfacing an error, and adapter faults reported by the
/// device travel through the [`on_error`] hook instead of this type.
///
/// [`on_error`]: crate::session::CanBridge::on_error
#[derive(Debug, Error)]
pub enum CanlinkError {
    /// I/O error while reading from or writing to the serial link.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port error (open, enumeration, timeout configuration).
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Frame payload exceeds the 8-byte CAN limit.
    #[error("payload too long: {len} bytes (max 8)")]
    PayloadTooLong {
        /// Length the caller attempted to use.
        len: usize,
    },
}

/// Result type alias using CanlinkError.
pub type Result<T> = std::result::Result<T, CanlinkError>;
