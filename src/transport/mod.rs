//! Transport module - the byte-stream link under the session.
//!
//! Provides:
//! - the [`Transport`] trait, the exact I/O surface the session consumes
//! - [`SerialTransport`], the serial port implementation
//! - adapter discovery by USB identity

use std::time::Duration;

use crate::error::Result;

mod serial;

pub use serial::{discover, SerialTransport, DEFAULT_LINE_RATE, USB_PID, USB_VID};

/// Duplex byte-stream link between the host and the bridge adapter.
///
/// Three primitives, nothing more: one bounded wait for input, a
/// non-blocking count of pending bytes, and a full write. Sessions are
/// generic over this trait so tests can substitute scripted transports.
pub trait Transport {
    /// Wait up to `timeout` for input and read what arrived into `buf`.
    ///
    /// Returns the number of bytes read. `Ok(0)` means the wait expired
    /// with nothing to deliver; a zero timeout polls without blocking.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Number of bytes readable right now without blocking.
    fn bytes_to_read(&mut self) -> Result<usize>;

    /// Write the whole buffer to the link.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
}
