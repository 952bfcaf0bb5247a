//! Resynchronizing frame scanner.
//!
//! Accumulates raw bytes from the serial link and extracts complete frames.
//! The stream carries no out-of-band message boundaries: any read may
//! deliver a fragment of a frame, several frames back to back, or line
//! noise. The scanner holds one growable buffer and classifies from the
//! front:
//! - bytes ahead of a start marker are skipped as line noise
//! - a frame whose stop marker does not match is dropped as a whole span
//! - error notifications become [`Inbound::Error`] units, data frames
//!   become [`Inbound::Frame`] units
//!
//! Corrupt-frame recovery skips the computed frame length rather than one
//! byte at a time. When the length field itself was corrupted this can land
//! inside the next frame; the following pass then resynchronizes at the
//! next start marker. Known limitation, traded for fast recovery in the
//! common case of a flipped marker byte.
//!
//! # Example
//!
//! ```
//! use canlink::{FrameScanner, Inbound};
//!
//! let mut scanner = FrameScanner::new();
//!
//! // Noise ahead of the frame is skipped transparently.
//! scanner.push(&[0x42, 0xAA, 0xC2, 0xA5, 0x01, 0x11, 0x22, 0x55]);
//!
//! match scanner.try_extract() {
//!     Some(Inbound::Frame(frame)) => assert_eq!(frame.id(), 0x1A5),
//!     other => panic!("expected a data frame, got {:?}", other),
//! }
//! ```

use bytes::BytesMut;

use super::frame::{CanFrame, DeviceError, MAX_PAYLOAD};
use super::wire;

/// Initial receive buffer capacity. Frames are at most 15 bytes, so this
/// comfortably holds a burst between two polls.
const BUFFER_CAPACITY: usize = 512;

/// Bytes needed before the type byte can be dispatched: marker, type and
/// the two shortest trailing fields (an error frame is exactly four bytes).
const CLASSIFY_LEN: usize = 4;

/// One classified unit extracted from the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// A CAN message received off the bus.
    Frame(CanFrame),
    /// An asynchronous fault raised by the adapter.
    Error(DeviceError),
}

/// Incremental parser over the bytes read from the transport.
///
/// Re-entrant: partial frames stay buffered across calls, so the scanner
/// can be fed as bytes trickle in without losing progress. The buffer is
/// the only state; it grows at the back and is consumed from the front.
pub struct FrameScanner {
    buffer: BytesMut,
}

impl FrameScanner {
    /// Create a scanner with an empty buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(BUFFER_CAPACITY),
        }
    }

    /// Append newly read bytes to the back of the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to pull one classified unit off the front of the buffer.
    ///
    /// Noise spans and corrupt frames are consumed along the way without
    /// producing a unit. Returns `None` once the buffered bytes cannot make
    /// progress until more input arrives.
    pub fn try_extract(&mut self) -> Option<Inbound> {
        loop {
            let (consumed, unit) = scan_front(&self.buffer);
            if consumed == 0 {
                return None;
            }
            let _ = self.buffer.split_to(consumed);
            if unit.is_some() {
                return unit;
            }
        }
    }

    /// Extract every unit that is currently decodable.
    pub fn drain(&mut self) -> Vec<Inbound> {
        let mut units = Vec::new();
        while let Some(unit) = self.try_extract() {
            units.push(unit);
        }
        units
    }

    /// Number of buffered bytes not yet consumed into a unit.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop all buffered bytes, including any partial frame.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// One classification step over the front of `buf`.
///
/// Returns how many bytes to discard from the front and the unit those
/// bytes decoded to, if any. A discard of zero always means "wait for more
/// bytes"; the caller applies the discard and loops.
fn scan_front(buf: &[u8]) -> (usize, Option<Inbound>) {
    if buf.is_empty() {
        return (0, None);
    }

    // Resynchronize: everything ahead of a start marker is line noise.
    // With no marker buffered at all, wait instead of guessing.
    if buf[0] != wire::START_MARKER {
        return match buf.iter().position(|&b| b == wire::START_MARKER) {
            Some(k) => {
                tracing::trace!("Resync: skipping {} bytes of line noise", k);
                (k, None)
            }
            None => (0, None),
        };
    }

    if buf.len() < CLASSIFY_LEN {
        return (0, None);
    }

    let header = buf[1];

    if wire::is_data_header(header) {
        // A declared length above 8 cannot come from the encoder; treat
        // the marker/type pair as unrecognized and resynchronize after it.
        if wire::header_dlc(header) > MAX_PAYLOAD {
            tracing::debug!("Data header {:#04X} declares impossible length", header);
            return (2, None);
        }

        let total = wire::data_frame_len(header);
        if buf.len() < total {
            return (0, None);
        }
        if buf[total - 1] != wire::STOP_MARKER {
            tracing::debug!("Corrupt data frame, skipping {} byte span", total);
            return (total, None);
        }
        return (total, Some(Inbound::Frame(wire::decode_frame(&buf[..total]))));
    }

    if header == wire::ERROR_TYPE {
        if buf[wire::ERROR_FRAME_LEN - 1] != wire::STOP_MARKER {
            tracing::debug!("Corrupt error frame, skipping");
            return (wire::ERROR_FRAME_LEN, None);
        }
        return match wire::decode_error(buf[2]) {
            Some(error) => (wire::ERROR_FRAME_LEN, Some(Inbound::Error(error))),
            None => {
                tracing::debug!("Unrecognized error code {:#04X}", buf[2]);
                (wire::ERROR_FRAME_LEN, None)
            }
        };
    }

    // Unknown type byte: drop the marker/type pair and let the next pass
    // resynchronize on the remainder.
    tracing::debug!("Unrecognized frame type {:#04X}", header);
    (2, None)
}
