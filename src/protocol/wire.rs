//! Wire format encoding and decoding.
//!
//! Three frame kinds share one serial stream, all delimited by the same
//! marker pair:
//!
//! ```text
//! Data           ┌──────┬────────┬───────────┬─────────┬──────┐
//! (5+dlc or      │ 0xAA │ header │ id        │ payload │ 0x55 │
//!  7+dlc bytes)  │      │ 1 byte │ 2/4 bytes │ 0-8 B   │      │
//!                └──────┴────────┴───────────┴─────────┴──────┘
//! Error          ┌──────┬──────┬──────┬──────┐
//! (4 bytes)      │ 0xAA │ 0x15 │ code │ 0x55 │
//!                └──────┴──────┴──────┴──────┘
//! Configuration  ┌──────┬──────┬───────┬─────────┬───────────┬─────────────┬──────┐
//! (16 bytes)     │ 0xAA │ 0x13 │ flags │ bitrate │ filter_id │ filter_mask │ 0x55 │
//!                └──────┴──────┴───────┴─────────┴───────────┴─────────────┴──────┘
//! ```
//!
//! Data header byte: bits 7-6 are `11` (the type discriminator), bit 5 is
//! the extended-address flag, bits 3-0 carry the payload length. The
//! identifier field is 2 bytes for standard frames, 4 for extended.
//!
//! All multi-byte integers are Little Endian.

use crate::config::DeviceConfig;
use crate::protocol::frame::{CanFrame, DeviceError};

/// Start-of-frame marker.
pub const START_MARKER: u8 = 0xAA;

/// End-of-frame marker.
pub const STOP_MARKER: u8 = 0x55;

/// Type discriminator bits of a data frame header (bits 7-6 set).
pub const DATA_TYPE_BITS: u8 = 0xC0;

/// Extended-address flag in a data frame header (bit 5).
pub const EXTENDED_FLAG: u8 = 0x20;

/// Payload length mask of a data frame header (bits 3-0).
pub const DLC_MASK: u8 = 0x0F;

/// Type byte of an error notification frame.
pub const ERROR_TYPE: u8 = 0x15;

/// Type byte of a configuration frame.
pub const CONFIG_TYPE: u8 = 0x13;

/// Error frames have a fixed length: marker, type, code, marker.
pub const ERROR_FRAME_LEN: usize = 4;

/// Configuration frames have a fixed length of 16 bytes.
pub const CONFIG_FRAME_LEN: usize = 16;

/// Longest possible frame on the wire: extended data frame with 8 bytes.
pub const MAX_FRAME_LEN: usize = 15;

/// Flag bits of the configuration frame.
pub mod flags {
    /// Switch the bus termination resistor on.
    pub const TERMINATOR: u8 = 0b0000_0001;
    /// Listen-only mode.
    pub const SILENT: u8 = 0b0000_0010;
    /// Report bus faults as error frames.
    pub const ERROR_REPORTING: u8 = 0b0000_0100;

    /// Reserved bits (3-7), always written as zero.
    pub const RESERVED_MASK: u8 = 0b1111_1000;

    /// Check if a specific flag is set.
    #[inline]
    pub fn has_flag(flags: u8, flag: u8) -> bool {
        flags & flag != 0
    }
}

/// Check whether a type byte carries the data frame discriminator.
#[inline]
pub(crate) fn is_data_header(byte: u8) -> bool {
    byte & DATA_TYPE_BITS == DATA_TYPE_BITS
}

/// Declared payload length of a data frame header.
#[inline]
pub(crate) fn header_dlc(byte: u8) -> usize {
    (byte & DLC_MASK) as usize
}

/// Total on-wire length of the data frame announced by `header`:
/// markers and type byte (3) plus identifier field plus payload.
#[inline]
pub(crate) fn data_frame_len(header: u8) -> usize {
    let id_len = if header & EXTENDED_FLAG != 0 { 4 } else { 2 };
    header_dlc(header) + 3 + id_len
}

/// Encode a data frame to its wire bytes.
///
/// Cannot fail: [`CanFrame`] guarantees the payload fits the header's
/// length bits. Oversized identifiers are truncated to the identifier
/// field width, matching the adapter.
///
/// # Example
///
/// ```
/// use canlink::{protocol::encode_frame, CanFrame};
///
/// let frame = CanFrame::new(0x1A5, &[0x11, 0x22]).unwrap();
/// assert_eq!(encode_frame(&frame), [0xAA, 0xC2, 0xA5, 0x01, 0x11, 0x22, 0x55]);
/// ```
pub fn encode_frame(frame: &CanFrame) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_FRAME_LEN);

    buf.push(START_MARKER);

    let mut header = DATA_TYPE_BITS | frame.dlc() as u8;
    if frame.is_extended() {
        header |= EXTENDED_FLAG;
    }
    buf.push(header);

    if frame.is_extended() {
        buf.extend_from_slice(&frame.id().to_le_bytes());
    } else {
        buf.extend_from_slice(&(frame.id() as u16).to_le_bytes());
    }

    buf.extend_from_slice(frame.data());
    buf.push(STOP_MARKER);

    buf
}

/// Encode a configuration command to its fixed 16-byte wire form.
///
/// Write-only: the adapter never echoes configuration back, so no decode
/// counterpart exists.
pub fn encode_config(config: &DeviceConfig) -> [u8; CONFIG_FRAME_LEN] {
    let mut buf = [0u8; CONFIG_FRAME_LEN];

    buf[0] = START_MARKER;
    buf[1] = CONFIG_TYPE;

    let mut flag_bits = 0u8;
    if config.terminator {
        flag_bits |= flags::TERMINATOR;
    }
    if config.silent {
        flag_bits |= flags::SILENT;
    }
    if config.error_reporting {
        flag_bits |= flags::ERROR_REPORTING;
    }
    buf[2] = flag_bits;

    buf[3..7].copy_from_slice(&config.bitrate.to_le_bytes());
    buf[7..11].copy_from_slice(&config.filter_id.to_le_bytes());
    buf[11..15].copy_from_slice(&config.filter_mask.to_le_bytes());
    buf[15] = STOP_MARKER;

    buf
}

/// Decode a data frame from its complete wire span (markers included).
///
/// The scanner validates the span first: correct length for the header,
/// stop marker in place, declared length within 8. No stop-marker check
/// happens here.
pub(crate) fn decode_frame(span: &[u8]) -> CanFrame {
    debug_assert_eq!(span[0], START_MARKER);
    debug_assert_eq!(span.len(), data_frame_len(span[1]));

    let header = span[1];
    let extended = header & EXTENDED_FLAG != 0;
    let dlc = header_dlc(header);

    let (id, payload_start) = if extended {
        (u32::from_le_bytes([span[2], span[3], span[4], span[5]]), 6)
    } else {
        (u16::from_le_bytes([span[2], span[3]]) as u32, 4)
    };

    CanFrame::from_wire(id, extended, &span[payload_start..payload_start + dlc])
}

/// Map an error frame's code byte into the closed fault set.
///
/// Codes above `0x04` are not part of the protocol; they decode to `None`
/// and the scanner drops the notification.
pub(crate) fn decode_error(code: u8) -> Option<DeviceError> {
    match code {
        0x00 => Some(DeviceError::Unknown),
        0x01 => Some(DeviceError::BusOvercurrent),
        0x02 => Some(DeviceError::BusOvervoltage),
        0x03 => Some(DeviceError::BusTransmitFailure),
        0x04 => Some(DeviceError::TransmitBufferFull),
        _ => None,
    }
}
