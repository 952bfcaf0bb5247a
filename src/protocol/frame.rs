//! CAN frame and adapter fault value types.
//!
//! Payloads are stored inline (`[u8; 8]` plus length), so frames are
//! `Copy` and never touch the heap.
//!
//! # Example
//!
//! ```
//! use canlink::CanFrame;
//!
//! let frame = CanFrame::new_extended(0x00102030, &[0x11, 0x22]).unwrap();
//! assert!(frame.is_extended());
//! assert_eq!(frame.dlc(), 2);
//! assert_eq!(frame.data(), &[0x11, 0x22]);
//! ```

use std::fmt;

use thiserror::Error;

use crate::error::{CanlinkError, Result};

/// Maximum payload length of a classic CAN frame.
pub const MAX_PAYLOAD: usize = 8;

/// A CAN message crossing the bridge in either direction.
///
/// The identifier is carried as a raw `u32`. Standard-address frames use
/// the low 11 bits, extended-address frames the low 29; excess bits are
/// truncated to the wire field width on encode, matching the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    id: u32,
    extended: bool,
    data: [u8; MAX_PAYLOAD],
    len: u8,
}

impl CanFrame {
    /// Create a standard-address (11-bit) frame.
    ///
    /// # Errors
    ///
    /// Returns [`CanlinkError::PayloadTooLong`] if `data` exceeds 8 bytes.
    pub fn new(id: u32, data: &[u8]) -> Result<Self> {
        Self::build(id, false, data)
    }

    /// Create an extended-address (29-bit) frame.
    ///
    /// # Errors
    ///
    /// Returns [`CanlinkError::PayloadTooLong`] if `data` exceeds 8 bytes.
    pub fn new_extended(id: u32, data: &[u8]) -> Result<Self> {
        Self::build(id, true, data)
    }

    fn build(id: u32, extended: bool, data: &[u8]) -> Result<Self> {
        if data.len() > MAX_PAYLOAD {
            return Err(CanlinkError::PayloadTooLong { len: data.len() });
        }
        Ok(Self::from_wire(id, extended, data))
    }

    /// Reconstruct a frame from scanner-validated wire parts.
    ///
    /// The scanner guarantees `data` fits before calling.
    pub(crate) fn from_wire(id: u32, extended: bool, data: &[u8]) -> Self {
        debug_assert!(data.len() <= MAX_PAYLOAD);
        let mut payload = [0u8; MAX_PAYLOAD];
        payload[..data.len()].copy_from_slice(data);
        Self {
            id,
            extended,
            data: payload,
            len: data.len() as u8,
        }
    }

    /// Arbitration identifier.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Whether the identifier uses the 29-bit extended addressing space.
    #[inline]
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Payload bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// Payload byte count (DLC), 0-8.
    #[inline]
    pub fn dlc(&self) -> usize {
        self.len as usize
    }
}

impl fmt::Display for CanFrame {
    /// candump-style rendering: `1A5 [2] 11 22`, eight hex digits for
    /// extended identifiers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extended {
            write!(f, "{:08X}", self.id)?;
        } else {
            write!(f, "{:03X}", self.id)?;
        }
        write!(f, " [{}]", self.len)?;
        for byte in self.data() {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

/// Asynchronous fault reported by the adapter in an error frame.
///
/// Never returned from `receive`; delivered only through the hook
/// registered with [`CanBridge::on_error`].
///
/// [`CanBridge::on_error`]: crate::session::CanBridge::on_error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Fault the adapter could not classify.
    #[error("unknown adapter fault")]
    Unknown,

    /// Overcurrent detected on the bus transceiver.
    #[error("bus overcurrent")]
    BusOvercurrent,

    /// Overvoltage detected on the bus lines.
    #[error("bus overvoltage")]
    BusOvervoltage,

    /// A queued frame could not be transmitted onto the bus.
    #[error("bus transmit failure")]
    BusTransmitFailure,

    /// The adapter's transmit queue is full; the frame was dropped.
    #[error("transmit buffer full")]
    TransmitBufferFull,
}
