//! Protocol module - wire format, frame scanning, and frame types.
//!
//! This module implements the binary protocol of the serial link:
//! - marker-delimited wire encoding/decoding
//! - resynchronizing scanner for accumulating partial reads
//! - CAN frame and adapter fault value types

mod frame;
mod scanner;
mod wire;

pub use frame::{CanFrame, DeviceError, MAX_PAYLOAD};
pub use scanner::{FrameScanner, Inbound};
pub use wire::{
    encode_config, encode_frame, flags, CONFIG_FRAME_LEN, CONFIG_TYPE, DATA_TYPE_BITS, DLC_MASK,
    ERROR_FRAME_LEN, ERROR_TYPE, EXTENDED_FLAG, MAX_FRAME_LEN, START_MARKER, STOP_MARKER,
};
