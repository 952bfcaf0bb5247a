//! # canlink
//!
//! Synchronous host-side SDK for serial CAN bridge adapters.
//!
//! The adapter is a USB CDC-ACM device that tunnels CAN 2.0 traffic over a
//! byte stream. This crate speaks its framing protocol: marker-delimited
//! data frames, single-byte fault notifications and a fire-and-forget
//! configuration frame.
//!
//! ## Architecture
//!
//! - **Protocol** ([`protocol`]): wire codec plus the resynchronizing
//!   [`FrameScanner`] that survives line noise and torn frames
//! - **Transport** ([`transport`]): the [`Transport`] seam and its
//!   [`SerialTransport`] production implementation
//! - **Session** ([`session`]): [`CanBridge`], the blocking send/receive
//!   surface with the error-notification hook
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use canlink::{CanBridge, CanFrame, DeviceConfig};
//!
//! fn main() -> canlink::Result<()> {
//!     let mut bridge = CanBridge::open("/dev/ttyACM0")?;
//!     bridge.configure(&DeviceConfig::new(250_000))?;
//!
//!     bridge.send(&CanFrame::new(0x1A5, &[0x11, 0x22])?)?;
//!     while let Some(frame) = bridge.receive(Some(Duration::from_millis(100)))? {
//!         println!("{}", frame);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use config::DeviceConfig;
pub use error::{CanlinkError, Result};
pub use protocol::{CanFrame, DeviceError, FrameScanner, Inbound, MAX_PAYLOAD};
pub use session::CanBridge;
pub use transport::{discover, SerialTransport, Transport};
