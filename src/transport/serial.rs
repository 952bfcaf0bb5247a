//! Serial port transport.
//!
//! The bridge adapter enumerates as a CDC-ACM virtual serial port. Line
//! settings are cosmetic on such devices, but the serial layer requires
//! them, so opening applies a fixed default rate.
//!
//! # Example
//!
//! ```no_run
//! use canlink::transport::{discover, SerialTransport};
//!
//! let ports = discover()?;
//! let transport = SerialTransport::open(&ports[0])?;
//! # Ok::<(), canlink::CanlinkError>(())
//! ```

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};

use super::Transport;
use crate::error::Result;

/// USB vendor id of the bridge adapter (STM32 CDC-ACM).
pub const USB_VID: u16 = 0x0483;

/// USB product id of the bridge adapter.
pub const USB_PID: u16 = 0x5740;

/// Line rate handed to the serial layer; ignored by CDC-ACM devices.
pub const DEFAULT_LINE_RATE: u32 = 115_200;

/// Serial link to the adapter.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open the serial device at `path`.
    ///
    /// # Errors
    ///
    /// Returns the serial layer's error if the device cannot be opened
    /// (missing, busy, or permission denied).
    pub fn open(path: &str) -> Result<Self> {
        let port = serialport::new(path, DEFAULT_LINE_RATE)
            .timeout(Duration::from_millis(100))
            .open()?;
        Ok(Self { port })
    }

    /// Wrap an already opened serial port.
    ///
    /// Useful when the caller needs non-default line settings.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        self.port.set_timeout(timeout)?;
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn bytes_to_read(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.port.write_all(buf)?;
        // CDC-ACM buffers writes; flush so short frames leave immediately.
        self.port.flush()?;
        Ok(())
    }
}

/// List serial devices whose USB identity matches the bridge adapter.
///
/// Returns the platform port names (`/dev/ttyACM0`, `COM3`, ...) ready to
/// hand to [`SerialTransport::open`]. An empty vector means no adapter is
/// plugged in.
pub fn discover() -> Result<Vec<String>> {
    let ports = serialport::available_ports()?;

    Ok(ports
        .into_iter()
        .filter(|port| {
            matches!(
                &port.port_type,
                SerialPortType::UsbPort(usb) if usb.vid == USB_VID && usb.pid == USB_PID
            )
        })
        .map(|port| port.port_name)
        .collect())
}
