//! Bridge session - the synchronous send/receive surface.
//!
//! [`CanBridge`] owns the transport, the frame scanner and the optional
//! error hook. One instance drives one adapter; all waiting happens inside
//! [`receive`], bounded by the caller's timeout. No background thread is
//! ever spawned: adapter faults are delivered on the thread that calls
//! `receive`, inside that very call.
//!
//! Read cadence of [`receive`]:
//! 1. drain bytes already buffered, returning an already complete frame
//!    with no I/O at all
//! 2. otherwise one blocking read bounded by the timeout (skipped when the
//!    timeout is zero)
//! 3. a non-blocking slurp of whatever else is already pending, so one
//!    blocking wait amortizes a whole burst
//! 4. one more drain; an empty result is a normal poll outcome, not an
//!    error
//!
//! [`receive`]: CanBridge::receive
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use canlink::{CanBridge, CanFrame, DeviceConfig};
//!
//! fn main() -> canlink::Result<()> {
//!     let mut bridge = CanBridge::open("/dev/ttyACM0")?;
//!
//!     bridge
//!         .configure(&DeviceConfig::new(250_000).error_reporting(true))?
//!         .on_error(|fault| eprintln!("adapter fault: {}", fault));
//!
//!     bridge.send(&CanFrame::new(0x1A5, &[0x11, 0x22])?)?;
//!
//!     loop {
//!         if let Some(frame) = bridge.receive(Some(Duration::from_millis(100)))? {
//!             println!("{}", frame);
//!         }
//!     }
//! }
//! ```

use std::time::Duration;

use crate::config::DeviceConfig;
use crate::error::Result;
use crate::protocol::{encode_config, encode_frame, CanFrame, DeviceError, FrameScanner, Inbound};
use crate::transport::{SerialTransport, Transport};

/// Stack chunk for transport reads; holds a burst of frames per call.
const READ_CHUNK: usize = 256;

/// Bounded slice used to realize an unbounded wait as repeated reads, so
/// the serial layer never needs an infinite timeout.
const UNBOUNDED_READ_SLICE: Duration = Duration::from_millis(500);

type ErrorHook = Box<dyn FnMut(DeviceError) + Send + 'static>;

/// Session on one bridge adapter.
///
/// Generic over [`Transport`] so tests can drive it with scripted byte
/// streams; production code opens a [`SerialTransport`] via [`open`].
///
/// [`open`]: CanBridge::open
pub struct CanBridge<T: Transport> {
    transport: T,
    scanner: FrameScanner,
    error_hook: Option<ErrorHook>,
}

impl CanBridge<SerialTransport> {
    /// Open a session on the serial device at `path`.
    pub fn open(path: &str) -> Result<Self> {
        Ok(Self::new(SerialTransport::open(path)?))
    }
}

impl<T: Transport> CanBridge<T> {
    /// Create a session over an already connected transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            scanner: FrameScanner::new(),
            error_hook: None,
        }
    }

    /// Transmit one CAN frame.
    ///
    /// Encodes and writes in a single transport call. A write failure
    /// (device unplugged, port closed) propagates unchanged.
    pub fn send(&mut self, frame: &CanFrame) -> Result<()> {
        self.transport.write_all(&encode_frame(frame))
    }

    /// Apply bus parameters to the adapter.
    ///
    /// Fire-and-forget: the adapter applies settings asynchronously and
    /// sends no acknowledgement. Returns the session for chaining.
    pub fn configure(&mut self, config: &DeviceConfig) -> Result<&mut Self> {
        self.transport.write_all(&encode_config(config))?;
        Ok(self)
    }

    /// Register the error-notification sink.
    ///
    /// A single hook is active at a time; registering again replaces the
    /// previous one. The hook runs synchronously inside [`receive`], on
    /// the calling thread.
    ///
    /// [`receive`]: CanBridge::receive
    pub fn on_error<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnMut(DeviceError) + Send + 'static,
    {
        self.error_hook = Some(Box::new(hook));
        self
    }

    /// Wait for the next CAN frame.
    ///
    /// `timeout` selects the blocking behavior:
    /// - `Some(Duration::ZERO)` never blocks: a pure poll of the buffer
    ///   and whatever the transport already holds
    /// - `Some(d)` blocks up to `d` for the first byte
    /// - `None` blocks until at least one byte arrives, without bound
    ///
    /// Error notifications encountered on the way are routed to the hook
    /// and never returned. `Ok(None)` is the normal empty-poll outcome;
    /// it can also occur after a successful wait when only part of a
    /// frame has arrived so far.
    pub fn receive(&mut self, timeout: Option<Duration>) -> Result<Option<CanFrame>> {
        if let Some(frame) = self.next_frame() {
            return Ok(Some(frame));
        }

        let mut fresh = 0;
        if !matches!(timeout, Some(limit) if limit.is_zero()) {
            fresh += self.wait_for_bytes(timeout)?;
        }
        fresh += self.slurp_pending()?;

        if fresh == 0 {
            return Ok(None);
        }
        Ok(self.next_frame())
    }

    /// Bytes read from the transport but not yet consumed into a frame.
    pub fn buffered(&self) -> usize {
        self.scanner.buffered()
    }

    /// Get a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Drain the scanner until a data frame appears, routing error
    /// notifications to the hook along the way.
    fn next_frame(&mut self) -> Option<CanFrame> {
        while let Some(unit) = self.scanner.try_extract() {
            match unit {
                Inbound::Frame(frame) => return Some(frame),
                Inbound::Error(fault) => match self.error_hook.as_mut() {
                    Some(hook) => hook(fault),
                    None => tracing::warn!("Adapter fault dropped (no hook registered): {}", fault),
                },
            }
        }
        None
    }

    /// One blocking read of at least one byte, bounded by `timeout`.
    ///
    /// `None` waits without an upper bound, realized as repeated bounded
    /// reads.
    fn wait_for_bytes(&mut self, timeout: Option<Duration>) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        match timeout {
            Some(limit) => {
                let n = self.transport.read(&mut chunk, limit)?;
                if n > 0 {
                    self.scanner.push(&chunk[..n]);
                }
                Ok(n)
            }
            None => loop {
                let n = self.transport.read(&mut chunk, UNBOUNDED_READ_SLICE)?;
                if n > 0 {
                    self.scanner.push(&chunk[..n]);
                    return Ok(n);
                }
            },
        }
    }

    /// Pull everything already pending at the transport, without blocking.
    fn slurp_pending(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut total = 0;
        while self.transport.bytes_to_read()? > 0 {
            let n = self.transport.read(&mut chunk, Duration::ZERO)?;
            if n == 0 {
                break;
            }
            self.scanner.push(&chunk[..n]);
            total += n;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::CanlinkError;

    /// Scripted transport: reads pop queued chunks, writes accumulate.
    struct MockTransport {
        incoming: VecDeque<Vec<u8>>,
        written: Vec<u8>,
        blocking_reads: usize,
        read_error: Option<io::ErrorKind>,
        write_error: Option<io::ErrorKind>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self {
                incoming: VecDeque::new(),
                written: Vec::new(),
                blocking_reads: 0,
                read_error: None,
                write_error: None,
            }
        }

        fn queue(&mut self, bytes: &[u8]) {
            self.incoming.push_back(bytes.to_vec());
        }
    }

    impl Transport for MockTransport {
        fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
            if let Some(kind) = self.read_error.take() {
                return Err(io::Error::from(kind).into());
            }
            if !timeout.is_zero() {
                self.blocking_reads += 1;
            }
            match self.incoming.pop_front() {
                Some(chunk) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        self.incoming.push_front(chunk[n..].to_vec());
                    }
                    Ok(n)
                }
                None => Ok(0),
            }
        }

        fn bytes_to_read(&mut self) -> Result<usize> {
            Ok(self.incoming.iter().map(Vec::len).sum())
        }

        fn write_all(&mut self, buf: &[u8]) -> Result<()> {
            if let Some(kind) = self.write_error.take() {
                return Err(io::Error::from(kind).into());
            }
            self.written.extend_from_slice(buf);
            Ok(())
        }
    }

    fn test_frame() -> CanFrame {
        CanFrame::new(0x1A5, &[0x11, 0x22]).unwrap()
    }

    #[test]
    fn test_send_writes_encoded_frame() {
        let mut bridge = CanBridge::new(MockTransport::new());
        let frame = test_frame();

        bridge.send(&frame).unwrap();

        assert_eq!(bridge.transport().written, encode_frame(&frame));
    }

    #[test]
    fn test_configure_writes_frame_and_chains() {
        let mut bridge = CanBridge::new(MockTransport::new());
        let config = DeviceConfig::new(500_000).terminator(true);
        let frame = test_frame();

        bridge.configure(&config).unwrap().send(&frame).unwrap();

        let mut expected = encode_config(&config).to_vec();
        expected.extend_from_slice(&encode_frame(&frame));
        assert_eq!(bridge.transport().written, expected);
    }

    #[test]
    fn test_receive_returns_queued_frame() {
        let mut transport = MockTransport::new();
        transport.queue(&encode_frame(&test_frame()));

        let mut bridge = CanBridge::new(transport);
        let got = bridge.receive(Some(Duration::from_millis(50))).unwrap();

        assert_eq!(got, Some(test_frame()));
    }

    #[test]
    fn test_buffered_frame_returned_without_new_read() {
        let second = CanFrame::new(0x321, &[0xAB]).unwrap();

        let mut transport = MockTransport::new();
        let mut burst = encode_frame(&test_frame());
        burst.extend_from_slice(&encode_frame(&second));
        transport.queue(&burst);

        let mut bridge = CanBridge::new(transport);

        let first = bridge.receive(Some(Duration::from_millis(50))).unwrap();
        assert_eq!(first, Some(test_frame()));
        let reads_after_first = bridge.transport().blocking_reads;

        // The second frame is already buffered; no further I/O wait.
        let got = bridge.receive(Some(Duration::from_millis(50))).unwrap();
        assert_eq!(got, Some(second));
        assert_eq!(bridge.transport().blocking_reads, reads_after_first);
    }

    #[test]
    fn test_zero_timeout_never_blocks() {
        let mut bridge = CanBridge::new(MockTransport::new());

        let got = bridge.receive(Some(Duration::ZERO)).unwrap();

        assert_eq!(got, None);
        assert_eq!(bridge.transport().blocking_reads, 0);
    }

    #[test]
    fn test_zero_timeout_still_collects_pending_bytes() {
        let mut transport = MockTransport::new();
        transport.queue(&encode_frame(&test_frame()));

        let mut bridge = CanBridge::new(transport);
        let got = bridge.receive(Some(Duration::ZERO)).unwrap();

        assert_eq!(got, Some(test_frame()));
        assert_eq!(bridge.transport().blocking_reads, 0);
    }

    #[test]
    fn test_bounded_timeout_expires_to_none() {
        let mut bridge = CanBridge::new(MockTransport::new());

        let got = bridge.receive(Some(Duration::from_millis(10))).unwrap();

        assert_eq!(got, None);
        assert_eq!(bridge.transport().blocking_reads, 1);
    }

    #[test]
    fn test_unbounded_receive_returns_on_first_data() {
        let mut transport = MockTransport::new();
        transport.queue(&encode_frame(&test_frame()));

        let mut bridge = CanBridge::new(transport);
        let got = bridge.receive(None).unwrap();

        assert_eq!(got, Some(test_frame()));
    }

    #[test]
    fn test_error_notifications_routed_to_hook() {
        let mut transport = MockTransport::new();
        let mut bytes = vec![0xAA, 0x15, 0x02, 0x55];
        bytes.extend_from_slice(&encode_frame(&test_frame()));
        transport.queue(&bytes);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut bridge = CanBridge::new(transport);
        bridge.on_error(move |fault| sink.lock().unwrap().push(fault));

        // The data frame comes back; the fault goes to the hook only.
        let got = bridge.receive(Some(Duration::from_millis(50))).unwrap();
        assert_eq!(got, Some(test_frame()));
        assert_eq!(*seen.lock().unwrap(), vec![DeviceError::BusOvervoltage]);

        let again = bridge.receive(Some(Duration::ZERO)).unwrap();
        assert_eq!(again, None);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_latest_hook_replaces_prior() {
        let mut transport = MockTransport::new();
        transport.queue(&[0xAA, 0x15, 0x04, 0x55]);

        let first = Arc::new(Mutex::new(0usize));
        let second = Arc::new(Mutex::new(0usize));

        let mut bridge = CanBridge::new(transport);
        let count = first.clone();
        bridge.on_error(move |_| *count.lock().unwrap() += 1);
        let count = second.clone();
        bridge.on_error(move |_| *count.lock().unwrap() += 1);

        let got = bridge.receive(Some(Duration::from_millis(50))).unwrap();

        assert_eq!(got, None);
        assert_eq!(*first.lock().unwrap(), 0);
        assert_eq!(*second.lock().unwrap(), 1);
    }

    #[test]
    fn test_fault_without_hook_is_dropped() {
        let mut transport = MockTransport::new();
        let mut bytes = vec![0xAA, 0x15, 0x01, 0x55];
        bytes.extend_from_slice(&encode_frame(&test_frame()));
        transport.queue(&bytes);

        let mut bridge = CanBridge::new(transport);
        let got = bridge.receive(Some(Duration::from_millis(50))).unwrap();

        assert_eq!(got, Some(test_frame()));
    }

    #[test]
    fn test_partial_frame_keeps_accumulating() {
        let bytes = encode_frame(&test_frame());
        let (head, tail) = bytes.split_at(3);

        let mut transport = MockTransport::new();
        transport.queue(head);

        let mut bridge = CanBridge::new(transport);

        // Only a fragment arrived; a successful wait still yields nothing.
        let got = bridge.receive(Some(Duration::from_millis(50))).unwrap();
        assert_eq!(got, None);
        assert_eq!(bridge.buffered(), head.len());

        bridge.transport_mut().queue(tail);
        let got = bridge.receive(Some(Duration::from_millis(50))).unwrap();
        assert_eq!(got, Some(test_frame()));
        assert_eq!(bridge.buffered(), 0);
    }

    #[test]
    fn test_read_failure_propagates() {
        let mut transport = MockTransport::new();
        transport.read_error = Some(io::ErrorKind::BrokenPipe);

        let mut bridge = CanBridge::new(transport);
        let result = bridge.receive(Some(Duration::from_millis(50)));

        assert!(matches!(result, Err(CanlinkError::Io(_))));
    }

    #[test]
    fn test_write_failure_propagates() {
        let mut transport = MockTransport::new();
        transport.write_error = Some(io::ErrorKind::BrokenPipe);

        let mut bridge = CanBridge::new(transport);
        let result = bridge.send(&test_frame());

        assert!(matches!(result, Err(CanlinkError::Io(_))));
    }
}
