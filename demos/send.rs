//! Frame transmitter - send a counter frame once a second.
//!
//! This example demonstrates:
//! - Opening a session on an explicit serial path
//! - Building extended frames
//! - Fire-and-forget transmission
//!
//! # Running
//!
//! ```sh
//! cargo run --example send -- /dev/ttyACM0
//! ```

use std::time::Duration;

use canlink::{CanBridge, CanFrame, DeviceConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let path = std::env::args().nth(1).ok_or("usage: send <serial-port>")?;

    let mut bridge = CanBridge::open(&path)?;
    bridge.configure(&DeviceConfig::new(250_000))?;

    let mut counter: u64 = 0;
    loop {
        let frame = CanFrame::new_extended(0x0010_2030, &counter.to_be_bytes())?;
        bridge.send(&frame)?;
        println!("sent {}", frame);
        counter = counter.wrapping_add(1);
        std::thread::sleep(Duration::from_secs(1));
    }
}
