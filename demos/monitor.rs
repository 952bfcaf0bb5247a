//! Bus monitor - print every frame the adapter delivers.
//!
//! This example demonstrates:
//! - Discovering a bridge adapter on the USB bus
//! - Applying a bus configuration with fault reporting enabled
//! - Receiving frames and fault notifications in a polling loop
//!
//! # Running
//!
//! ```sh
//! cargo run --example monitor -- /dev/ttyACM0
//! # or let the demo pick the first discovered adapter:
//! cargo run --example monitor
//! ```

use std::time::Duration;

use canlink::{discover, CanBridge, DeviceConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    // Use the port given on the command line, or the first discovered one
    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => discover()?
            .into_iter()
            .next()
            .ok_or("no bridge adapter found")?,
    };
    println!("listening on {}", path);

    let mut bridge = CanBridge::open(&path)?;
    bridge
        .configure(&DeviceConfig::new(250_000).error_reporting(true))?
        .on_error(|fault| eprintln!("! {}", fault));

    loop {
        if let Some(frame) = bridge.receive(Some(Duration::from_millis(100)))? {
            println!("{}", frame);
        }
    }
}
