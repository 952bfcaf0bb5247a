//! Device configuration command.
//!
//! Write-only: the adapter applies settings asynchronously and never
//! echoes them back, so there is no read path. `Default` restores the
//! adapter's power-on values.
//!
//! # Example
//!
//! ```
//! use canlink::DeviceConfig;
//!
//! let config = DeviceConfig::new(500_000).terminator(true).error_reporting(true);
//!
//! assert_eq!(config.bitrate, 500_000);
//! assert!(config.terminator);
//! assert!(!config.silent);
//! ```

/// Bus parameters carried by one configuration frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Bus bitrate in bits per second.
    pub bitrate: u32,
    /// Switch the adapter's 120-ohm bus termination on.
    pub terminator: bool,
    /// Listen-only mode: receive without acknowledging bus traffic.
    pub silent: bool,
    /// Forward bus faults to the host as error frames.
    pub error_reporting: bool,
    /// Acceptance filter identifier.
    pub filter_id: u32,
    /// Acceptance filter mask.
    pub filter_mask: u32,
}

impl DeviceConfig {
    /// Configuration with the given bitrate and power-on defaults for
    /// everything else.
    pub fn new(bitrate: u32) -> Self {
        Self {
            bitrate,
            ..Self::default()
        }
    }

    /// Set the bus termination flag.
    pub fn terminator(mut self, enabled: bool) -> Self {
        self.terminator = enabled;
        self
    }

    /// Set listen-only mode.
    pub fn silent(mut self, enabled: bool) -> Self {
        self.silent = enabled;
        self
    }

    /// Set error frame reporting.
    pub fn error_reporting(mut self, enabled: bool) -> Self {
        self.error_reporting = enabled;
        self
    }

    /// Set the acceptance filter pair.
    pub fn filter(mut self, id: u32, mask: u32) -> Self {
        self.filter_id = id;
        self.filter_mask = mask;
        self
    }
}

impl Default for DeviceConfig {
    /// Power-on defaults: 250 kbit/s, termination off, normal mode, no
    /// error reporting, fully open filter.
    fn default() -> Self {
        Self {
            bitrate: 250_000,
            terminator: false,
            silent: false,
            error_reporting: false,
            filter_id: 0,
            filter_mask: 0xFFFF_FFFF,
        }
    }
}
