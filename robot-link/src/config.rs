//! Serial port settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default device node of the motor controller's USB CDC port.
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Line rate expected by the motor controller firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial port configuration.
///
/// Framing is always 8 data bits, no parity, 1 stop bit; only the device,
/// rate and timing are configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyACM0`
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Blocking write timeout in milliseconds
    pub timeout_ms: u64,
    /// Delay after opening before the first write, in milliseconds
    pub settle_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: 10,
            settle_ms: 1000,
        }
    }
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle_time(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
