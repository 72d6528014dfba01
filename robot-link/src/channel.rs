//! Byte channels the transport writes to.

use std::io::{self, Write};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::config::SerialConfig;

/// Write-only byte channel to the robot.
///
/// Abstracts the serial port so the transport and frame loop can be driven
/// against an in-memory channel in tests.
pub trait SerialChannel {
    /// Write some bytes, returning how many were accepted.
    ///
    /// May fail with [`io::ErrorKind::Interrupted`] if a signal arrived
    /// mid-write, or [`io::ErrorKind::TimedOut`] if the port did not drain.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Block until everything written so far has left the host.
    fn flush(&mut self) -> io::Result<()>;

    /// Flush and release the channel. Called exactly once, at shutdown.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }

    /// Human-readable identifier for logs.
    fn description(&self) -> String;
}

/// Serial port opened with the motor controller's fixed 8N1 framing.
pub struct SerialPortChannel {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialPortChannel {
    /// Open the port and wait for it to settle.
    ///
    /// The motor controller drops bytes that arrive right after the port
    /// opens, so this blocks for [`SerialConfig::settle_time`] before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serialport::Error`] if the device cannot be
    /// opened or configured.
    pub fn open(config: &SerialConfig) -> Result<Self, serialport::Error> {
        info!(
            "Opening serial port {} at {} baud (8N1)",
            config.port, config.baud_rate
        );

        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.timeout())
            .open()?;

        let settle = config.settle_time();
        if !settle.is_zero() {
            debug!("Waiting {:?} for {} to settle", settle, config.port);
            std::thread::sleep(settle);
        }

        Ok(Self {
            port,
            path: config.port.clone(),
        })
    }
}

impl SerialChannel for SerialPortChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }

    fn description(&self) -> String {
        self.port.name().unwrap_or_else(|| self.path.clone())
    }
}

impl std::fmt::Debug for SerialPortChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortChannel")
            .field("path", &self.path)
            .finish()
    }
}
