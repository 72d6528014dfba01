//! Serial command link to the robot motor controller.
//!
//! [`CommandTransport`] takes the controller's per-frame
//! [`SteeringCommand`](steering::SteeringCommand), packs it into a
//! [`RobotCommand`](rem::RobotCommand), encodes it and writes it to a
//! [`SerialChannel`] in one blocking write.
//!
//! # Failure handling
//!
//! | Error | Meaning | Caller action |
//! |-------|---------|---------------|
//! | [`TransportError::WriteFailed`] | I/O error or timeout on the port | drop this frame's command, keep going |
//! | [`TransportError::Cancelled`] | operator interrupt during a write | stop the loop, close the port |
//! | [`TransportError::Encode`] | command rejected by the encoder | stop; protocol mismatch |
//!
//! Nothing is retried: a dropped command is superseded by the next frame's.

pub mod cancel;
pub mod channel;
pub mod config;
pub mod memory;
pub mod transport;

pub use cancel::CancelToken;
pub use channel::{SerialChannel, SerialPortChannel};
pub use config::SerialConfig;
pub use memory::MemoryChannel;
pub use transport::{CommandTransport, TransportError, TransportStats};
