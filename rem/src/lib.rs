//! Robot embedded messages.
//!
//! Packet definitions for the command link between the vision computer and
//! the robot's embedded motor controller. The steering side fills in a
//! logical [`RobotCommand`]; a [`ProtocolEncoder`] turns it into the
//! fixed-size [`RobotCommandPayload`] that goes over the wire.
//!
//! # Wire layout
//!
//! ```text
//! byte  0        1     2..6            6..8
//!      +--------+-----+---------------+----------+
//!      | header | id  | angle (f32 LE)| checksum |
//!      +--------+-----+---------------+----------+
//! ```
//!
//! The checksum is the wrapping sum of the preceding little-endian 16-bit
//! words (see [`RobotCommandPayload::seal`]).

mod command;
mod encoder;
mod parser;
mod payload;

pub use command::{RobotCommand, DEFAULT_ROBOT_ID};
pub use encoder::{EncodeError, ProtocolEncoder, RemEncoder};
pub use parser::{parse, ParseError};
pub use payload::RobotCommandPayload;

/// Packet type tags carried in the first byte of every packet.
pub mod packet_type {
    /// Steering command from the vision computer to the robot
    pub const ROBOT_COMMAND: u8 = 0x0F;
}

/// Header tag for robot command packets.
pub const PACKET_TYPE_ROBOT_COMMAND: u8 = packet_type::ROBOT_COMMAND;
