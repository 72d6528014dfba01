//! Decoding packets received from the link

use thiserror::Error;

use crate::command::RobotCommand;
use crate::payload::RobotCommandPayload;
use crate::PACKET_TYPE_ROBOT_COMMAND;

/// Errors from [`parse`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("packet truncated: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("unknown packet type 0x{0:02X}")]
    UnknownPacketType(u8),

    #[error("checksum mismatch: stored 0x{stored:04X}, computed 0x{computed:04X}")]
    ChecksumMismatch { stored: u16, computed: u16 },
}

/// Parse a robot command packet from the start of `data`.
///
/// Trailing bytes after the first packet are ignored.
pub fn parse(data: &[u8]) -> Result<RobotCommand, ParseError> {
    let size = RobotCommandPayload::PACKET_SIZE;
    if data.len() < size {
        return Err(ParseError::Truncated {
            expected: size,
            actual: data.len(),
        });
    }

    if data[0] != PACKET_TYPE_ROBOT_COMMAND {
        return Err(ParseError::UnknownPacketType(data[0]));
    }

    let payload: RobotCommandPayload = *bytemuck::from_bytes(&data[..size]);
    if !payload.verify() {
        return Err(ParseError::ChecksumMismatch {
            stored: payload.checksum,
            computed: payload.expected_checksum(),
        });
    }

    Ok(RobotCommand {
        header: payload.header,
        id: payload.id,
        angle: payload.angle(),
    })
}
