//! Encoding logical commands into wire packets

use thiserror::Error;

use crate::command::RobotCommand;
use crate::payload::RobotCommandPayload;
use crate::PACKET_TYPE_ROBOT_COMMAND;

/// A logical command that cannot be encoded.
///
/// Never transient: it means the caller and the protocol disagree, so
/// retrying the same command would fail the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("angle {0} is not finite")]
    NonFiniteAngle(f32),

    #[error("unexpected header 0x{found:02X}, expected 0x{expected:02X}")]
    UnexpectedHeader { found: u8, expected: u8 },
}

/// Boundary between the logical command and its wire representation.
pub trait ProtocolEncoder {
    /// Encode one command into a fixed-size packet.
    fn encode(&self, command: &RobotCommand) -> Result<RobotCommandPayload, EncodeError>;
}

/// Encoder for the robot embedded message layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemEncoder;

impl ProtocolEncoder for RemEncoder {
    fn encode(&self, command: &RobotCommand) -> Result<RobotCommandPayload, EncodeError> {
        if command.header != PACKET_TYPE_ROBOT_COMMAND {
            return Err(EncodeError::UnexpectedHeader {
                found: command.header,
                expected: PACKET_TYPE_ROBOT_COMMAND,
            });
        }
        if !command.angle.is_finite() {
            return Err(EncodeError::NonFiniteAngle(command.angle));
        }

        Ok(RobotCommandPayload::new(
            command.header,
            command.id,
            command.angle,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_fills_fields() {
        let payload = RemEncoder.encode(&RobotCommand::new(3, 0.25)).unwrap();
        assert_eq!({ payload.header }, PACKET_TYPE_ROBOT_COMMAND);
        assert_eq!({ payload.id }, 3);
        assert_eq!(payload.angle(), 0.25);
        assert!(payload.verify());
        assert_eq!(payload.as_bytes().len(), RobotCommandPayload::PACKET_SIZE);
    }

    #[test]
    fn test_rejects_non_finite_angle() {
        let err = RemEncoder
            .encode(&RobotCommand::new(3, f32::NAN))
            .unwrap_err();
        assert!(matches!(err, EncodeError::NonFiniteAngle(_)));
    }

    #[test]
    fn test_rejects_foreign_header() {
        let command = RobotCommand {
            header: 0x42,
            id: 3,
            angle: 0.0,
        };
        assert_eq!(
            RemEncoder.encode(&command),
            Err(EncodeError::UnexpectedHeader {
                found: 0x42,
                expected: PACKET_TYPE_ROBOT_COMMAND
            })
        );
    }
}
