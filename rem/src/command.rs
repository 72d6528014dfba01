//! Logical robot command record

use crate::PACKET_TYPE_ROBOT_COMMAND;

/// Robot id used by the reference deployment.
pub const DEFAULT_ROBOT_ID: u8 = 3;

/// Robot command fields populated by the vision side before encoding.
///
/// Only the header, target id and heading angle are carried; the remaining
/// fields of the embedded protocol are left to the motor controller's
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotCommand {
    /// Packet type tag, normally [`PACKET_TYPE_ROBOT_COMMAND`]
    pub header: u8,
    /// Target robot identifier
    pub id: u8,
    /// Commanded heading in radians
    pub angle: f32,
}

impl RobotCommand {
    /// Robot command for robot `id` with the standard header.
    pub fn new(id: u8, angle: f32) -> Self {
        Self {
            header: PACKET_TYPE_ROBOT_COMMAND,
            id,
            angle,
        }
    }
}
