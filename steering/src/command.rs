//! Controller state and per-frame output.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Which branch of the control law produced a command.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SteerAction {
    /// Target left of the deadzone; heading increased
    Left,
    /// Target right of the deadzone; heading decreased
    Right,
    /// Target inside the deadzone; driving forward
    Straight,
    /// No target and none recently centered; turning to scan
    Search,
    /// Target recently centered but not in this frame; stopped
    Hold,
}

impl SteerAction {
    /// True if a target detection governed this command.
    pub fn saw_target(&self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Straight)
    }
}

/// Controller state carried across the whole run.
///
/// Starts zeroed and is mutated only by
/// [`SteeringController::step`](crate::SteeringController::step).
///
/// # Invariants
///
/// - `heading_angle` is in `(-2π, 2π]` after every step
/// - `forward_speed` is never negative
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    /// Commanded heading in radians
    pub heading_angle: f64,
    /// Accumulated forward speed ("rho"), reset on any turn or stop
    pub forward_speed: f64,
    /// Target was centered in the most recent frame that had a target
    pub last_seen_target: bool,
    /// Consecutive frames without a target since it was last centered
    pub missed_frames: u32,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Per-frame controller output, consumed immediately by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringCommand {
    /// Heading in radians, already normalized
    pub heading_angle: f64,
    /// Forward speed in abstract units
    pub forward_speed: f64,
    /// Reserved angular-rate control mode; always 0
    pub angular_control: u8,
    /// Control-law branch taken this frame
    pub action: SteerAction,
}

impl SteeringCommand {
    /// Snapshot of `state` after an update.
    pub fn from_state(state: &ControllerState, action: SteerAction) -> Self {
        Self {
            heading_angle: state.heading_angle,
            forward_speed: state.forward_speed,
            angular_control: 0,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_initial_state_is_zeroed() {
        let state = ControllerState::new();
        assert_eq!(state.heading_angle, 0.0);
        assert_eq!(state.forward_speed, 0.0);
        assert!(!state.last_seen_target);
        assert_eq!(state.missed_frames, 0);
    }

    #[test]
    fn test_action_display() {
        let names: Vec<String> = SteerAction::iter().map(|a| a.to_string()).collect();
        assert_eq!(names, ["LEFT", "RIGHT", "STRAIGHT", "SEARCH", "HOLD"]);
        assert_eq!("HOLD".parse::<SteerAction>(), Ok(SteerAction::Hold));
    }

    #[test]
    fn test_saw_target() {
        assert!(SteerAction::Left.saw_target());
        assert!(SteerAction::Straight.saw_target());
        assert!(!SteerAction::Search.saw_target());
        assert!(!SteerAction::Hold.saw_target());
    }
}
