//! Deadzone steering controller.

use tracing::{debug, trace};

use crate::angle::normalize_heading;
use crate::command::{ControllerState, SteerAction, SteeringCommand};
use crate::config::{ConfigError, DeadzoneSide, SteeringConfig};
use crate::detection::Detection;

/// Memoryless per-frame steering controller.
///
/// The controller holds only configuration. All run-time state lives in a
/// [`ControllerState`] owned by the caller and lent to [`step`](Self::step)
/// each frame.
///
/// # Example
///
/// ```
/// use steering::{ControllerState, Detection, SteerAction, SteeringConfig, SteeringController};
///
/// let controller = SteeringController::new(SteeringConfig::default())?;
/// let mut state = ControllerState::new();
///
/// let cmd = controller.step(&[Detection::at_mid_x(0, 0.5)], &mut state);
/// assert_eq!(cmd.action, SteerAction::Straight);
/// assert!((cmd.forward_speed - 0.1).abs() < 1e-12);
/// # Ok::<(), steering::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SteeringController {
    config: SteeringConfig,
}

impl SteeringController {
    /// Create a controller, rejecting configurations that would break the
    /// state invariants.
    pub fn new(config: SteeringConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    /// Advance the controller by one frame.
    ///
    /// Never fails: an empty or fully filtered detection list is the
    /// "no target" case, not an error.
    pub fn step(&self, detections: &[Detection], state: &mut ControllerState) -> SteeringCommand {
        let target = self
            .config
            .selection
            .select(detections, self.config.target_classes.as_deref());

        let action = match target {
            Some(detection) => self.track(detection.bbox.mid_x(), state),
            None => self.without_target(state),
        };

        state.heading_angle = normalize_heading(state.heading_angle);

        trace!(
            "{action} heading={:.4} speed={:.2}",
            state.heading_angle, state.forward_speed
        );

        SteeringCommand::from_state(state, action)
    }

    fn track(&self, mid_x: f64, state: &mut ControllerState) -> SteerAction {
        state.missed_frames = 0;

        match self.config.side_of(mid_x) {
            DeadzoneSide::Left => {
                state.heading_angle += self.config.turn_increment;
                state.forward_speed = 0.0;
                SteerAction::Left
            }
            DeadzoneSide::Right => {
                state.heading_angle -= self.config.turn_increment;
                state.forward_speed = 0.0;
                SteerAction::Right
            }
            DeadzoneSide::Centered => {
                state.forward_speed += self.config.forward_increment;
                state.last_seen_target = true;
                SteerAction::Straight
            }
        }
    }

    fn without_target(&self, state: &mut ControllerState) -> SteerAction {
        state.forward_speed = 0.0;

        if state.last_seen_target {
            state.missed_frames = state.missed_frames.saturating_add(1);
            if state.missed_frames <= self.config.hold_frames {
                return SteerAction::Hold;
            }

            debug!(
                "target lost for {} frames, resuming search",
                state.missed_frames
            );
            state.last_seen_target = false;
            state.missed_frames = 0;
        }

        state.heading_angle += self.config.search_increment;
        SteerAction::Search
    }
}
