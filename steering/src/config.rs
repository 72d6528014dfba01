//! Controller tuning.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selection::SelectionPolicy;

/// Default lower edge of the deadzone band.
pub const DEFAULT_DEADZONE_MIN: f64 = 0.45;

/// Default upper edge of the deadzone band.
pub const DEFAULT_DEADZONE_MAX: f64 = 0.55;

/// Default per-frame turn step in radians.
pub const DEFAULT_TURN_INCREMENT: f64 = PI / 48.0;

/// Default per-frame forward speed step.
pub const DEFAULT_FORWARD_INCREMENT: f64 = 0.1;

/// Default number of empty frames the robot holds still after losing a
/// centered target before it starts scanning again.
pub const DEFAULT_HOLD_FRAMES: u32 = 3;

/// Invalid controller configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidIncrement { name: &'static str, value: f64 },

    #[error("deadzone [{min}, {max}] must satisfy 0 <= min <= max <= 1")]
    InvalidDeadzone { min: f64, max: f64 },
}

/// Where a horizontal position falls relative to the deadzone band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadzoneSide {
    Left,
    Centered,
    Right,
}

/// Immutable controller configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Lower edge of the centered band (inclusive)
    pub deadzone_min: f64,
    /// Upper edge of the centered band (inclusive)
    pub deadzone_max: f64,
    /// Heading change per frame when the target is off-center, radians
    pub turn_increment: f64,
    /// Heading change per frame while scanning for a target, radians
    pub search_increment: f64,
    /// Forward speed gained per centered frame
    pub forward_increment: f64,
    /// Empty frames to hold still after the target was last centered
    pub hold_frames: u32,
    /// How the governing detection is picked
    pub selection: SelectionPolicy,
    /// Only steer toward these classes; `None` accepts every class
    pub target_classes: Option<Vec<u32>>,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            deadzone_min: DEFAULT_DEADZONE_MIN,
            deadzone_max: DEFAULT_DEADZONE_MAX,
            turn_increment: DEFAULT_TURN_INCREMENT,
            search_increment: DEFAULT_TURN_INCREMENT,
            forward_increment: DEFAULT_FORWARD_INCREMENT,
            hold_frames: DEFAULT_HOLD_FRAMES,
            selection: SelectionPolicy::default(),
            target_classes: None,
        }
    }
}

impl SteeringConfig {
    /// Check that the configuration keeps the controller invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("turn_increment", self.turn_increment),
            ("search_increment", self.search_increment),
            ("forward_increment", self.forward_increment),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidIncrement { name, value });
            }
        }

        let (min, max) = (self.deadzone_min, self.deadzone_max);
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(ConfigError::InvalidDeadzone { min, max });
        }

        Ok(())
    }

    /// Classify a normalized horizontal position against the deadzone.
    ///
    /// Both band edges count as centered.
    pub fn side_of(&self, mid_x: f64) -> DeadzoneSide {
        if mid_x < self.deadzone_min {
            DeadzoneSide::Left
        } else if mid_x > self.deadzone_max {
            DeadzoneSide::Right
        } else {
            DeadzoneSide::Centered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SteeringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_deadzone_edges_are_centered() {
        let config = SteeringConfig::default();
        assert_eq!(config.side_of(0.45), DeadzoneSide::Centered);
        assert_eq!(config.side_of(0.55), DeadzoneSide::Centered);
        assert_eq!(config.side_of(0.5), DeadzoneSide::Centered);
        assert_eq!(config.side_of(0.449), DeadzoneSide::Left);
        assert_eq!(config.side_of(0.551), DeadzoneSide::Right);
    }

    #[test]
    fn test_deadzone_partition_is_total() {
        let config = SteeringConfig::default();
        let mut counts = [0usize; 3];
        for i in 0..1000 {
            let mid_x = i as f64 / 1000.0;
            let idx = match config.side_of(mid_x) {
                DeadzoneSide::Left => 0,
                DeadzoneSide::Centered => 1,
                DeadzoneSide::Right => 2,
            };
            counts[idx] += 1;
        }
        assert_eq!(counts.iter().sum::<usize>(), 1000);
        assert_eq!(counts[0], 450);
        assert_eq!(counts[1], 101);
        assert_eq!(counts[2], 449);
    }

    #[test]
    fn test_rejects_bad_increments() {
        let config = SteeringConfig {
            turn_increment: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidIncrement {
                name: "turn_increment",
                ..
            })
        ));

        let config = SteeringConfig {
            forward_increment: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_deadzone() {
        let inverted = SteeringConfig {
            deadzone_min: 0.6,
            deadzone_max: 0.4,
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvalidDeadzone { .. })
        ));

        let out_of_frame = SteeringConfig {
            deadzone_max: 1.5,
            ..Default::default()
        };
        assert!(out_of_frame.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SteeringConfig =
            serde_json::from_str(r#"{"hold_frames": 0, "selection": "confidence"}"#).unwrap();
        assert_eq!(config.hold_frames, 0);
        assert_eq!(config.selection, SelectionPolicy::HighestConfidence);
        assert_eq!(config.deadzone_min, DEFAULT_DEADZONE_MIN);
        assert_eq!(config.turn_increment, DEFAULT_TURN_INCREMENT);
    }
}
