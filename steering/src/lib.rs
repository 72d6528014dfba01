//! Steering control for a vision-guided mobile robot.
//!
//! # Overview
//!
//! This crate turns the object detections found in a single camera frame into
//! a [`SteeringCommand`] for the robot. It owns no I/O: detections come in from
//! whatever detector adapter the caller uses, and the command goes out to a
//! transport (see the `robot-link` crate).
//!
//! ```text
//! +-------------+     +--------------------+     +-------------+
//! |  Detector   |---->| SteeringController |---->|  Transport  |
//! | (per frame) |     |                    |     |  (serial)   |
//! +-------------+     +--------------------+     +-------------+
//!                            ^      |
//!                            |      v
//!                     +-----------------+
//!                     | ControllerState |
//!                     +-----------------+
//! ```
//!
//! # Control law
//!
//! The governing detection's normalized center-x is compared against a
//! horizontal deadzone band (default `[0.45, 0.55]`):
//!
//! | Position | Action | Heading | Forward speed |
//! |----------|--------|---------|---------------|
//! | left of band | [`SteerAction::Left`] | `+ turn_increment` | reset to 0 |
//! | right of band | [`SteerAction::Right`] | `- turn_increment` | reset to 0 |
//! | inside band (inclusive) | [`SteerAction::Straight`] | unchanged | `+ forward_increment` |
//!
//! Frames without a target either scan ([`SteerAction::Search`]) or stop
//! ([`SteerAction::Hold`]) for a few frames after the target was last seen
//! centered. The heading is wrapped into `(-2π, 2π]` after every step.

pub mod angle;
pub mod command;
pub mod config;
pub mod controller;
pub mod detection;
pub mod selection;

pub use angle::{is_normalized, normalize_heading, HEADING_LIMIT};
pub use command::{ControllerState, SteerAction, SteeringCommand};
pub use config::{ConfigError, DeadzoneSide, SteeringConfig};
pub use controller::SteeringController;
pub use detection::{BoundingBox, Detection, InvalidDetection};
pub use selection::SelectionPolicy;
