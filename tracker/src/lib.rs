//! Frame loop that steers a robot toward a detected target.
//!
//! Ties the pieces together: a [`DetectionSource`] yields one frame of
//! detections at a time, the [`SteeringController`](steering::SteeringController)
//! turns it into a command, and, when a link is configured, a
//! [`CommandTransport`](robot_link::CommandTransport) sends it before the next
//! frame is pulled.
//!
//! The loop is single-threaded and never queues: a slow serial write simply
//! delays the next frame.

pub mod config;
pub mod frame_loop;
pub mod shutdown;
pub mod source;

pub use config::{ConfigError, RunConfig};
pub use frame_loop::{DispatchOutcome, FrameLoop, FrameOutcome, LoopError, RunSummary};
pub use source::{DetectionSource, Frame, JsonLinesSource, LabelDirSource, ReplaySource, SourceError};
