//! Per-frame orchestration of controller and transport.

use std::time::{Duration, Instant};

use robot_link::{CancelToken, CommandTransport, SerialChannel, TransportError};
use steering::{ControllerState, SteeringCommand, SteeringController};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::source::{DetectionSource, Frame, SourceError};

/// Reasons the loop stopped before end of stream.
#[derive(Error, Debug)]
pub enum LoopError {
    #[error("cancelled by operator")]
    Cancelled,

    #[error("transport error: {0}")]
    Transport(TransportError),

    #[error("detection source error: {0}")]
    Source(SourceError),
}

impl From<SourceError> for LoopError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::Cancelled => Self::Cancelled,
            other => Self::Source(other),
        }
    }
}

impl From<TransportError> for LoopError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Cancelled => Self::Cancelled,
            other => Self::Transport(other),
        }
    }
}

/// What happened to a frame's command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No link configured
    Skipped,
    /// Written to the link
    Sent,
    /// Lost to a write failure
    Dropped,
}

/// Result of processing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    pub command: SteeringCommand,
    pub dispatch: DispatchOutcome,
}

/// Totals for a run that reached end of stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub dispatched: u64,
    pub dropped: u64,
    pub final_state: ControllerState,
}

/// Single-threaded frame loop.
///
/// Each frame gets exactly one controller step followed, if a transport is
/// present, by exactly one dispatch. Without a transport the controller still
/// runs and the state still evolves.
#[derive(Debug)]
pub struct FrameLoop<C: SerialChannel> {
    controller: SteeringController,
    state: ControllerState,
    transport: Option<CommandTransport<C>>,
    cancel: CancelToken,
    frame_budget: Option<Duration>,
    frames: u64,
}

impl<C: SerialChannel> FrameLoop<C> {
    pub fn new(
        controller: SteeringController,
        transport: Option<CommandTransport<C>>,
        cancel: CancelToken,
    ) -> Self {
        let config = controller.config();
        debug!(
            "Steering with selection={} hold_frames={} deadzone=[{}, {}]",
            config.selection, config.hold_frames, config.deadzone_min, config.deadzone_max
        );
        if let Some(transport) = &transport {
            info!("Sending commands to robot {}", transport.robot_id());
        }

        Self {
            controller,
            state: ControllerState::new(),
            transport,
            cancel,
            frame_budget: None,
            frames: 0,
        }
    }

    /// Warn whenever a frame takes longer than `budget` to step and dispatch.
    pub fn with_frame_budget(mut self, budget: Duration) -> Self {
        self.frame_budget = Some(budget);
        self
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Step the controller for one frame and dispatch the result.
    ///
    /// A failed write is logged and reported as [`DispatchOutcome::Dropped`];
    /// only cancellation and encode failures are returned as errors.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameOutcome, LoopError> {
        let start = Instant::now();

        let command = self.controller.step(&frame.detections, &mut self.state);
        debug!(
            "frame {}: {} detections, target={} {} heading={:.4} speed={:.2}",
            frame.frame_id,
            frame.detections.len(),
            command.action.saw_target(),
            command.action,
            command.heading_angle,
            command.forward_speed
        );

        let dispatch = match self.transport.as_mut() {
            None => DispatchOutcome::Skipped,
            Some(transport) => match transport.dispatch(&command) {
                Ok(()) => DispatchOutcome::Sent,
                Err(TransportError::WriteFailed(e)) => {
                    warn!("frame {}: command dropped: {e}", frame.frame_id);
                    DispatchOutcome::Dropped
                }
                Err(e) => return Err(e.into()),
            },
        };

        self.frames += 1;

        if let Some(budget) = self.frame_budget {
            let elapsed = start.elapsed();
            if elapsed > budget {
                warn!(
                    "frame {} took {:?}, over the {:?} budget",
                    frame.frame_id, elapsed, budget
                );
            }
        }

        Ok(FrameOutcome { command, dispatch })
    }

    /// Run until the source is exhausted, the operator cancels, or a fatal
    /// error occurs.
    ///
    /// The transport, if any, is closed exactly once before returning,
    /// whichever way the loop ended.
    pub fn run<S: DetectionSource + ?Sized>(
        mut self,
        source: &mut S,
    ) -> Result<RunSummary, LoopError> {
        let result = self.drive(source);

        let stats = self
            .transport
            .as_ref()
            .map(|t| t.stats())
            .unwrap_or_default();
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close() {
                warn!("Error closing serial channel: {e}");
            }
        }

        result?;
        info!(
            "Done. {} frames, {} commands sent, {} dropped",
            self.frames, stats.dispatched, stats.dropped
        );

        Ok(RunSummary {
            frames: self.frames,
            dispatched: stats.dispatched,
            dropped: stats.dropped,
            final_state: self.state,
        })
    }

    fn drive<S: DetectionSource + ?Sized>(&mut self, source: &mut S) -> Result<(), LoopError> {
        loop {
            if self.cancel.is_cancelled() {
                return Err(LoopError::Cancelled);
            }

            let Some(frame) = source.next_frame()? else {
                return Ok(());
            };
            self.process_frame(&frame)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_link::MemoryChannel;
    use steering::{Detection, SteerAction, SteeringConfig};

    use crate::source::ReplaySource;

    fn controller() -> SteeringController {
        SteeringController::new(SteeringConfig::default()).unwrap()
    }

    fn linked(channel: &MemoryChannel, cancel: &CancelToken) -> FrameLoop<MemoryChannel> {
        let transport = CommandTransport::new(channel.clone(), 3, cancel.clone());
        FrameLoop::new(controller(), Some(transport), cancel.clone())
    }

    #[test]
    fn test_one_packet_per_frame() {
        let channel = MemoryChannel::new();
        let cancel = CancelToken::new();
        let mut source = ReplaySource::from_detections([
            vec![],
            vec![Detection::at_mid_x(0, 0.5)],
            vec![Detection::at_mid_x(0, 0.1)],
        ]);

        let summary = linked(&channel, &cancel).run(&mut source).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.dispatched, 3);
        assert_eq!(channel.packets().len(), 3);
        assert_eq!(channel.closes(), 1);
    }

    #[test]
    fn test_without_transport_state_still_evolves() {
        let cancel = CancelToken::new();
        let frame_loop: FrameLoop<MemoryChannel> = FrameLoop::new(controller(), None, cancel);
        let mut source = ReplaySource::from_detections([vec![], vec![]]);

        let summary = frame_loop.run(&mut source).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.dispatched, 0);
        assert!(summary.final_state.heading_angle > 0.0);
    }

    #[test]
    fn test_process_frame_outcomes() {
        let channel = MemoryChannel::new();
        let cancel = CancelToken::new();
        let mut frame_loop = linked(&channel, &cancel);

        let ok = frame_loop
            .process_frame(&Frame::new(0, vec![Detection::at_mid_x(0, 0.5)]))
            .unwrap();
        assert_eq!(ok.command.action, SteerAction::Straight);
        assert_eq!(ok.dispatch, DispatchOutcome::Sent);

        channel.fail_next_write(std::io::ErrorKind::BrokenPipe);
        let dropped = frame_loop.process_frame(&Frame::new(1, vec![])).unwrap();
        assert_eq!(dropped.dispatch, DispatchOutcome::Dropped);
        assert_eq!(dropped.command.action, SteerAction::Hold);
    }

    #[test]
    fn test_cancel_before_frame() {
        let channel = MemoryChannel::new();
        let cancel = CancelToken::new();
        let frame_loop = linked(&channel, &cancel);
        cancel.cancel();

        let mut source = ReplaySource::from_detections([vec![]]);
        assert!(matches!(
            frame_loop.run(&mut source),
            Err(LoopError::Cancelled)
        ));
        assert_eq!(channel.write_calls(), 0);
        assert_eq!(channel.closes(), 1);
    }

    struct CancelledRead;

    impl DetectionSource for CancelledRead {
        fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
            Err(SourceError::Cancelled)
        }
    }

    #[test]
    fn test_cancelled_read_stops_loop() {
        let channel = MemoryChannel::new();
        let cancel = CancelToken::new();
        let result = linked(&channel, &cancel).run(&mut CancelledRead);
        assert!(matches!(result, Err(LoopError::Cancelled)));
        assert_eq!(channel.closes(), 1);
    }

    #[test]
    fn test_phantom_target_does_not_drive() {
        let channel = MemoryChannel::new();
        let cancel = CancelToken::new();
        let mut frame_loop = linked(&channel, &cancel);

        for id in 0..5 {
            let outcome = frame_loop
                .process_frame(&Frame::new(id, vec![Detection::at_mid_x(0, f64::NAN)]))
                .unwrap();
            assert_eq!(outcome.command.action, SteerAction::Search);
        }
        assert_eq!(frame_loop.state().forward_speed, 0.0);
        assert!(!frame_loop.state().last_seen_target);
    }

    #[test]
    fn test_frame_budget_does_not_skip() {
        let cancel = CancelToken::new();
        let frame_loop: FrameLoop<MemoryChannel> = FrameLoop::new(controller(), None, cancel)
            .with_frame_budget(Duration::from_nanos(1));
        let mut source = ReplaySource::from_detections([vec![], vec![], vec![]]);
        assert_eq!(frame_loop.run(&mut source).unwrap().frames, 3);
    }
}
