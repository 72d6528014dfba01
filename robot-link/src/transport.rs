//! Steering command transport.

use std::io;

use rem::{EncodeError, ProtocolEncoder, RemEncoder, RobotCommand};
use steering::SteeringCommand;
use thiserror::Error;
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::channel::SerialChannel;

/// Errors from [`CommandTransport::dispatch`].
#[derive(Error, Debug)]
pub enum TransportError {
    /// The port rejected or timed out the write. This frame's command is lost.
    #[error("serial write failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// The operator interrupted the run during a write.
    #[error("dispatch cancelled by operator")]
    Cancelled,

    /// The command could not be encoded.
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),
}

impl TransportError {
    /// True if the loop may carry on with the next frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::WriteFailed(_))
    }
}

/// Running totals kept by the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Commands fully written and flushed
    pub dispatched: u64,
    /// Commands lost to write failures
    pub dropped: u64,
}

/// Sends steering commands to one robot over an exclusively owned channel.
///
/// The channel is released by [`close`](Self::close), which consumes the
/// transport so it can only happen once.
#[derive(Debug)]
pub struct CommandTransport<C: SerialChannel, E: ProtocolEncoder = RemEncoder> {
    channel: C,
    encoder: E,
    robot_id: u8,
    cancel: CancelToken,
    stats: TransportStats,
}

impl<C: SerialChannel> CommandTransport<C, RemEncoder> {
    /// Transport using the standard packet encoder.
    pub fn new(channel: C, robot_id: u8, cancel: CancelToken) -> Self {
        Self::with_encoder(channel, RemEncoder, robot_id, cancel)
    }
}

impl<C: SerialChannel, E: ProtocolEncoder> CommandTransport<C, E> {
    pub fn with_encoder(channel: C, encoder: E, robot_id: u8, cancel: CancelToken) -> Self {
        Self {
            channel,
            encoder,
            robot_id,
            cancel,
            stats: TransportStats::default(),
        }
    }

    pub fn robot_id(&self) -> u8 {
        self.robot_id
    }

    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// Encode `command` and write it to the channel.
    ///
    /// Write failures are not retried. An interrupted write is resumed
    /// unless the cancel token has been set, in which case the dispatch
    /// reports [`TransportError::Cancelled`].
    ///
    /// If the port accepts part of the packet and then fails, the accepted
    /// bytes stay on the link. The next packet follows them directly and no
    /// resync marker is sent; the receiver must find the next `0x0F` header
    /// and checksum on its own.
    pub fn dispatch(&mut self, command: &SteeringCommand) -> Result<(), TransportError> {
        let record = RobotCommand::new(self.robot_id, command.heading_angle as f32);
        let payload = self.encoder.encode(&record)?;

        match self.write_packet(payload.as_bytes()) {
            Ok(()) => {
                self.stats.dispatched += 1;
                debug!("angle : {:.4}", record.angle);
                Ok(())
            }
            Err(e) => {
                if e.is_recoverable() {
                    self.stats.dropped += 1;
                }
                Err(e)
            }
        }
    }

    fn write_packet(&mut self, mut buf: &[u8]) -> Result<(), TransportError> {
        if self.cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        while !buf.is_empty() {
            match self.channel.write(buf) {
                Ok(0) => {
                    return Err(TransportError::WriteFailed(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "serial channel accepted no bytes",
                    )));
                }
                Ok(n) => buf = &buf[n..],
                Err(e) => self.classify(e)?,
            }
        }

        loop {
            match self.channel.flush() {
                Ok(()) => return Ok(()),
                Err(e) => self.classify(e)?,
            }
        }
    }

    /// Interrupted calls are retried unless cancellation was requested;
    /// every other error fails the write.
    fn classify(&self, error: io::Error) -> Result<(), TransportError> {
        if error.kind() != io::ErrorKind::Interrupted {
            return Err(TransportError::WriteFailed(error));
        }
        if self.cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        Ok(())
    }

    /// Flush and release the channel.
    pub fn close(mut self) -> io::Result<()> {
        info!(
            "Closing {} ({} commands sent, {} dropped)",
            self.channel.description(),
            self.stats.dispatched,
            self.stats.dropped
        );
        self.channel.close()
    }
}
