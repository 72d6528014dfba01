//! In-memory channel for dry runs and tests.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cancel::CancelToken;
use crate::channel::SerialChannel;

#[derive(Debug)]
enum Fault {
    Error(io::ErrorKind),
    Cancel(CancelToken),
    Short(usize),
}

#[derive(Debug, Default)]
struct Inner {
    pending: Vec<u8>,
    flushed: Vec<Vec<u8>>,
    faults: VecDeque<Fault>,
    write_calls: usize,
    closes: usize,
}

/// Channel that records flushed packets instead of sending them.
///
/// Clones share the same recording, so a test can keep a handle while the
/// transport owns another. Faults can be scripted to make upcoming writes
/// fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make the next write call fail with `kind`.
    pub fn fail_next_write(&self, kind: io::ErrorKind) {
        self.lock().faults.push_back(Fault::Error(kind));
    }

    /// Make the next write call accept at most `n` bytes.
    pub fn accept_next_write(&self, n: usize) {
        self.lock().faults.push_back(Fault::Short(n));
    }

    /// Make the next write call set `token` and fail as interrupted, the way
    /// a blocking write returns when SIGINT lands mid-write.
    pub fn cancel_during_next_write(&self, token: CancelToken) {
        self.lock().faults.push_back(Fault::Cancel(token));
    }

    /// Packets written and flushed so far, one entry per flush.
    pub fn packets(&self) -> Vec<Vec<u8>> {
        self.lock().flushed.clone()
    }

    /// Number of write calls, including failed ones.
    pub fn write_calls(&self) -> usize {
        self.lock().write_calls
    }

    /// Number of times the channel was closed.
    pub fn closes(&self) -> usize {
        self.lock().closes
    }
}

impl SerialChannel for MemoryChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.lock();
        inner.write_calls += 1;

        match inner.faults.pop_front() {
            Some(Fault::Error(kind)) => Err(io::Error::new(kind, "injected write fault")),
            Some(Fault::Cancel(token)) => {
                token.cancel();
                Err(io::Error::from(io::ErrorKind::Interrupted))
            }
            Some(Fault::Short(n)) => {
                let n = n.min(buf.len());
                inner.pending.extend_from_slice(&buf[..n]);
                Ok(n)
            }
            None => {
                inner.pending.extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self.lock();
        if !inner.pending.is_empty() {
            let packet = std::mem::take(&mut inner.pending);
            inner.flushed.push(packet);
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.lock().closes += 1;
        Ok(())
    }

    fn description(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_per_flush() {
        let handle = MemoryChannel::new();
        let mut channel = handle.clone();

        channel.write(&[1, 2]).unwrap();
        channel.write(&[3]).unwrap();
        channel.flush().unwrap();
        channel.write(&[4]).unwrap();
        channel.close().unwrap();

        assert_eq!(handle.packets(), vec![vec![1, 2, 3], vec![4]]);
        assert_eq!(handle.closes(), 1);
        assert_eq!(handle.write_calls(), 3);
    }

    #[test]
    fn test_scripted_faults() {
        let mut channel = MemoryChannel::new();
        let token = CancelToken::new();
        channel.fail_next_write(io::ErrorKind::TimedOut);
        channel.cancel_during_next_write(token.clone());
        channel.accept_next_write(2);

        let err = channel.write(&[1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);

        let err = channel.write(&[1]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        assert!(token.is_cancelled());

        assert_eq!(channel.write(&[1, 2, 3]).unwrap(), 2);
        assert_eq!(channel.write(&[1]).unwrap(), 1);
        channel.flush().unwrap();
        assert_eq!(channel.packets(), vec![vec![1, 2, 1]]);
    }
}
