//! Scripted channel for exercising the retry discipline without hardware.
//!
//! Each read or write call consumes the next scripted step, so tests can
//! inject short transfers, interruptions, errors and end-of-data in any order.

use super::channel::RawChannel;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Outcome of the next `read_raw` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStep {
    /// Deliver these bytes. If the caller's buffer is smaller, the rest stays
    /// queued for the following call.
    Data(Vec<u8>),
    Interrupted,
    Error(io::ErrorKind),
    /// Return `Ok(0)`.
    Eof,
}

/// Outcome of the next `write_raw` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    /// Accept at most this many bytes.
    Accept(usize),
    Interrupted,
    Error(io::ErrorKind),
    /// Return `Ok(0)`.
    Stall,
}

#[derive(Debug, Default)]
struct MockState {
    reads: VecDeque<ReadStep>,
    writes: VecDeque<WriteStep>,
    written: Vec<u8>,
    read_calls: usize,
    write_calls: usize,
    available_error: Option<io::ErrorKind>,
    drain_errors: VecDeque<io::ErrorKind>,
    drain_calls: usize,
    closed: bool,
}

/// A [`RawChannel`] driven by queued steps.
///
/// Clones share state, so a test can keep one clone for inspection after
/// handing another to a [`PortHandle`](super::PortHandle).
///
/// With nothing queued, reads report end-of-data and writes accept
/// everything.
///
/// # Example
/// ```
/// use rawserial::port::{MockChannel, PortHandle, WriteStep};
///
/// let mock = MockChannel::new();
/// mock.enqueue_write(WriteStep::Accept(2));
///
/// let mut port = PortHandle::from_channel("MOCK0", mock.clone());
/// port.write_buffer(b"hello").unwrap();
///
/// assert_eq!(mock.written(), b"hello");
/// assert_eq!(mock.write_calls(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue bytes for a single read call.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.enqueue_read_step(ReadStep::Data(data.to_vec()));
    }

    pub fn enqueue_read_step(&self, step: ReadStep) {
        self.state().reads.push_back(step);
    }

    pub fn enqueue_write(&self, step: WriteStep) {
        self.state().writes.push_back(step);
    }

    /// Make the next `bytes_available` calls fail with `kind`.
    pub fn fail_available(&self, kind: io::ErrorKind) {
        self.state().available_error = Some(kind);
    }

    /// Make the next `drain` call fail with `kind`. Queued failures are
    /// consumed one per call.
    pub fn enqueue_drain_error(&self, kind: io::ErrorKind) {
        self.state().drain_errors.push_back(kind);
    }

    pub fn drain_calls(&self) -> usize {
        self.state().drain_calls
    }

    /// Everything accepted by writes so far.
    pub fn written(&self) -> Vec<u8> {
        self.state().written.clone()
    }

    pub fn read_calls(&self) -> usize {
        self.state().read_calls
    }

    pub fn write_calls(&self) -> usize {
        self.state().write_calls
    }

    pub fn was_closed(&self) -> bool {
        self.state().closed
    }
}

impl RawChannel for MockChannel {
    fn read_raw(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        state.read_calls += 1;

        match state.reads.pop_front() {
            None | Some(ReadStep::Eof) => Ok(0),
            Some(ReadStep::Interrupted) => Err(io::ErrorKind::Interrupted.into()),
            Some(ReadStep::Error(kind)) => Err(kind.into()),
            Some(ReadStep::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    state.reads.push_front(ReadStep::Data(data.split_off(n)));
                }
                Ok(n)
            }
        }
    }

    fn write_raw(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state();
        state.write_calls += 1;

        let n = match state.writes.pop_front() {
            None => buf.len(),
            Some(WriteStep::Accept(limit)) => limit.min(buf.len()),
            Some(WriteStep::Interrupted) => return Err(io::ErrorKind::Interrupted.into()),
            Some(WriteStep::Error(kind)) => return Err(kind.into()),
            Some(WriteStep::Stall) => 0,
        };
        state.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn bytes_available(&self) -> io::Result<usize> {
        let state = self.state();
        if let Some(kind) = state.available_error {
            return Err(kind.into());
        }
        Ok(state
            .reads
            .iter()
            .map_while(|step| match step {
                ReadStep::Data(data) => Some(data.len()),
                _ => None,
            })
            .sum())
    }

    fn drain(&self) -> io::Result<()> {
        let mut state = self.state();
        state.drain_calls += 1;
        match state.drain_errors.pop_front() {
            Some(kind) => Err(kind.into()),
            None => Ok(()),
        }
    }

    fn close(self) -> io::Result<()> {
        self.state().closed = true;
        Ok(())
    }
}
