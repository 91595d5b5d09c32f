//! The descriptor-level seam under [`PortHandle`](super::PortHandle).
//!
//! A `RawChannel` performs exactly one OS call per method and reports the raw
//! outcome, interruptions included. Retrying is the handle's job.

use std::fmt;
use std::io;

/// Single-call byte channel operations.
pub trait RawChannel: Send + fmt::Debug {
    /// One blocking read. `Ok(0)` means the channel reported no data.
    fn read_raw(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// One blocking write, possibly accepting fewer bytes than offered.
    fn write_raw(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Bytes readable right now without blocking.
    fn bytes_available(&self) -> io::Result<usize>;

    /// Block until everything written has been transmitted.
    fn drain(&self) -> io::Result<()>;

    /// Release the channel, reporting any error from the release itself.
    fn close(self) -> io::Result<()>
    where
        Self: Sized,
    {
        drop(self);
        Ok(())
    }
}
