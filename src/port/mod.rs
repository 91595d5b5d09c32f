//! Open serial ports and their blocking I/O.
//!
//! A [`PortHandle`] is created by a successful open-and-configure and is the
//! only object callers use for I/O afterwards. Buffer reads and writes keep
//! issuing calls until the requested length is transferred, treating
//! interruptions as transient.

pub mod channel;
pub mod device;
pub mod mock;

pub use channel::RawChannel;
pub use device::DeviceFd;
pub use mock::{MockChannel, ReadStep, WriteStep};

use crate::error::{DriverError, DriverResult, Operation};
use crate::line::{self, LineSettings};
use crate::options::PortOptions;
use crate::trace::{driver_debug, hex_dump};
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};
use tracing::warn;

/// Value [`PortHandle::read_int`] returns when the channel had no data.
pub const NO_DATA: i32 = -1;

/// An open, configured serial port.
///
/// Not internally synchronised: one owner at a time.
#[derive(Debug)]
pub struct PortHandle<C: RawChannel = DeviceFd> {
    channel: C,
    name: String,
}

impl PortHandle<DeviceFd> {
    /// Open and configure the device at `path`.
    ///
    /// `options` is a `key=value;...` string (see [`PortOptions::parse`]);
    /// `None` or `""` selects 57600 8N1 with RTS/CTS. On any failure the
    /// descriptor, if it was opened, is closed before returning.
    ///
    /// # Example
    /// ```no_run
    /// use rawserial::PortHandle;
    ///
    /// let mut port = PortHandle::open("/dev/ttyUSB0", Some("baudrate=9600;autocts=off"))?;
    /// port.write_buffer(b"AT\r\n")?;
    /// port.close();
    /// # Ok::<(), rawserial::DriverError>(())
    /// ```
    pub fn open(path: &str, options: Option<&str>) -> DriverResult<Self> {
        if path.is_empty() {
            return Err(DriverError::invalid_argument(
                "device name",
                "cannot be empty",
            ));
        }
        driver_debug!("open device {}", path);

        let device = open_configured(path, options).map_err(|err| {
            driver_debug!("open failure with error: {}", err);
            err
        })?;

        driver_debug!("open success");
        Ok(Self::from_channel(path, device))
    }

    /// Read the line attributes currently in effect.
    pub fn line_settings(&self) -> DriverResult<LineSettings> {
        line::read_settings(self.channel.as_fd(), &self.name)
    }
}

fn open_configured(path: &str, options: Option<&str>) -> DriverResult<DeviceFd> {
    let options = PortOptions::parse(options).map_err(|e| DriverError::config(path, e))?;

    let device = DeviceFd::open(path).map_err(|e| DriverError::io(Operation::Open, path, e))?;
    device
        .clear_nonblocking()
        .map_err(|e| DriverError::io(Operation::Open, path, e))?;

    // `device` is dropped, and so closed, if this fails.
    line::configure(device.as_fd(), path, &options)?;
    Ok(device)
}

impl<C: RawChannel> PortHandle<C> {
    /// Wrap an already prepared channel.
    pub fn from_channel(name: impl Into<String>, channel: C) -> Self {
        Self {
            channel,
            name: name.into(),
        }
    }

    /// The device path or name given at open.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Release the port. Errors from the OS are logged, never returned.
    pub fn close(self) {
        driver_debug!("close {}", self.name);
        if let Err(err) = self.channel.close() {
            warn!(device = %self.name, error = %err, "close failed");
        }
    }

    /// Number of bytes that can be read without blocking.
    pub fn available(&self) -> DriverResult<usize> {
        let count = self
            .channel
            .bytes_available()
            .map_err(|e| self.io_error(Operation::Available, e))?;
        driver_debug!("available: {}", count);
        Ok(count)
    }

    /// Block until one byte arrives. `None` means the channel reported no data.
    pub fn read_byte(&mut self) -> DriverResult<Option<u8>> {
        let mut byte = [0u8; 1];
        let n = loop {
            match self.channel.read_raw(&mut byte) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let err = self.io_error(Operation::Read, e);
                    driver_debug!("read byte failure with error: {}", err);
                    return Err(err);
                }
                Ok(n) => break n,
            }
        };

        let byte = (n > 0).then_some(byte[0]);
        driver_debug!("read byte: {:02X?}", byte);
        Ok(byte)
    }

    /// [`read_byte`](Self::read_byte) with the byte widened to `0..=255` and
    /// no data reported as [`NO_DATA`].
    pub fn read_int(&mut self) -> DriverResult<i32> {
        Ok(self.read_byte()?.map_or(NO_DATA, i32::from))
    }

    /// Fill `buf`, blocking until it is full.
    ///
    /// Reads repeat while the buffer has room and the last call either made
    /// progress or was interrupted. A read returning no data ends the loop
    /// early and the shorter count is returned. Any other error is returned
    /// and the bytes read so far are discarded.
    pub fn read_buffer(&mut self, buf: &mut [u8]) -> DriverResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.channel.read_raw(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    let err = self.io_error(Operation::Read, e);
                    driver_debug!("read byte array failure with error: {}", err);
                    return Err(err);
                }
            }
        }

        driver_debug!("read byte array:{}", hex_dump(&buf[..filled]));
        Ok(filled)
    }

    /// [`read_buffer`](Self::read_buffer) into `buf[offset..offset + length]`.
    pub fn read_into(&mut self, buf: &mut [u8], offset: usize, length: usize) -> DriverResult<usize> {
        let end = self.checked_range(Operation::Read, buf.len(), offset, length)?;
        self.read_buffer(&mut buf[offset..end])
    }

    pub fn write_byte(&mut self, byte: u8) -> DriverResult<()> {
        loop {
            match self.channel.write_raw(&[byte]) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let err = self.io_error(Operation::Write, e);
                    driver_debug!("write byte failure with error: {}", err);
                    return Err(err);
                }
                Ok(_) => break,
            }
        }
        driver_debug!("write byte: {:02X}", byte);
        Ok(())
    }

    /// Write all of `buf`, with the same retry rules as
    /// [`read_buffer`](Self::read_buffer).
    pub fn write_buffer(&mut self, buf: &[u8]) -> DriverResult<()> {
        self.write_all_counted(buf).map(|_| ())
    }

    /// [`write_buffer`](Self::write_buffer) from `buf[offset..offset + length]`.
    pub fn write_from(&mut self, buf: &[u8], offset: usize, length: usize) -> DriverResult<()> {
        let end = self.checked_range(Operation::Write, buf.len(), offset, length)?;
        self.write_buffer(&buf[offset..end])
    }

    /// Block until every byte written so far has left the line.
    pub fn drain(&self) -> DriverResult<()> {
        loop {
            match self.channel.drain() {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    let err = self.io_error(Operation::Drain, e);
                    driver_debug!("drain failure with error: {}", err);
                    return Err(err);
                }
                Ok(()) => break,
            }
        }
        driver_debug!("drain {}", self.name);
        Ok(())
    }

    fn write_all_counted(&mut self, buf: &[u8]) -> DriverResult<usize> {
        let mut written = 0;
        while written < buf.len() {
            match self.channel.write_raw(&buf[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    let err = self.io_error(Operation::Write, e);
                    driver_debug!("write byte array failure with error: {}", err);
                    return Err(err);
                }
            }
        }

        driver_debug!("write byte array:{}", hex_dump(&buf[..written]));
        Ok(written)
    }

    fn io_error(&self, op: Operation, source: io::Error) -> DriverError {
        DriverError::io(op, self.name.clone(), source)
    }

    fn checked_range(
        &self,
        op: Operation,
        buf_len: usize,
        offset: usize,
        length: usize,
    ) -> DriverResult<usize> {
        offset
            .checked_add(length)
            .filter(|end| *end <= buf_len)
            .ok_or_else(|| {
                DriverError::invalid_argument(
                    "buffer",
                    format!(
                        "offset {offset} + length {length} exceeds buffer of {buf_len} bytes \
                         to {op} {}",
                        self.name
                    ),
                )
            })
    }
}

impl<C: RawChannel> io::Read for PortHandle<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_buffer(buf)?)
    }
}

impl<C: RawChannel> io::Write for PortHandle<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_all_counted(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.drain()?)
    }
}

impl AsFd for PortHandle<DeviceFd> {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.channel.as_fd()
    }
}

impl AsRawFd for PortHandle<DeviceFd> {
    fn as_raw_fd(&self) -> RawFd {
        self.channel.as_raw_fd()
    }
}
