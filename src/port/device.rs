//! A serial character device accessed through its raw file descriptor.

use super::channel::RawChannel;
use std::fs::OpenOptions;
use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;

/// An open tty descriptor. Dropping it closes the descriptor.
#[derive(Debug)]
pub struct DeviceFd {
    fd: OwnedFd,
}

impl DeviceFd {
    /// Open `path` read-write without making it the controlling terminal.
    ///
    /// The open itself is non-blocking so it cannot hang waiting for carrier
    /// detect; call [`clear_nonblocking`](Self::clear_nonblocking) afterwards.
    pub fn open(path: &str) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)?;
        Ok(Self { fd: file.into() })
    }

    /// Reset the file status flags so reads and writes block.
    pub fn clear_nonblocking(&self) -> io::Result<()> {
        if unsafe { libc::fcntl(self.fd.as_raw_fd(), libc::F_SETFL, 0) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl RawChannel for DeviceFd {
    fn read_raw(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    fn write_raw(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(self.fd.as_raw_fd(), buf.as_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    fn bytes_available(&self) -> io::Result<usize> {
        let mut count: libc::c_int = 0;
        let rc = unsafe {
            libc::ioctl(
                self.fd.as_raw_fd(),
                libc::FIONREAD as _,
                &mut count as *mut libc::c_int,
            )
        };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(count.max(0) as usize)
    }

    fn drain(&self) -> io::Result<()> {
        if unsafe { libc::tcdrain(self.fd.as_raw_fd()) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn close(self) -> io::Result<()> {
        let raw = self.fd.into_raw_fd();
        if unsafe { libc::close(raw) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl AsFd for DeviceFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

impl AsRawFd for DeviceFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}
