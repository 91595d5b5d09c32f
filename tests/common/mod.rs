//! Shared test utilities for rawserial integration tests.
//!
//! Provides a pseudo-terminal pair so the driver can be exercised against a
//! real tty without serial hardware, plus helpers for the master side.

#![allow(dead_code)]

use std::ffi::CStr;
use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::{FromRawFd, OwnedFd};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// `ptsname` returns a static buffer.
static PTSNAME_LOCK: Mutex<()> = Mutex::new(());

/// A pseudo-terminal: the master end stays with the test, the slave path is
/// what the driver opens.
pub struct Pty {
    pub master: File,
    pub slave_path: String,
}

/// Allocate a pty pair. Returns `None` when the environment has no
/// `/dev/ptmx`, in which case the calling test should return early.
pub fn open_pty() -> Option<Pty> {
    let fd = unsafe { libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY) };
    if fd < 0 {
        eprintln!("skipping: no pseudo-terminal available");
        return None;
    }
    let master = unsafe { OwnedFd::from_raw_fd(fd) };

    if unsafe { libc::grantpt(fd) } != 0 || unsafe { libc::unlockpt(fd) } != 0 {
        return None;
    }

    let slave_path = {
        let _guard = PTSNAME_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let name = unsafe { libc::ptsname(fd) };
        if name.is_null() {
            return None;
        }
        unsafe { CStr::from_ptr(name) }.to_str().ok()?.to_owned()
    };

    Some(Pty {
        master: File::from(master),
        slave_path,
    })
}

impl Pty {
    /// Read exactly `len` bytes from the master end.
    pub fn read_master(&mut self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.master
            .read_exact(&mut buf)
            .expect("failed to read from pty master");
        buf
    }

    pub fn write_master(&mut self, data: &[u8]) {
        self.master
            .write_all(data)
            .expect("failed to write to pty master");
    }
}

/// Poll `probe` until it returns true or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut probe: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if probe() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    probe()
}

/// Number of descriptors this process has open.
#[cfg(target_os = "linux")]
pub fn open_fd_count() -> usize {
    std::fs::read_dir("/proc/self/fd")
        .map(|entries| entries.count())
        .unwrap_or(0)
}
