//! Driver error types.
//!
//! Every failure leaves the driver as a [`DriverError`]. Option and line
//! validation problems are [`ConfigError`]s, wrapped with the device name
//! once they surface from [`PortHandle::open`](crate::PortHandle::open).

use std::fmt;
use std::io;
use thiserror::Error;

/// Validation failures in the options string or the requested line settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A key outside the recognised set appeared in the options string.
    #[error("Invalid option {0}")]
    InvalidOption(String),

    #[error("Unsupported baud rate {0}")]
    UnsupportedBaudRate(i32),

    #[error("Unsupported data size {0}")]
    UnsupportedDataSize(i32),

    #[error("Unsupported parity {0:?}")]
    UnsupportedParity(String),

    #[error("Unsupported stop bits {0}")]
    UnsupportedStopBits(i32),
}

/// The driver call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Open,
    Configure,
    Available,
    Read,
    Write,
    Drain,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Open => "open",
            Self::Configure => "configure",
            Self::Available => "query available bytes on",
            Self::Read => "read from",
            Self::Write => "write to",
            Self::Drain => "drain output of",
        };
        f.write_str(verb)
    }
}

/// Errors returned by every driver operation.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A caller-supplied argument was unusable (empty device path, a buffer
    /// range outside the buffer).
    #[error("Invalid parameter {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The options string or the line settings it describes were rejected.
    #[error("Fail to open {device}: {source}")]
    Config {
        device: String,
        #[source]
        source: ConfigError,
    },

    /// The operating system refused an open, ioctl, attribute or transfer call.
    #[error("Fail to {op} {device}: {source}")]
    Io {
        op: Operation,
        device: String,
        #[source]
        source: io::Error,
    },
}

impl DriverError {
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub fn config(device: impl Into<String>, source: ConfigError) -> Self {
        Self::Config {
            device: device.into(),
            source,
        }
    }

    pub fn io(op: Operation, device: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            op,
            device: device.into(),
            source,
        }
    }

    /// Capture `errno` for a failed libc call.
    pub fn last_os(op: Operation, device: impl Into<String>) -> Self {
        Self::io(op, device, io::Error::last_os_error())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// The OS error kind, for I/O failures.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// The validation failure, for configuration errors.
    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            Self::Config { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DriverError> for io::Error {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Io { ref source, .. } => io::Error::new(source.kind(), err.to_string()),
            other => io::Error::new(io::ErrorKind::InvalidInput, other.to_string()),
        }
    }
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
