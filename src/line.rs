//! Line configuration: maps [`PortOptions`] onto termios attributes and
//! programs an open descriptor.
//!
//! The platform speed and flag constants stay in this module. Everything
//! outside it deals in [`DataBits`], [`Parity`], [`StopBits`] and plain baud
//! numbers.

use crate::error::{ConfigError, DriverError, DriverResult, Operation};
use crate::options::{DataBits, Parity, PortOptions, StopBits};
use crate::trace::driver_debug;
use libc::{speed_t, tcflag_t, termios};
use std::fmt;
use std::os::fd::{AsRawFd, BorrowedFd};
use tracing::warn;

/// Semantic baud rate to platform speed constant.
const SPEED_TABLE: [(i32, speed_t); 8] = [
    (1200, libc::B1200),
    (2400, libc::B2400),
    (4800, libc::B4800),
    (9600, libc::B9600),
    (19200, libc::B19200),
    (38400, libc::B38400),
    (57600, libc::B57600),
    (115200, libc::B115200),
];

/// Character size to `CSIZE` value.
const CHAR_SIZE_TABLE: [(DataBits, tcflag_t); 2] =
    [(DataBits::Seven, libc::CS7), (DataBits::Eight, libc::CS8)];

/// Look up the platform speed constant for a baud rate.
pub fn speed_for(baud_rate: i32) -> Option<speed_t> {
    SPEED_TABLE
        .iter()
        .find(|(baud, _)| *baud == baud_rate)
        .map(|(_, speed)| *speed)
}

/// Reverse of [`speed_for`].
pub fn baud_for(speed: speed_t) -> Option<i32> {
    SPEED_TABLE
        .iter()
        .find(|(_, s)| *s == speed)
        .map(|(baud, _)| *baud)
}

fn char_size_flag(bits: DataBits) -> tcflag_t {
    CHAR_SIZE_TABLE
        .iter()
        .find(|(b, _)| *b == bits)
        .map(|(_, flag)| *flag)
        .unwrap_or(libc::CS8)
}

/// Program `fd` according to `options`.
///
/// The descriptor is left open on failure; closing it is up to the caller.
pub fn configure(fd: BorrowedFd<'_>, device: &str, options: &PortOptions) -> DriverResult<()> {
    let mut attrs = get_attributes(fd, device)?;
    derive_attributes(&mut attrs, options, device)?;
    set_attributes(fd, device, &attrs)
}

/// Rewrite `attrs` for a raw, blocking line with the requested settings.
///
/// Checks run in a fixed order (baud rate, data size, parity, stop bits) and
/// the first failure is returned.
pub fn derive_attributes(
    attrs: &mut termios,
    options: &PortOptions,
    device: &str,
) -> DriverResult<()> {
    let config_err = |e| DriverError::config(device, e);

    unsafe { libc::cfmakeraw(attrs) };
    attrs.c_cflag |= libc::CLOCAL | libc::CREAD;

    driver_debug!("set baudrate: {}", options.baud_rate);
    let speed = speed_for(options.baud_rate)
        .ok_or_else(|| config_err(ConfigError::UnsupportedBaudRate(options.baud_rate)))?;
    let rc = unsafe { libc::cfsetispeed(attrs, speed) + libc::cfsetospeed(attrs, speed) };
    if rc != 0 {
        return Err(DriverError::last_os(Operation::Configure, device));
    }

    driver_debug!("set bitsperchar: {}", options.bits_per_char);
    let data_bits = options.data_bits().map_err(config_err)?;
    attrs.c_cflag &= !libc::CSIZE;
    attrs.c_cflag |= char_size_flag(data_bits);

    driver_debug!("set parity: {}", options.parity);
    match options.parity().map_err(config_err)? {
        Parity::None => attrs.c_cflag &= !libc::PARENB,
        Parity::Odd => attrs.c_cflag |= libc::PARENB | libc::PARODD,
        Parity::Even => {
            attrs.c_cflag |= libc::PARENB;
            attrs.c_cflag &= !libc::PARODD;
        }
    }

    driver_debug!("set stopbits: {}", options.stop_bits);
    match options.stop_bits().map_err(config_err)? {
        StopBits::One => attrs.c_cflag &= !libc::CSTOPB,
        StopBits::Two => attrs.c_cflag |= libc::CSTOPB,
    }

    if !options.blocking {
        warn!(device, "blocking=off not supported yet, port stays blocking");
    }

    attrs.c_cc[libc::VMIN] = 1;
    attrs.c_cc[libc::VTIME] = 0;

    if options.hardware_flow_control() {
        driver_debug!("RTS/CTS enabled");
        attrs.c_cflag |= libc::CRTSCTS;
    } else {
        driver_debug!("RTS/CTS disabled");
        attrs.c_cflag &= !libc::CRTSCTS;
    }

    attrs.c_cflag |= libc::CLOCAL | libc::CREAD;
    attrs.c_iflag &= !(libc::IXON | libc::IXOFF | libc::IXANY);

    Ok(())
}

pub(crate) fn get_attributes(fd: BorrowedFd<'_>, device: &str) -> DriverResult<termios> {
    let mut attrs: termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd.as_raw_fd(), &mut attrs) } == -1 {
        return Err(DriverError::last_os(Operation::Configure, device));
    }
    Ok(attrs)
}

fn set_attributes(fd: BorrowedFd<'_>, device: &str, attrs: &termios) -> DriverResult<()> {
    if unsafe { libc::tcsetattr(fd.as_raw_fd(), libc::TCSANOW, attrs) } == -1 {
        return Err(DriverError::last_os(Operation::Configure, device));
    }
    Ok(())
}

/// Read the current attributes of `fd` back as [`LineSettings`].
pub fn read_settings(fd: BorrowedFd<'_>, device: &str) -> DriverResult<LineSettings> {
    get_attributes(fd, device).map(|attrs| LineSettings::from_attributes(&attrs))
}

/// Effective line settings decoded from a termios structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    /// `None` when the input speed is not one of the supported rates.
    pub baud_rate: Option<i32>,
    /// 5 to 8.
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub hardware_flow_control: bool,
    pub software_flow_control: bool,
    /// Canonical input, echo and signal characters all off.
    pub raw: bool,
    pub min_read: u8,
    pub read_timeout: u8,
}

impl LineSettings {
    pub fn from_attributes(attrs: &termios) -> Self {
        let cflag = attrs.c_cflag;
        let data_bits = match cflag & libc::CSIZE {
            libc::CS5 => 5,
            libc::CS6 => 6,
            libc::CS7 => 7,
            _ => 8,
        };
        let parity = if cflag & libc::PARENB == 0 {
            Parity::None
        } else if cflag & libc::PARODD != 0 {
            Parity::Odd
        } else {
            Parity::Even
        };
        let stop_bits = if cflag & libc::CSTOPB != 0 {
            StopBits::Two
        } else {
            StopBits::One
        };

        Self {
            baud_rate: baud_for(unsafe { libc::cfgetispeed(attrs) }),
            data_bits,
            parity,
            stop_bits,
            hardware_flow_control: cflag & libc::CRTSCTS != 0,
            software_flow_control: attrs.c_iflag & (libc::IXON | libc::IXOFF) != 0,
            raw: attrs.c_lflag & (libc::ICANON | libc::ECHO | libc::ISIG) == 0,
            min_read: attrs.c_cc[libc::VMIN],
            read_timeout: attrs.c_cc[libc::VTIME],
        }
    }
}

impl fmt::Display for LineSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.baud_rate {
            Some(baud) => write!(f, "{baud}")?,
            None => f.write_str("?")?,
        }
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        write!(f, " {}{}{}", self.data_bits, parity, i32::from(self.stop_bits))?;
        if self.hardware_flow_control {
            f.write_str(" rtscts")?;
        }
        if self.software_flow_control {
            f.write_str(" xonxoff")?;
        }
        Ok(())
    }
}
