//! rawserial: a native termios serial-port driver.
//!
//! Opens a tty, programs it from a `key=value;...` options string and offers
//! blocking byte and buffer I/O that rides out short transfers and signal
//! interruptions.
//!
//! # Modules
//!
//! - `options`: options-string parsing into [`PortOptions`]
//! - `line`: termios attribute derivation and programming
//! - `port`: [`PortHandle`] and the channel seam beneath it
//! - `error`: [`DriverError`] and [`ConfigError`]
//! - `trace`: process-wide debug tracing switch
//! - `config`: TOML configuration for the command-line tool
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use rawserial::PortHandle;
//!
//! rawserial::set_debug_enabled(true);
//! let mut port = PortHandle::open("/dev/ttyUSB0", Some("baudrate=115200;parity=even"))?;
//! port.write_buffer(b"hello")?;
//! let mut reply = [0u8; 5];
//! let n = port.read_buffer(&mut reply)?;
//! println!("{} bytes back, line is {}", n, port.line_settings()?);
//! port.close();
//! # Ok::<(), rawserial::DriverError>(())
//! ```

#[cfg(not(unix))]
compile_error!("rawserial drives termios devices and only builds on Unix targets");

pub mod config;
pub mod error;
pub mod line;
pub mod logging;
pub mod options;
pub mod port;
pub mod trace;

pub use error::{ConfigError, DriverError, DriverResult, Operation};
pub use line::LineSettings;
pub use options::{DataBits, Parity, PortOptions, StopBits, SUPPORTED_BAUD_RATES};
pub use port::{DeviceFd, MockChannel, PortHandle, RawChannel, NO_DATA};
pub use trace::{debug_enabled, set_debug_enabled};

pub use config::{Config, ConfigFileError, ConfigFileResult, ConfigLoader};
