//! Configuration for the `rawserial` command-line tool.
//!
//! The driver itself is configured per port through options strings; this
//! module only supplies the tool's defaults (debug tracing, default options,
//! port aliases, logging) from a TOML file with environment overrides.
//!
//! # Configuration Resolution
//!
//! 1. `RAWSERIAL_CONFIG` environment variable (explicit path)
//! 2. `./rawserial.toml` (current directory)
//! 3. `~/.config/rawserial/config.toml` (XDG)
//! 4. Built-in defaults (no file required)
//!
//! # Example
//!
//! ```toml
//! [driver]
//! debug = false
//! default_options = "baudrate=115200;autocts=off;autorts=off"
//!
//! [driver.port_aliases]
//! modem = "/dev/ttyUSB0"
//!
//! [logging]
//! level = "info"
//! format = "compact"
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigFileError, ConfigFileResult};
pub use loader::{get_default_config_path, resolve_config_path, ConfigLoader};
pub use schema::{Config, DriverConfig, LogFormat, LoggingConfig};
