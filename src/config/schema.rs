//! Configuration schema definitions.
//!
//! Every section carries serde defaults, so a file only needs the keys it
//! changes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Driver defaults
    pub driver: DriverConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Driver section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Enable per-operation debug tracing
    pub debug: bool,
    /// Options string used when none is given on the command line
    pub default_options: Option<String>,
    /// Short names for device paths
    pub port_aliases: HashMap<String, String>,
}

impl DriverConfig {
    /// Resolve a port name through aliases
    pub fn resolve_port(&self, name: &str) -> String {
        self.port_aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive: "trace", "debug", "info", "warn", "error" or a full
    /// `EnvFilter` expression. `RUST_LOG` takes precedence.
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line with colors
    Pretty,
    /// Single line, abbreviated
    #[default]
    Compact,
    /// Single line with all fields
    Full,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.driver.debug);
        assert_eq!(config.driver.default_options, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_port_alias_resolution() {
        let mut config = DriverConfig::default();
        config
            .port_aliases
            .insert("modem".to_string(), "/dev/ttyUSB0".to_string());

        assert_eq!(config.resolve_port("modem"), "/dev/ttyUSB0");
        assert_eq!(config.resolve_port("/dev/ttyS1"), "/dev/ttyS1");
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [driver]
            debug = true
            default_options = "baudrate=9600;autocts=off"

            [driver.port_aliases]
            gps = "/dev/ttyACM0"

            [logging]
            format = "pretty"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.driver.debug);
        assert_eq!(
            config.driver.default_options.as_deref(),
            Some("baudrate=9600;autocts=off")
        );
        assert_eq!(config.driver.resolve_port("gps"), "/dev/ttyACM0");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        // Defaults should still work
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("FULL".parse::<LogFormat>(), Ok(LogFormat::Full));
        assert!("json".parse::<LogFormat>().is_err());
    }
}
