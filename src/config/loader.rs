//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigFileError, ConfigFileResult};
use super::schema::Config;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "RAWSERIAL";

/// Config file name in the current directory
const LOCAL_CONFIG_FILE_NAME: &str = "rawserial.toml";

/// Config file name inside the per-user config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "RAWSERIAL_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `RAWSERIAL_CONFIG` environment variable (explicit path)
    /// 2. `./rawserial.toml` (current directory)
    /// 3. `$XDG_CONFIG_HOME/rawserial/config.toml` or `~/.config/rawserial/config.toml`
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables can override any config file values.
    pub fn load() -> ConfigFileResult<Self> {
        let config_path = resolve_config_path();

        let mut config = if let Some(ref path) = config_path {
            load_from_file(path)?
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigFileResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ConfigFileError::NotFound(path));
        }
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        // Still apply env overrides even with defaults
        let _ = apply_env_overrides(&mut config);

        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Save the current configuration to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigFileResult<()> {
        save_to_file(&self.config, path.as_ref())
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|path| path.exists())
}

/// Get the platform-specific config directory.
fn get_config_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
}

/// Get the default config file path for creating new config files.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join("rawserial").join(CONFIG_FILE_NAME))
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigFileResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigFileError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigFileError::ParseError)
}

/// Save configuration to a file.
fn save_to_file(config: &Config, path: &Path) -> ConfigFileResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Apply environment variable overrides to the configuration.
///
/// Environment variables follow the pattern `RAWSERIAL_<SECTION>_<KEY>`:
/// - `RAWSERIAL_DRIVER_DEBUG=on`
/// - `RAWSERIAL_DRIVER_OPTIONS=baudrate=9600`
/// - `RAWSERIAL_LOGGING_LEVEL=debug`
/// - `RAWSERIAL_LOGGING_FORMAT=pretty`
fn apply_env_overrides(config: &mut Config) -> ConfigFileResult<()> {
    let debug_var = format!("{}_DRIVER_DEBUG", ENV_PREFIX);
    if let Ok(val) = std::env::var(&debug_var) {
        config.driver.debug = match val.to_ascii_lowercase().as_str() {
            "1" | "true" | "on" => true,
            "0" | "false" | "off" => false,
            _ => return Err(ConfigFileError::env_parse(debug_var, "Expected on/off")),
        };
    }
    if let Ok(val) = std::env::var(format!("{}_DRIVER_OPTIONS", ENV_PREFIX)) {
        config.driver.default_options = Some(val);
    }

    if let Ok(val) = std::env::var(format!("{}_LOGGING_LEVEL", ENV_PREFIX)) {
        config.logging.level = val;
    }
    let format_var = format!("{}_LOGGING_FORMAT", ENV_PREFIX);
    if let Ok(val) = std::env::var(&format_var) {
        config.logging.format = val
            .parse()
            .map_err(|message: String| ConfigFileError::env_parse(format_var, message))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_default_loader() {
        let loader = ConfigLoader::with_defaults();
        assert!(!loader.config().driver.debug);
        assert_eq!(loader.config_path, None);
    }

    #[test]
    #[serial]
    fn test_env_override() {
        env::set_var("RAWSERIAL_DRIVER_DEBUG", "on");
        env::set_var("RAWSERIAL_DRIVER_OPTIONS", "baudrate=4800");

        let loader = ConfigLoader::with_defaults();
        assert!(loader.config().driver.debug);
        assert_eq!(
            loader.config().driver.default_options.as_deref(),
            Some("baudrate=4800")
        );

        env::remove_var("RAWSERIAL_DRIVER_DEBUG");
        env::remove_var("RAWSERIAL_DRIVER_OPTIONS");
    }

    #[test]
    #[serial]
    fn test_bad_env_value_is_reported() {
        env::set_var("RAWSERIAL_LOGGING_FORMAT", "xml");

        let mut config = Config::default();
        let err = apply_env_overrides(&mut config).unwrap_err();
        assert!(matches!(err, ConfigFileError::EnvParseError { .. }));

        env::remove_var("RAWSERIAL_LOGGING_FORMAT");
    }

    #[test]
    #[serial]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rawserial.toml");

        let mut loader = ConfigLoader::with_defaults();
        loader.config.logging.format = LogFormat::Full;
        loader
            .config
            .driver
            .port_aliases
            .insert("console".into(), "/dev/ttyS0".into());
        loader.save_to(&path).unwrap();

        let reloaded = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(reloaded.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(reloaded.config().logging.format, LogFormat::Full);
        assert_eq!(reloaded.config().driver.resolve_port("console"), "/dev/ttyS0");
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_from("/nonexistent/rawserial.toml").unwrap_err();
        assert!(matches!(err, ConfigFileError::NotFound(_)));
    }
}
