//! Tracing subscriber setup for the command-line tool.

use crate::config::{LogFormat, LoggingConfig};
use std::sync::Once;
use tracing_subscriber::{prelude::*, EnvFilter};

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn do_init(config: &LoggingConfig) {
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry();

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(layer.pretty().with_filter(filter(config)))
            .try_init(),
        LogFormat::Compact => registry
            .with(layer.compact().with_filter(filter(config)))
            .try_init(),
        LogFormat::Full => registry.with(layer.with_filter(filter(config))).try_init(),
    };

    // Someone else installed a global subscriber first; theirs stays.
    let _ = result;
}

/// Initialize tracing.
///
/// Will only initialize once, so tests may call this.
pub fn init(config: &LoggingConfig) {
    static INIT: Once = Once::new();
    INIT.call_once(|| do_init(config));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LoggingConfig::default();
        init(&config);
        init(&config);
        tracing::info!("logging initialised");
    }

    #[test]
    fn test_bad_level_falls_back() {
        let config = LoggingConfig {
            level: "[[not a filter".to_string(),
            ..LoggingConfig::default()
        };
        let _ = filter(&config);
    }
}
