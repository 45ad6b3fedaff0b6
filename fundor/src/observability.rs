//! Logging setup.
//!
//! The library itself only emits `tracing` events. Applications that have no
//! subscriber of their own can install one with [`init_logging`].

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

pub const LOG_LEVEL_VAR: &str = "FUNDOR_LOG_LEVEL";
pub const LOG_FORMAT_VAR: &str = "FUNDOR_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = dotenvy::var(LOG_LEVEL_VAR) {
            config.level = level.trim().to_lowercase();
        }
        if let Ok(format) = dotenvy::var(LOG_FORMAT_VAR) {
            config.format = match format.trim().to_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            };
        }
        config
    }
}

/// Installs a global fmt subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    installed.map_err(|e| Error::misconfigured(format!("failed to install subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        unsafe {
            std::env::set_var(LOG_LEVEL_VAR, "DEBUG");
            std::env::set_var(LOG_FORMAT_VAR, "json");
        }
        let config = LogConfig::from_env();
        unsafe {
            std::env::remove_var(LOG_LEVEL_VAR);
            std::env::remove_var(LOG_FORMAT_VAR);
        }

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn test_second_init_fails() {
        let config = LogConfig::default();
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
