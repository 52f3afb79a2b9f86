//! Tracing subscriber setup shared by binaries.

use std::collections::HashMap;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{env_var, AppConfigTrait, ConfigError, ConfigSource, Environment};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive (e.g. "info", "tessera_orm=debug")
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl AppConfigTrait for LoggingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env()?;

        let level = env_var("LOG_LEVEL").unwrap_or_else(|| environment.default_log_level().to_string());

        let json_format = match env_var("LOG_FORMAT").as_deref() {
            None | Some("text") | Some("pretty") => environment.is_production(),
            Some("json") => true,
            Some(other) => {
                return Err(ConfigError::invalid_value("LOG_FORMAT", other, "json or text"));
            }
        };

        let config = Self { level, json_format };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| ConfigError::invalid_value("log_level", &self.level, e.to_string()))
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert(
            "level".to_string(),
            ConfigSource::env_or_default("LOG_LEVEL", "per environment"),
        );
        sources.insert(
            "json_format".to_string(),
            ConfigSource::env_or_default("LOG_FORMAT", "text outside production"),
        );
        sources
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once returns an error from the subscriber registry.
pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    tracing::debug!(level = %config.level, json = config.json_format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn test_from_env_defaults_follow_environment() {
        env::remove_var("LOG_LEVEL");
        env::remove_var("LOG_FORMAT");
        env::set_var("ENVIRONMENT", "production");

        let config = LoggingConfig::from_env().unwrap();
        assert_eq!(config.level, "info");
        assert!(config.json_format);

        env::remove_var("ENVIRONMENT");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_format() {
        env::set_var("LOG_FORMAT", "xml");
        let err = LoggingConfig::from_env().unwrap_err();
        assert_eq!(err.field(), "LOG_FORMAT");
        env::remove_var("LOG_FORMAT");
    }

    #[test]
    fn test_validate_rejects_bad_filter() {
        let config = LoggingConfig {
            level: "tessera_orm=loud".to_string(),
            json_format: false,
        };
        assert!(config.validate().is_err());
        assert!(LoggingConfig::default().validate().is_ok());
    }
}
