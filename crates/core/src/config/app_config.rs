use crate::config::{ConfigError, ConfigSource};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Configuration trait for environment-driven configuration structs
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue {
                field: "environment".to_string(),
                value: s.to_string(),
                expected: "development, testing, or production".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    /// Read `ENVIRONMENT`, defaulting to development
    pub fn from_env() -> Result<Self, ConfigError> {
        match env_var("ENVIRONMENT") {
            Some(value) => value.parse(),
            None => Ok(Environment::Development),
        }
    }

    /// Check if environment is production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Default log filter for this environment
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Testing => "warn",
            Environment::Production => "info",
        }
    }
}

/// Read an environment variable, treating empty values as unset
pub fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Read an environment variable or fall back to `default`
pub fn env_or(name: &str, default: &str) -> String {
    env_var(name).unwrap_or_else(|| default.to_string())
}

/// Read and parse an environment variable
///
/// Returns `Ok(None)` when the variable is unset and an `InvalidValue` error
/// naming the variable when it is set but does not parse.
pub fn parse_env<T: FromStr>(name: &str, expected: &str) -> Result<Option<T>, ConfigError> {
    match env_var(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::invalid_value(name, raw, expected)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("Testing".parse::<Environment>().unwrap(), Environment::Testing);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    #[serial]
    fn test_env_var_treats_empty_as_unset() {
        env::set_var("TESSERA_CORE_TEST_EMPTY", "");
        assert_eq!(env_var("TESSERA_CORE_TEST_EMPTY"), None);
        assert_eq!(env_or("TESSERA_CORE_TEST_EMPTY", "fallback"), "fallback");
        env::remove_var("TESSERA_CORE_TEST_EMPTY");
    }

    #[test]
    #[serial]
    fn test_parse_env_reports_variable_name() {
        env::set_var("TESSERA_CORE_TEST_PORT", "not-a-port");
        let err = parse_env::<u16>("TESSERA_CORE_TEST_PORT", "port number").unwrap_err();
        assert_eq!(err.field(), "TESSERA_CORE_TEST_PORT");

        env::set_var("TESSERA_CORE_TEST_PORT", "5432");
        assert_eq!(
            parse_env::<u16>("TESSERA_CORE_TEST_PORT", "port number").unwrap(),
            Some(5432)
        );

        env::remove_var("TESSERA_CORE_TEST_PORT");
        assert_eq!(
            parse_env::<u16>("TESSERA_CORE_TEST_PORT", "port number").unwrap(),
            None
        );
    }
}
