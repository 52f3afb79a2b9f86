use std::fmt;

use crate::config::env_var;

/// Where a resolved setting was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from the named environment variable
    EnvVar(String),
    /// Variable unset or empty; the fallback is recorded
    Default(String),
}

impl ConfigSource {
    /// `EnvVar` when `var` holds a non-empty value, `Default(default)` otherwise
    pub fn env_or_default(var: &str, default: impl Into<String>) -> Self {
        match env_var(var) {
            Some(_) => ConfigSource::EnvVar(var.to_string()),
            None => ConfigSource::Default(default.into()),
        }
    }

    pub fn is_env_var(&self) -> bool {
        matches!(self, ConfigSource::EnvVar(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ConfigSource::Default(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::EnvVar(var) => write!(f, "env {}", var),
            ConfigSource::Default(value) => write!(f, "default ({})", value),
        }
    }
}
