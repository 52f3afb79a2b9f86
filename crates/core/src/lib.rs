//! # tessera-core
//!
//! Environment-driven configuration plumbing and tracing setup shared by the
//! tessera crates.

pub mod config;
pub mod logging;

pub use config::{
    env_or, env_var, parse_env, AppConfigTrait, ConfigError, ConfigSource, ConfigValidator,
    Environment, NonEmptyValidator, PortValidator,
};
pub use logging::LoggingConfig;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
