//! Configuration loading and validation.

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str};
pub use types::{Config, OutputConfig, ServerConfig};
pub use validate::validate_config;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration parsed but contains invalid values.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
