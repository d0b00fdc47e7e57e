use super::{types::Config, ConfigError};

/// Validate a parsed configuration.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Invalid(
            "server.port must be non-zero".to_string(),
        ));
    }

    if config.supervisor.max_records == 0 {
        return Err(ConfigError::Invalid(
            "supervisor.max_records must be at least 1".to_string(),
        ));
    }

    if config.reencoder.crf > 51 {
        return Err(ConfigError::Invalid(format!(
            "reencoder.crf must be in 0..=51, got {}",
            config.reencoder.crf
        )));
    }

    if config.transcriber.model.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "transcriber.model must not be empty".to_string(),
        ));
    }

    if config.fetcher.filename_template.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "fetcher.filename_template must not be empty".to_string(),
        ));
    }

    Ok(())
}
