//! Transcriber configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the Whisper backed transcriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to the whisper binary.
    #[serde(default = "default_binary")]
    pub binary_path: PathBuf,

    /// Model name to load.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_binary() -> PathBuf {
    PathBuf::from("whisper")
}

fn default_model() -> String {
    "base".to_string()
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            binary_path: default_binary(),
            model: default_model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TranscriberConfig::default();
        assert_eq!(config.binary_path, PathBuf::from("whisper"));
        assert_eq!(config.model, "base");
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            model = "small"
        "#;
        let config: TranscriberConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.model, "small");
        assert_eq!(config.binary_path, PathBuf::from("whisper"));
    }
}
