//! Supervisor configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the job supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Maximum number of job records retained in memory.
    /// When the cap is reached, the oldest finished records are evicted.
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Enable the reencode stage for video-mode jobs.
    #[serde(default = "default_reencode")]
    pub reencode: bool,

    /// Generate frame thumbnails for video files that report none.
    #[serde(default = "default_thumbnails")]
    pub thumbnails: bool,
}

fn default_max_records() -> usize {
    256
}

fn default_reencode() -> bool {
    true
}

fn default_thumbnails() -> bool {
    true
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            reencode: default_reencode(),
            thumbnails: default_thumbnails(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SupervisorConfig::default();
        assert_eq!(config.max_records, 256);
        assert!(config.reencode);
        assert!(config.thumbnails);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            max_records = 32
            reencode = false
        "#;
        let config: SupervisorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_records, 32);
        assert!(!config.reencode);
        assert!(config.thumbnails);
    }
}
