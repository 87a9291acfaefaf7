use serde::{Deserialize, Serialize};

/// Configuration for usage resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Identifiers looked up per catalog round-trip. Bounds how long a
    /// cancellation request can go unnoticed.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Never report packages indexed from inside the consuming project
    #[serde(default = "default_exclude_project_location")]
    pub exclude_project_location: bool,
}

fn default_batch_size() -> usize {
    500
}

fn default_exclude_project_location() -> bool {
    true
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            exclude_project_location: default_exclude_project_location(),
        }
    }
}

impl UsageConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = UsageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 500);
        assert!(config.exclude_project_location);
    }

    #[test]
    fn test_zero_batch_rejected() {
        let config = UsageConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
