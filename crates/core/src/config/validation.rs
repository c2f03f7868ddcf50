//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `search_timeout_ms` is shorter than `timeout_ms` or exceeds 5 minutes
    /// - `max_attempts` is outside 1-10
    /// - `page_size` is outside 1-100
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.search_timeout_ms < self.timeout_ms {
            return Err(ConfigError::Invalid {
                field: "search_timeout_ms".into(),
                reason: "must not be shorter than timeout_ms".into(),
            });
        }
        if self.search_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "search_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if !(1..=10).contains(&self.max_attempts) {
            return Err(ConfigError::Invalid { field: "max_attempts".into(), reason: "must be between 1 and 10".into() });
        }

        if !(1..=100).contains(&self.page_size) {
            return Err(ConfigError::Invalid { field: "page_size".into(), reason: "must be between 1 and 100".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.gutenberg.api_key.is_some() && self.gutenberg.base_url.as_deref().is_none_or(str::is_empty) {
            tracing::warn!("gutenberg.api_key is set but gutenberg.base_url is empty; text catalog stays disabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, search_timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_search_timeout_shorter_than_request() {
        let config = AppConfig { timeout_ms: 30_000, search_timeout_ms: 10_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "search_timeout_ms"));
    }

    #[test]
    fn test_validate_max_attempts() {
        let config = AppConfig { max_attempts: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_attempts"));

        let config = AppConfig { max_attempts: 11, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_attempts"));
    }

    #[test]
    fn test_validate_page_size() {
        let config = AppConfig { page_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "page_size"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            timeout_ms: 100,
            search_timeout_ms: 100,
            max_attempts: 1,
            page_size: 1,
            ..Default::default()
        }; // minimum valid values
        assert!(config.validate().is_ok());
    }
}
