//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LISTENUP_*)
//! 2. TOML config file (if LISTENUP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::resilience::RetryPolicy;

mod validation;

pub use validation::ConfigError;

/// Connection settings for the text catalog (Gutenberg books API).
///
/// The catalog sits behind an API gateway; without a base URL and an API key
/// the text source is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GutenbergSettings {
    /// Set via LISTENUP_GUTENBERG__BASE_URL.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Header carrying the API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Set via LISTENUP_GUTENBERG__API_KEY.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_host_header")]
    pub host_header: String,

    /// Value for the gateway host header, sent only when set.
    #[serde(default)]
    pub host_value: Option<String>,
}

fn default_api_key_header() -> String {
    "X-RapidAPI-Key".into()
}

fn default_host_header() -> String {
    "X-RapidAPI-Host".into()
}

impl Default for GutenbergSettings {
    fn default() -> Self {
        Self {
            base_url: Some("https://project-gutenberg-books-api.p.rapidapi.com".into()),
            api_key_header: default_api_key_header(),
            api_key: None,
            host_header: default_host_header(),
            host_value: Some("project-gutenberg-books-api.p.rapidapi.com".into()),
        }
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LISTENUP_*)
/// 2. TOML config file (if LISTENUP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via LISTENUP_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for catalog requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for a single catalog request in milliseconds.
    ///
    /// Set via LISTENUP_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Deadline for a whole search, retries included, in milliseconds.
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,

    /// Total search attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff after the first failed attempt, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Age after which cached searches count as a miss.
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,

    /// Results requested from each catalog.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub gutenberg: GutenbergSettings,

    #[serde(default = "default_librivox_base_url")]
    pub librivox_base_url: String,

    #[serde(default = "default_openlibrary_base_url")]
    pub openlibrary_base_url: String,

    #[serde(default = "default_covers_base_url")]
    pub covers_base_url: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./listenup-cache.sqlite")
}

fn default_user_agent() -> String {
    "listenup/0.1".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_search_timeout_ms() -> u64 {
    45_000
}

fn default_max_attempts() -> u32 {
    4
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_cache_max_age_secs() -> u64 {
    86_400 // 24h
}

fn default_page_size() -> usize {
    12
}

fn default_librivox_base_url() -> String {
    "https://librivox.org/api/feed".into()
}

fn default_openlibrary_base_url() -> String {
    "https://openlibrary.org".into()
}

fn default_covers_base_url() -> String {
    "https://covers.openlibrary.org".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            search_timeout_ms: default_search_timeout_ms(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            cache_max_age_secs: default_cache_max_age_secs(),
            page_size: default_page_size(),
            gutenberg: GutenbergSettings::default(),
            librivox_base_url: default_librivox_base_url(),
            openlibrary_base_url: default_openlibrary_base_url(),
            covers_base_url: default_covers_base_url(),
        }
    }
}

impl AppConfig {
    /// Per-request timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }

    /// Retry policy wrapped around a whole search.
    pub fn search_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.search_timeout_ms),
        )
    }

    /// API key header pair for the text catalog, if fully configured.
    pub fn gutenberg_auth(&self) -> Option<(&str, &str)> {
        let name = self.gutenberg.api_key_header.trim();
        let value = self.gutenberg.api_key.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() || value.is_empty() { None } else { Some((name, value)) }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LISTENUP_`
    /// 2. TOML file from `LISTENUP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("LISTENUP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        Self::extract(figment.merge(Self::env()))
    }

    fn env() -> Env {
        Env::prefixed("LISTENUP_")
            .ignore(&["CONFIG_FILE"])
            .map(|key| key.as_str().to_lowercase().into())
            .split("__")
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
