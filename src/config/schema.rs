//! Configuration schema for Mushaf
//!
//! Configuration is stored at `~/.config/mushaf/config.toml`

use crate::error::{MushafError, MushafResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache bounds and lifetimes
    pub cache: CacheConfig,

    /// Remote fetch policy
    pub fetch: FetchConfig,

    /// Navigation token and content limits
    pub navigation: NavigationConfig,

    /// Remote endpoints
    pub endpoints: EndpointsConfig,

    /// Free-text search
    pub search: SearchConfig,
}

/// One year; longer lifetimes are treated as a typo
pub const MAX_TTL_MINUTES: u64 = 365 * 24 * 60;

impl Config {
    /// Reject values that would break cache bounds or the retry loop
    pub fn validate(&self) -> MushafResult<()> {
        if self.cache.max_cache_entries == 0 {
            return Err(MushafError::config_value(
                "cache.max_cache_entries",
                "must be at least 1",
            ));
        }
        if self.cache.max_image_entries == 0 {
            return Err(MushafError::config_value(
                "cache.max_image_entries",
                "must be at least 1",
            ));
        }
        if self.cache.ttl_minutes == 0 {
            return Err(MushafError::config_value(
                "cache.ttl_minutes",
                "must be at least 1",
            ));
        }
        if self.cache.ttl_minutes > MAX_TTL_MINUTES {
            return Err(MushafError::config_value(
                "cache.ttl_minutes",
                format!("must be at most {MAX_TTL_MINUTES}"),
            ));
        }
        if self.fetch.max_attempts == 0 {
            return Err(MushafError::config_value(
                "fetch.max_attempts",
                "must be at least 1",
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(MushafError::config_value(
                "fetch.timeout_secs",
                "must be at least 1",
            ));
        }
        if self.fetch.backoff_min_secs > self.fetch.backoff_max_secs {
            return Err(MushafError::config_value(
                "fetch.backoff_min_secs",
                format!(
                    "{} exceeds fetch.backoff_max_secs ({})",
                    self.fetch.backoff_min_secs, self.fetch.backoff_max_secs
                ),
            ));
        }
        if self.navigation.max_token_bytes < 8 {
            return Err(MushafError::config_value(
                "navigation.max_token_bytes",
                "must be at least 8",
            ));
        }
        if self.navigation.max_chunk_bytes == 0 {
            return Err(MushafError::config_value(
                "navigation.max_chunk_bytes",
                "must be at least 1",
            ));
        }
        if self.navigation.page_size == 0 {
            return Err(MushafError::config_value(
                "navigation.page_size",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of catalog entries in minutes
    pub ttl_minutes: u64,

    /// Maximum entries per catalog cache
    pub max_cache_entries: usize,

    /// Maximum page images held in memory
    pub max_image_entries: usize,

    /// Drop expired entries every N seconds (0 = lazy expiry only)
    pub sweep_interval_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            max_cache_entries: 150,
            max_image_entries: 20,
            sweep_interval_secs: 0,
        }
    }
}

/// Remote fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Attempts before giving up
    pub max_attempts: u32,

    /// First backoff delay in seconds
    pub backoff_min_secs: u64,

    /// Backoff ceiling in seconds
    pub backoff_max_secs: u64,

    /// Retry 5xx responses and stop immediately on 4xx
    ///
    /// Off by default: non-2xx responses are returned to the caller
    /// without retrying, and only transport errors are retried.
    pub retry_server_errors: bool,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 3,
            backoff_min_secs: 2,
            backoff_max_secs: 10,
            retry_server_errors: false,
        }
    }
}

/// Navigation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Button payload limit of the chat transport
    pub max_token_bytes: usize,

    /// Largest text chunk sent in one message
    pub max_chunk_bytes: usize,

    /// Items per listing page
    pub page_size: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_token_bytes: 64,
            max_chunk_bytes: 4000,
            page_size: 10,
        }
    }
}

/// Remote endpoint configuration
///
/// Templates use `{surah}`, `{page}`, `{reciter_id}` and `{reciter}`
/// placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Base URL of the text API
    pub text_api: String,

    /// Text edition requested for surah contents
    pub text_edition: String,

    /// Reciter list
    pub reciters: String,

    /// Audio list of one reciter
    pub reciter_audio: String,

    /// Fallback audio URL for a reciter and surah
    pub surah_audio: String,

    /// Page image URL
    pub page_image: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            text_api: "https://api.alquran.cloud/v1".to_string(),
            text_edition: "ar.alafasy".to_string(),
            reciters: "https://quran.yousefheiba.com/api/reciters".to_string(),
            reciter_audio: "https://quran.yousefheiba.com/api/reciterAudio?reciter_id={reciter_id}"
                .to_string(),
            surah_audio: "https://quran.yousefheiba.com/api/surahAudio?reciter={reciter}&id={surah}"
                .to_string(),
            page_image: "https://quran.yousefheiba.com/api/quran-pages/{page}.png".to_string(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Generation endpoint
    pub url: String,

    /// API key (search is disabled without one)
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Shortest accepted query
    pub min_query_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
                .to_string(),
            api_key: None,
            timeout_secs: 45,
            min_query_chars: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[navigation]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.ttl_minutes, 30);
        assert_eq!(config.navigation.max_token_bytes, 64);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [fetch]
            max_attempts = 5
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.fetch.max_attempts, 5);
        assert_eq!(config.fetch.backoff_min_secs, 2); // default preserved
    }

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn validate_rejects_inverted_backoff() {
        let mut config = Config::default();
        config.fetch.backoff_min_secs = 20;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fetch.backoff_min_secs"));
    }

    #[test]
    fn huge_ttl_is_rejected_without_overflow() {
        let mut config = Config::default();
        config.cache.ttl_minutes = u64::MAX;
        assert_eq!(config.cache.ttl(), Duration::from_secs(u64::MAX));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cache.ttl_minutes"));

        config.cache.ttl_minutes = MAX_TTL_MINUTES;
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut config = Config::default();
        config.cache.max_image_entries = 0;
        assert!(config.validate().is_err());
    }
}
