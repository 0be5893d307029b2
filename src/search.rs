//! Free-text search through a remote generation API

use crate::config::schema::SearchConfig;
use crate::error::{MushafError, MushafResult};
use crate::fetch::{FetchRequest, ResilientFetcher};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable consulted when no key is configured
pub const API_KEY_ENV: &str = "MUSHAF_SEARCH_API_KEY";

/// Answers a free-text query with display text
#[async_trait]
pub trait SearchResolver: Send + Sync {
    async fn search(&self, query: &str) -> MushafResult<String>;

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Resolver used when no API key is available
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSearch;

#[async_trait]
impl SearchResolver for DisabledSearch {
    async fn search(&self, _query: &str) -> MushafResult<String> {
        Err(MushafError::FeatureDisabled("search".to_string()))
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Resolver backed by the configured generation endpoint
pub struct RemoteSearch {
    fetcher: ResilientFetcher,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl RemoteSearch {
    pub fn new(fetcher: ResilientFetcher, config: &SearchConfig, api_key: String) -> Self {
        Self {
            fetcher,
            url: config.url.clone(),
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn prompt(query: &str) -> String {
        format!(
            "Search the Quran for: \"{query}\"\n\
             For every result give:\n\
             1. the surah and verse number\n\
             2. the verse text\n\
             3. a short explanation\n\
             Answer in Arabic only."
        )
    }
}

#[async_trait]
impl SearchResolver for RemoteSearch {
    async fn search(&self, query: &str) -> MushafResult<String> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": Self::prompt(query) }] }],
            "generationConfig": { "temperature": 0.7, "maxOutputTokens": 1024 }
        });
        let url = format!("{}?key={}", self.url, self.api_key);
        let request = FetchRequest::post_json("search", url, &payload, self.timeout)?;

        let response = self.fetcher.fetch(&request).await?;
        if !response.is_success() {
            warn!(status = response.status, "Search request rejected");
            return Err(MushafError::unavailable("search results"));
        }

        let parsed: GenerateResponse = response.json()?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| MushafError::NotFound(format!("results for '{query}'")))?;

        debug!(chars = text.chars().count(), "Search answered");
        Ok(text)
    }
}

/// Pick the key from config, then the environment
pub fn resolve_api_key(config: &SearchConfig) -> Option<String> {
    config
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::ScriptedTransport;
    use crate::fetch::RetryPolicy;
    use serial_test::serial;
    use std::sync::Arc;

    fn remote(transport: Arc<ScriptedTransport>) -> RemoteSearch {
        let fetcher = ResilientFetcher::new(transport, RetryPolicy::default());
        RemoteSearch::new(fetcher, &SearchConfig::default(), "k3y".to_string())
    }

    #[tokio::test]
    async fn extracts_first_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Al-Fatiha 1:1"}]}}]}"#;
        let transport = Arc::new(ScriptedTransport::new(ScriptedTransport::ok(body)));

        let answer = remote(transport.clone()).search("mercy").await.unwrap();

        assert_eq!(answer, "Al-Fatiha 1:1");
        assert!(transport.calls()[0].ends_with("?key=k3y"));
    }

    #[tokio::test]
    async fn no_candidates_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new(ScriptedTransport::ok(
            r#"{"candidates":[]}"#,
        )));
        let err = remote(transport).search("mercy").await.unwrap_err();
        assert!(matches!(err, MushafError::NotFound(_)));
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let transport = Arc::new(ScriptedTransport::new(ScriptedTransport::status(500)));
        let err = remote(transport).search("mercy").await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn disabled_search_reports_feature_disabled() {
        let err = DisabledSearch.search("anything").await.unwrap_err();
        assert!(matches!(err, MushafError::FeatureDisabled(_)));
        assert!(!DisabledSearch.is_enabled());
    }

    #[test]
    #[serial]
    fn api_key_falls_back_to_environment() {
        std::env::set_var(API_KEY_ENV, "from-env");
        assert_eq!(
            resolve_api_key(&SearchConfig::default()).as_deref(),
            Some("from-env")
        );

        let configured = SearchConfig {
            api_key: Some("from-config".to_string()),
            ..SearchConfig::default()
        };
        assert_eq!(resolve_api_key(&configured).as_deref(), Some("from-config"));

        std::env::remove_var(API_KEY_ENV);
        assert_eq!(resolve_api_key(&SearchConfig::default()), None);
    }
}
