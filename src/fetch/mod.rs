//! Resilient remote fetching
//!
//! Every loader goes through [`ResilientFetcher`]: each attempt carries a
//! timeout, transport failures and timeouts are retried with capped
//! exponential backoff, and exhausting the attempt budget yields
//! [`MushafError::FetchFailed`] ("data unavailable now").
//!
//! Non-2xx responses are returned to the caller as-is unless the policy
//! opts into status classification, in which case 5xx/408/429 are retried
//! and other statuses end the loop immediately.

pub mod retry;
pub mod transport;

pub use retry::{RetryPolicy, StatusClass};
pub use transport::{HttpResponse, HttpTransport, TransportError, UreqTransport};

use crate::error::{MushafError, MushafResult};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP method of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Description of one remote read or write
#[derive(Clone)]
pub struct FetchRequest {
    /// Short label used in logs and metrics (never contains secrets)
    pub endpoint: String,
    pub method: Method,
    pub url: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn get(endpoint: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: Method::Get,
            url: url.into(),
            body: Vec::new(),
            content_type: String::new(),
            timeout,
        }
    }

    pub fn post_json(
        endpoint: impl Into<String>,
        url: impl Into<String>,
        payload: &serde_json::Value,
        timeout: Duration,
    ) -> MushafResult<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            method: Method::Post,
            url: url.into(),
            body: serde_json::to_vec(payload)?,
            content_type: "application/json".to_string(),
            timeout,
        })
    }
}

// URLs may carry API keys, so Debug only shows the endpoint label
impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequest")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("body_len", &self.body.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Result of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    TransientFailure(String),
    FatalFailure(String),
}

/// Record of one attempt within a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    /// 1-based
    pub attempt_number: u32,
    /// Wait before this attempt started
    pub delay: Duration,
    pub outcome: AttemptOutcome,
}

/// Final response plus the attempts it took
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub attempts: Vec<FetchAttempt>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> MushafResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Retrying wrapper around an [`HttpTransport`]
#[derive(Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Perform the request, retrying transient failures
    pub async fn fetch(&self, request: &FetchRequest) -> MushafResult<FetchResponse> {
        let mut attempts = Vec::new();
        let mut last_reason = String::new();

        for attempt_number in 1..=self.policy.max_attempts {
            let delay = if attempt_number == 1 {
                Duration::ZERO
            } else {
                self.policy.delay_after(attempt_number - 1)
            };
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let result = tokio::time::timeout(request.timeout, self.transport.execute(request))
                .await
                .unwrap_or(Err(TransportError::Timeout));

            match result {
                Ok(response) => match self.policy.classify(response.status) {
                    StatusClass::Success => {
                        debug!(
                            endpoint = %request.endpoint,
                            attempt = attempt_number,
                            status = response.status,
                            "Fetch succeeded"
                        );
                        attempts.push(FetchAttempt {
                            attempt_number,
                            delay,
                            outcome: AttemptOutcome::Success,
                        });
                        return Ok(FetchResponse {
                            status: response.status,
                            body: response.body,
                            attempts,
                        });
                    }
                    StatusClass::Final => {
                        let reason = format!("HTTP {}", response.status);
                        warn!(
                            endpoint = %request.endpoint,
                            attempt = attempt_number,
                            %reason,
                            "Fetch returned non-success status"
                        );
                        attempts.push(FetchAttempt {
                            attempt_number,
                            delay,
                            outcome: AttemptOutcome::FatalFailure(reason),
                        });
                        return Ok(FetchResponse {
                            status: response.status,
                            body: response.body,
                            attempts,
                        });
                    }
                    StatusClass::Transient => {
                        last_reason = format!("HTTP {}", response.status);
                    }
                },
                Err(err) => {
                    last_reason = err.to_string();
                }
            }

            warn!(
                endpoint = %request.endpoint,
                method = %request.method,
                attempt = attempt_number,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                reason = %last_reason,
                "Fetch attempt failed"
            );
            attempts.push(FetchAttempt {
                attempt_number,
                delay,
                outcome: AttemptOutcome::TransientFailure(last_reason.clone()),
            });
        }

        Err(MushafError::FetchFailed {
            endpoint: request.endpoint.clone(),
            attempts: attempts.len() as u32,
            reason: last_reason,
        })
    }

    /// Fetch and decode a successful JSON response
    ///
    /// Returns `Ok(None)` for a non-success status.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: &FetchRequest,
    ) -> MushafResult<Option<T>> {
        let response = self.fetch(request).await?;
        if !response.is_success() {
            return Ok(None);
        }
        response.json().map(Some)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted transport: replays queued results, then repeats the fallback
    pub struct ScriptedTransport {
        script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        fallback: Result<HttpResponse, TransportError>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn new(fallback: Result<HttpResponse, TransportError>) -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                fallback,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(body: &str) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                body: body.as_bytes().to_vec(),
            })
        }

        pub fn status(status: u16) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status,
                body: Vec::new(),
            })
        }

        pub fn then(self, result: Result<HttpResponse, TransportError>) -> Self {
            self.script.lock().unwrap().push_back(result);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn execute(&self, request: &FetchRequest) -> Result<HttpResponse, TransportError> {
            self.calls.lock().unwrap().push(request.url.clone());
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        }
    }

    /// Transport that routes by URL substring
    pub struct RoutedTransport {
        routes: Vec<(String, HttpResponse)>,
        calls: Mutex<Vec<String>>,
    }

    impl RoutedTransport {
        pub fn new() -> Self {
            Self {
                routes: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn route(mut self, url_part: &str, status: u16, body: &str) -> Self {
            self.routes.push((
                url_part.to_string(),
                HttpResponse {
                    status,
                    body: body.as_bytes().to_vec(),
                },
            ));
            self
        }

        pub fn calls_to(&self, url_part: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|url| url.contains(url_part))
                .count()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for RoutedTransport {
        async fn execute(&self, request: &FetchRequest) -> Result<HttpResponse, TransportError> {
            self.calls.lock().unwrap().push(request.url.clone());
            // Longest match wins so "/surah/2/" beats "/surah"
            self.routes
                .iter()
                .filter(|(part, _)| request.url.contains(part.as_str()))
                .max_by_key(|(part, _)| part.len())
                .map(|(_, response)| Ok(response.clone()))
                .unwrap_or(Err(TransportError::Network(format!(
                    "no route for {}",
                    request.url
                ))))
        }
    }
}
