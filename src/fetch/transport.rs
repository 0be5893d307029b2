//! HTTP transport abstraction
//!
//! The fetcher only needs "send this request, give me status and body".
//! Production uses a blocking `ureq` agent on the blocking thread pool;
//! tests substitute scripted transports.

use super::{FetchRequest, Method};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("mushaf/", env!("CARGO_PKG_VERSION"));

/// Raw status and body of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Network-level failure; always worth retrying
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("transport task failed: {0}")]
    Task(String),
}

/// Abstract HTTP client
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one exchange, without retries
    async fn execute(&self, request: &FetchRequest) -> Result<HttpResponse, TransportError>;
}

/// `ureq` backed transport
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport whose connections give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }

    fn execute_blocking(
        agent: &ureq::Agent,
        request: &FetchRequest,
    ) -> Result<HttpResponse, TransportError> {
        let sent = match request.method {
            Method::Get => agent
                .get(request.url.as_str())
                .header("User-Agent", USER_AGENT)
                .call(),
            Method::Post => agent
                .post(request.url.as_str())
                .header("User-Agent", USER_AGENT)
                .header("Content-Type", request.content_type.as_str())
                .send(&request.body[..]),
        };

        let mut response = sent.map_err(TransportError::from)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(TransportError::from)?;

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for UreqTransport {
    async fn execute(&self, request: &FetchRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || Self::execute_blocking(&agent, &request))
            .await
            .map_err(|e| TransportError::Task(e.to_string()))?
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => Self::Timeout,
            other => Self::Network(other.to_string()),
        }
    }
}
