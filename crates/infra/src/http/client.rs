use std::time::Duration;

use quillsign_domain::QuillSignError;
use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// How many times a request may be attempted, and how long to wait between
/// attempts.
///
/// Only idempotent methods are ever retried. An envelope POST that timed out
/// may still have been accepted by the server, so replaying it could create a
/// duplicate envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 1, base_backoff: Duration::from_millis(200) }
    }
}

impl RetryPolicy {
    fn attempts_for(&self, method: &Method) -> usize {
        if is_idempotent(method) {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    /// Exponential backoff, capped at 2^8 times the base delay.
    fn delay_before(&self, retry_number: usize) -> Duration {
        let shift = u32::try_from(retry_number.saturating_sub(1).min(8)).unwrap_or(8);
        self.base_backoff.saturating_mul(1u32 << shift)
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::PUT | Method::DELETE)
}

/// reqwest wrapper used by every outbound API call.
///
/// Responses are returned whatever their status; callers decide what a
/// non-2xx answer means. Transport failures become
/// [`QuillSignError::Network`].
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with a 30 second timeout and a single attempt per request.
    pub fn new() -> Result<Self, QuillSignError> {
        Self::builder().build()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute `builder`, retrying idempotent requests on server errors and
    /// transient transport failures.
    ///
    /// A request whose body cannot be cloned (a stream) gets one attempt.
    ///
    /// # Errors
    /// [`QuillSignError::Network`] when no response was received.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, QuillSignError> {
        let request = builder.build().map_err(to_domain)?;
        let method = request.method().clone();
        let url = request.url().clone();
        let attempts = self.retry.attempts_for(&method);

        let mut pending = Some(request);
        for attempt in 1..=attempts {
            let Some(request) = pending.take() else { break };
            let replay = if attempt < attempts { request.try_clone() } else { None };

            debug!(attempt, %method, %url, "sending HTTP request");
            let can_retry = replay.is_some();
            match self.client.execute(request).await {
                Ok(response) if can_retry && response.status().is_server_error() => {
                    warn!(attempt, %method, %url, status = %response.status(), "server error, retrying");
                }
                Ok(response) => {
                    debug!(attempt, %method, %url, status = %response.status(), "received HTTP response");
                    return Ok(response);
                }
                Err(err) if can_retry && is_transient(&err) => {
                    warn!(attempt, %method, %url, error = %err, "transport failure, retrying");
                }
                Err(err) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");
                    return Err(to_domain(err));
                }
            }

            pending = replay;
            let delay = self.retry.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Err(QuillSignError::Internal(format!("{method} {url}: retry loop ended without a response")))
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn to_domain(err: reqwest::Error) -> QuillSignError {
    InfraError::from(err).into()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts for idempotent requests (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.retry.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.retry.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, QuillSignError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(to_domain)?;
        Ok(HttpClient { client, retry: self.retry })
    }
}
