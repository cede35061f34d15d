//! Envelope creation over HTTP

use std::time::Duration;

use async_trait::async_trait;
use quillsign_core::signing::ports::EnvelopeGateway;
use quillsign_core::EnvelopeDefinition;
use quillsign_domain::constants::{NETWORK_ERROR_MESSAGE, SDK_HEADER_NAME, SIGNING_API_PATH};
use quillsign_domain::{ApiDiagnostics, EnvelopeResult, FailureKind, QuillSignError, SigningSettings};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::rate_limit::diagnostics_from_headers;
use crate::http::HttpClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeSummary {
    envelope_id: Option<String>,
}

/// [`EnvelopeGateway`] backed by the REST envelope API.
///
/// Every call is a single attempt; a failed send is reported, never replayed.
#[derive(Debug, Clone)]
pub struct EnvelopeApiClient {
    http: HttpClient,
    sdk_header: String,
}

impl EnvelopeApiClient {
    /// Create a client from the signing settings.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(settings: &SigningSettings) -> Result<Self, QuillSignError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(settings.request_timeout_seconds))
            .max_attempts(1)
            .build()?;
        Ok(Self::with_client(http, settings.sdk_header.clone()))
    }

    pub fn with_client(http: HttpClient, sdk_header: impl Into<String>) -> Self {
        Self { http, sdk_header: sdk_header.into() }
    }

    fn envelopes_url(base_uri: &str, account_id: &str) -> String {
        format!("{}{SIGNING_API_PATH}/accounts/{account_id}/envelopes", base_uri.trim_end_matches('/'))
    }
}

#[async_trait]
impl EnvelopeGateway for EnvelopeApiClient {
    #[instrument(skip(self, access_token, definition), fields(base_uri = %base_uri))]
    async fn create_envelope(
        &self,
        base_uri: &str,
        account_id: &str,
        access_token: &str,
        definition: &EnvelopeDefinition,
    ) -> EnvelopeResult {
        let request = self
            .http
            .request(Method::POST, Self::envelopes_url(base_uri, account_id))
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(SDK_HEADER_NAME, &self.sdk_header)
            .json(definition);

        let response = match self.http.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "envelope request did not reach the API");
                return EnvelopeResult::Failure {
                    error_message: NETWORK_ERROR_MESSAGE.to_string(),
                    failure: FailureKind::Transport,
                    diagnostics: ApiDiagnostics::default(),
                };
            }
        };

        let status = response.status();
        let diagnostics = diagnostics_from_headers(response.headers());
        debug!(
            %status,
            remaining = ?diagnostics.available_api_requests,
            trace_id = ?diagnostics.trace_id,
            "envelope API responded"
        );

        if !status.is_success() {
            let error_message = match response.text().await {
                Ok(body) => body,
                Err(err) => format!("HTTP {status}: {err}"),
            };
            return EnvelopeResult::Failure {
                error_message,
                failure: FailureKind::Api { status: status.as_u16() },
                diagnostics,
            };
        }

        match response.json::<EnvelopeSummary>().await {
            Ok(EnvelopeSummary { envelope_id: Some(envelope_id) }) if !envelope_id.is_empty() => {
                EnvelopeResult::Success { envelope_id, diagnostics }
            }
            Ok(_) => EnvelopeResult::Failure {
                error_message: "Envelope API response did not include an envelopeId".to_string(),
                failure: FailureKind::InvalidResponse,
                diagnostics,
            },
            Err(err) => EnvelopeResult::Failure {
                error_message: format!("Envelope API response could not be decoded: {err}"),
                failure: FailureKind::InvalidResponse,
                diagnostics,
            },
        }
    }
}
