//! Best-effort geo-IP country lookup
//!
//! Used only to pre-fill the SMS country code, so every failure is reported
//! as an error for the caller to log and ignore.

use std::time::Duration;

use quillsign_domain::{GeoIpSettings, QuillSignError, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::errors::InfraError;
use crate::http::HttpClient;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct CountryResponse {
    country_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeoIpClient {
    http: HttpClient,
    url: String,
}

impl GeoIpClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(settings: &GeoIpSettings) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(LOOKUP_TIMEOUT)
            .max_attempts(2)
            .base_backoff(Duration::from_millis(250))
            .build()?;
        Ok(Self::with_client(http, settings.url.clone()))
    }

    pub fn with_client(http: HttpClient, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    /// Look up the ISO country code for the caller's public address.
    ///
    /// # Errors
    /// Returns the mapped transport or status error, or
    /// [`QuillSignError::Internal`] for an undecodable body.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn lookup_country_code(&self) -> Result<Option<String>> {
        let response = self.http.send(self.http.request(Method::GET, &self.url)).await?;
        let response =
            response.error_for_status().map_err(|e| QuillSignError::from(InfraError::from(e)))?;

        let body: CountryResponse = response
            .json()
            .await
            .map_err(|e| QuillSignError::Internal(format!("unexpected geo-IP response: {e}")))?;
        let code = body.country_code.map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty());
        debug!(country_code = ?code, "geo-IP lookup complete");
        Ok(code)
    }
}
