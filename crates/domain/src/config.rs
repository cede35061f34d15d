//! Application configuration
//!
//! Plain data describing how to reach the identity provider and the signing
//! API. Loading (environment variables, TOML/JSON files) lives in
//! `quillsign-infra`; this module only defines the shape and validation.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DOCUMENT_EXTENSION, DEFAULT_DOCUMENT_FILE_NAME, DEFAULT_DOCUMENT_NAME,
    DEFAULT_EMAIL_SUBJECT, DEFAULT_EXPIRATION_BUFFER_SECS, DEFAULT_GEOIP_URL, DEFAULT_IDP_URL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETURN_PATH, DEFAULT_SCHEME_NAME, DEFAULT_SCOPE,
    DEFAULT_SDK_HEADER_VALUE,
};
use crate::errors::{QuillSignError, Result};
use crate::types::DocumentRef;

/// Top-level configuration for the application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub oauth: OAuthSettings,
    #[serde(default)]
    pub signing: SigningSettings,
    #[serde(default)]
    pub geoip: GeoIpSettings,
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns [`QuillSignError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.oauth.validate()?;
        self.signing.validate()
    }
}

/// Identity provider settings for the Implicit Grant flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    /// Identity provider base URL, e.g. `https://account-d.docusign.com`
    pub idp_url: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    /// Registered custom URL scheme (without the trailing colon)
    pub scheme_name: String,
    /// `1` builds `scheme:/path`, `2` builds `scheme://path`
    pub scheme_slash_count: u8,
    /// Token that marks a redirect as the login callback
    pub return_path: String,
    /// Optional HTTPS page that forwards to the custom scheme
    pub redirect_url: Option<String>,
    /// Static token used instead of the browser round trip in debug builds
    pub dev_access_token: Option<String>,
    /// Seconds subtracted from the provider's `expires_in`; must be positive
    pub expiration_buffer_seconds: i64,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            idp_url: DEFAULT_IDP_URL.to_string(),
            client_id: String::new(),
            scopes: vec![DEFAULT_SCOPE.to_string()],
            scheme_name: DEFAULT_SCHEME_NAME.to_string(),
            scheme_slash_count: 1,
            return_path: DEFAULT_RETURN_PATH.to_string(),
            redirect_url: None,
            dev_access_token: None,
            expiration_buffer_seconds: DEFAULT_EXPIRATION_BUFFER_SECS,
        }
    }
}

impl OAuthSettings {
    /// Validate the identity provider settings.
    ///
    /// # Errors
    /// Returns [`QuillSignError::Config`] when a required value is missing,
    /// the slash convention is not 1 or 2, or the expiry buffer is not
    /// positive.
    pub fn validate(&self) -> Result<()> {
        if self.idp_url.trim().is_empty() {
            return Err(QuillSignError::Config("oauth.idp_url must be set".into()));
        }
        if self.client_id.trim().is_empty() {
            return Err(QuillSignError::Config("oauth.client_id must be set".into()));
        }
        if self.scheme_name.trim().is_empty() {
            return Err(QuillSignError::Config("oauth.scheme_name must be set".into()));
        }
        if self.return_path.trim().is_empty() {
            return Err(QuillSignError::Config("oauth.return_path must be set".into()));
        }
        if !matches!(self.scheme_slash_count, 1 | 2) {
            return Err(QuillSignError::Config(format!(
                "oauth.scheme_slash_count must be 1 or 2, got {}",
                self.scheme_slash_count
            )));
        }
        if self.expiration_buffer_seconds <= 0 {
            return Err(QuillSignError::Config(format!(
                "oauth.expiration_buffer_seconds must be greater than zero, got {}",
                self.expiration_buffer_seconds
            )));
        }
        Ok(())
    }
}

/// Signing API request settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    /// Value sent in the client-identifier header on every API call
    pub sdk_header: String,
    pub document_file_name: String,
    pub document_name: String,
    pub document_extension: String,
    pub email_subject: String,
    pub request_timeout_seconds: u64,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            sdk_header: DEFAULT_SDK_HEADER_VALUE.to_string(),
            document_file_name: DEFAULT_DOCUMENT_FILE_NAME.to_string(),
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            document_extension: DEFAULT_DOCUMENT_EXTENSION.to_string(),
            email_subject: DEFAULT_EMAIL_SUBJECT.to_string(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl SigningSettings {
    /// The document sent with every envelope.
    #[must_use]
    pub fn document(&self) -> DocumentRef {
        DocumentRef {
            file_name: self.document_file_name.clone(),
            display_name: self.document_name.clone(),
            extension: self.document_extension.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_seconds == 0 {
            return Err(QuillSignError::Config(
                "signing.request_timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Best-effort country lookup used to pre-fill the SMS country code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoIpSettings {
    pub enabled: bool,
    pub url: String,
}

impl Default for GeoIpSettings {
    fn default() -> Self {
        Self { enabled: true, url: DEFAULT_GEOIP_URL.to_string() }
    }
}
