//! Identity provider client
//!
//! After a callback passes the state check, the access token is exchanged for
//! the user's profile (`/oauth/userinfo`) and the default account's
//! human-friendly identifier (`/restapi/v2.1/accounts/{id}`). Response bodies
//! are decoded into explicit schemas; a missing required field is an error,
//! never a silently empty value.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::traits::IdentityProviderTrait;
use super::types::ImplicitGrantConfig;

/// Client-identifier header sent on every provider call.
pub const SDK_HEADER_NAME: &str = "X-DocuSign-SDK";

const ACCOUNTS_PATH: &str = "/restapi/v2.1/accounts";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for identity provider calls
#[derive(Debug)]
pub enum IdentityError {
    /// HTTP request failed before a response arrived
    RequestFailed(reqwest::Error),

    /// Provider answered with a non-2xx status
    Status { status: u16, reason: String },

    /// Response body did not match the expected schema
    ParseError(String),

    /// No account in the profile is flagged as default
    NoDefaultAccount,

    /// More than one account is flagged as default
    MultipleDefaultAccounts(usize),
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestFailed(e) => write!(f, "HTTP request failed: {e}"),
            Self::Status { status, reason } => write!(f, "{status} {reason}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::NoDefaultAccount => write!(f, "No default account is configured for this user"),
            Self::MultipleDefaultAccounts(count) => {
                write!(f, "{count} accounts are flagged as default; expected exactly one")
            }
        }
    }
}

impl std::error::Error for IdentityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RequestFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed(err)
    }
}

/// `/oauth/userinfo` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub name: String,
    pub email: String,
    pub accounts: Vec<AccountInfo>,
}

/// One entry of the user-info account list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_id: String,
    pub account_name: String,
    pub base_uri: String,
    pub is_default: bool,
}

impl UserInfo {
    /// Select the single account flagged as default.
    ///
    /// # Errors
    /// Returns [`IdentityError::NoDefaultAccount`] or
    /// [`IdentityError::MultipleDefaultAccounts`]; neither case guesses a
    /// fallback.
    pub fn default_account(&self) -> Result<&AccountInfo, IdentityError> {
        let mut defaults = self.accounts.iter().filter(|account| account.is_default);
        let first = defaults.next().ok_or(IdentityError::NoDefaultAccount)?;
        let extra = defaults.count();
        if extra > 0 {
            return Err(IdentityError::MultipleDefaultAccounts(extra + 1));
        }
        Ok(first)
    }
}

/// Account lookup response (only the field we read)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDetails {
    #[serde(default)]
    external_account_id: Option<ExternalAccountId>,
}

/// The API has returned this identifier both as a string and as a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExternalAccountId {
    Text(String),
    Number(u64),
}

impl ExternalAccountId {
    fn into_string(self) -> String {
        match self {
            Self::Text(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

/// reqwest-backed identity provider client
#[derive(Debug, Clone)]
pub struct IdentityClient {
    client: Client,
    userinfo_url: String,
    sdk_header: String,
}

impl IdentityClient {
    /// Create a client for the provider described by `config`, with a
    /// 30 second request timeout and the system proxy settings.
    ///
    /// # Errors
    /// Returns [`IdentityError::RequestFailed`] when the HTTP client cannot be
    /// built (TLS backend or proxy configuration).
    pub fn new(
        config: &ImplicitGrantConfig,
        sdk_header: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, config, sdk_header))
    }

    /// Create a client around an existing reqwest client.
    #[must_use]
    pub fn with_client(
        client: Client,
        config: &ImplicitGrantConfig,
        sdk_header: impl Into<String>,
    ) -> Self {
        Self { client, userinfo_url: config.userinfo_url(), sdk_header: sdk_header.into() }
    }

    async fn get(&self, url: &str, access_token: &str) -> Result<Response, IdentityError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .header(SDK_HEADER_NAME, &self.sdk_header)
            .send()
            .await?;

        let status = response.status();
        debug!(%status, "identity provider responded");
        if !status.is_success() {
            return Err(IdentityError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown status").to_string(),
            });
        }
        Ok(response)
    }

    /// Fetch `/oauth/userinfo`.
    ///
    /// # Errors
    /// See [`IdentityProviderTrait::fetch_user_info`].
    #[instrument(skip_all, fields(url = %self.userinfo_url))]
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, IdentityError> {
        let response = self.get(&self.userinfo_url, access_token).await?;
        response.json::<UserInfo>().await.map_err(|e| IdentityError::ParseError(e.to_string()))
    }

    /// Fetch the external (human-friendly) account identifier.
    ///
    /// # Errors
    /// See [`IdentityProviderTrait::fetch_external_account_id`].
    #[instrument(skip(self, access_token))]
    pub async fn fetch_external_account_id(
        &self,
        base_uri: &str,
        account_id: &str,
        access_token: &str,
    ) -> Result<Option<String>, IdentityError> {
        let url = format!("{}{ACCOUNTS_PATH}/{account_id}", base_uri.trim_end_matches('/'));
        let response = self.get(&url, access_token).await?;
        let details: AccountDetails =
            response.json().await.map_err(|e| IdentityError::ParseError(e.to_string()))?;
        Ok(details.external_account_id.map(ExternalAccountId::into_string))
    }
}

#[async_trait]
impl IdentityProviderTrait for IdentityClient {
    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, IdentityError> {
        self.fetch_user_info(access_token).await
    }

    async fn fetch_external_account_id(
        &self,
        base_uri: &str,
        account_id: &str,
        access_token: &str,
    ) -> Result<Option<String>, IdentityError> {
        self.fetch_external_account_id(base_uri, account_id, access_token).await
    }
}
