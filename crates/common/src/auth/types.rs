//! Implicit Grant types and structures
//!
//! Defines the configuration, redirect actions, credential record and
//! notification values exchanged between the login state machine and its
//! collaborators.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Default number of seconds shaved off the provider's token lifetime.
pub const DEFAULT_EXPIRATION_BUFFER_SECS: i64 = 600;

/// Token lifetime reported for the development-token shortcut (8 hours).
pub const DEV_TOKEN_EXPIRES_IN_SECS: u64 = 28_800;

/// Implicit Grant configuration
///
/// Describes the identity provider, the registered custom URL scheme and how
/// the redirect URI is assembled from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplicitGrantConfig {
    /// Identity provider base URL (e.g. `https://account-d.docusign.com`)
    pub idp_url: String,

    /// OAuth client identifier (integration key)
    pub client_id: String,

    /// Requested scopes
    pub scopes: Vec<String>,

    /// Custom URL scheme registered with the OS
    pub scheme_name: String,

    /// Slash convention after the scheme: 1 (`scheme:/path`) or 2
    /// (`scheme://path`)
    pub scheme_slash_count: u8,

    /// Token identifying the login callback in the redirect URL
    pub return_path: String,

    /// Intermediate HTTPS page for providers that refuse custom schemes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,

    /// Static token that replaces the browser round trip in debug builds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_access_token: Option<String>,

    /// Safety buffer subtracted from `expires_in`
    pub expiration_buffer_seconds: i64,
}

impl ImplicitGrantConfig {
    /// Create a configuration with a direct custom-scheme redirect.
    #[must_use]
    pub fn new(
        idp_url: impl Into<String>,
        client_id: impl Into<String>,
        scheme_name: impl Into<String>,
        return_path: impl Into<String>,
    ) -> Self {
        Self {
            idp_url: idp_url.into(),
            client_id: client_id.into(),
            scopes: vec!["signature".to_string()],
            scheme_name: scheme_name.into(),
            scheme_slash_count: 1,
            return_path: return_path.into(),
            redirect_url: None,
            dev_access_token: None,
            expiration_buffer_seconds: DEFAULT_EXPIRATION_BUFFER_SECS,
        }
    }

    /// Space-separated scope string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }

    fn idp_base(&self) -> &str {
        self.idp_url.trim_end_matches('/')
    }

    /// Redirect URI that lands directly on the custom scheme.
    #[must_use]
    pub fn direct_redirect_uri(&self) -> String {
        let slashes = if self.scheme_slash_count == 1 { "/" } else { "//" };
        format!("{}:{slashes}{}", self.scheme_name, self.return_path)
    }

    /// Redirect URI sent to the provider.
    ///
    /// The intermediate page wins when one is configured (values of two
    /// characters or fewer are treated as unset placeholders).
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        match self.redirect_url.as_deref().map(str::trim) {
            Some(url) if url.len() > 2 => url.to_string(),
            _ => self.direct_redirect_uri(),
        }
    }

    /// Build the provider authorization URL for the given CSRF state.
    ///
    /// # Errors
    /// Returns an error if `idp_url` is not an absolute URL.
    pub fn authorization_url(&self, state: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}/oauth/auth", self.idp_base()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "token")
            .append_pair("scope", &self.scope_string())
            .append_pair("client_id", &self.client_id)
            .append_pair("state", state)
            .append_pair("redirect_uri", &self.redirect_uri());
        Ok(url)
    }

    /// User-info endpoint on the identity provider
    #[must_use]
    pub fn userinfo_url(&self) -> String {
        format!("{}/oauth/userinfo", self.idp_base())
    }

    /// Scheme prefix (`name:`) used to recognise protocol launches.
    #[must_use]
    pub fn scheme_prefix(&self) -> String {
        format!("{}:", self.scheme_name)
    }
}

/// Typed result of parsing a raw URL delivered by the OS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RedirectAction {
    /// Anything that is not a well-formed login callback
    Unknown { raw_url: String },

    /// Login callback carrying the Implicit Grant fragment fields
    OAuthCallback {
        action_name: String,
        access_token: String,
        state: String,
        expires_in_seconds: u64,
    },
}

impl RedirectAction {
    #[must_use]
    pub const fn is_callback(&self) -> bool {
        matches!(self, Self::OAuthCallback { .. })
    }
}

/// Authenticated session handed to the application after login
///
/// `Debug` never prints the access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub display_name: String,
    pub email: String,
    pub account_id: String,
    /// Human-friendly account number; absent when the lookup failed
    pub external_account_id: Option<String>,
    pub account_name: String,
    /// API base URI for the selected account
    pub base_uri: String,
}

impl Credential {
    /// A credential is usable only while `now < expires_at`.
    #[must_use]
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    /// Seconds until the credential stops being usable (negative once
    /// expired).
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("account_id", &self.account_id)
            .field("external_account_id", &self.external_account_id)
            .field("account_name", &self.account_name)
            .field("base_uri", &self.base_uri)
            .finish()
    }
}

/// Compute the instant after which a token must no longer be used.
///
/// `received_at + expires_in - buffer`. A buffer below one second is raised
/// to one, so the result is always strictly before the provider's own expiry.
/// The lifetime is capped at [`MAX_TOKEN_LIFETIME_SECS`] and the result is
/// never before `received_at`, so a token shorter than the buffer is unusable
/// immediately.
#[must_use]
pub fn credential_expiry(
    received_at: DateTime<Utc>,
    expires_in_seconds: u64,
    buffer_seconds: i64,
) -> DateTime<Utc> {
    let lifetime = i64::try_from(expires_in_seconds)
        .unwrap_or(MAX_TOKEN_LIFETIME_SECS)
        .min(MAX_TOKEN_LIFETIME_SECS);
    let usable = lifetime - buffer_seconds.max(1).min(lifetime);
    received_at + chrono::Duration::seconds(usable)
}

/// Upper bound accepted for a provider-reported `expires_in` (one year).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// Opaque back-reference to a browser window opened by the login flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(String);

impl WindowHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Handle with a freshly generated identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity of a user-visible message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

/// User-visible message routed to the notification sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Close automatically after this long; `None` keeps it open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_close: Option<Duration>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, message: message.into(), auto_close: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, message: message.into(), auto_close: None }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info, message: message.into(), auto_close: None }
    }

    #[must_use]
    pub const fn auto_close(mut self, after: Duration) -> Self {
        self.auto_close = Some(after);
        self
    }
}

/// Identifier returned by the sink so a notification can be dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Observable state of the login state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    Idle,
    LoginStarted,
}

/// Why a callback did not produce a credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RejectReason {
    /// The callback state did not equal the pending state (or none was
    /// pending)
    StateMismatch,
    /// User-info or account resolution failed
    IdentityResolution(String),
}

/// Result of handing a redirect to the login state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Not a login callback for this application
    Ignored,
    Rejected(RejectReason),
    Authenticated(Credential),
}

impl RedirectOutcome {
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        match self {
            Self::Authenticated(credential) => Some(credential),
            _ => None,
        }
    }
}

/// How a login attempt was started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStart {
    /// The system browser was opened on the authorization URL
    Browser { authorization_url: Url },
    /// Debug builds only: a configured static token was used directly
    DevelopmentToken(RedirectOutcome),
}
