//! Implicit Grant login orchestrator
//!
//! Drives one login attempt from "open the system browser" to a completed
//! [`Credential`]:
//!
//! ```text
//! Idle ──start_login──► LoginStarted ──handle_redirect──► (validated | rejected) ──► Idle
//!   ▲                        │
//!   └──────cancel_login──────┘
//! ```
//!
//! The state comparison in [`ImplicitLoginService::handle_redirect`] is the
//! CSRF defense for the whole flow. Every failure is reported through the
//! notification sink and leaves the service idle; no partially populated
//! credential is ever returned and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::identity::{IdentityClient, IdentityError};
use super::redirect::parse_redirect_url;
use super::session::OAuthSession;
use super::state::{generate_state, validate_state};
use super::traits::{BrowserLauncher, IdentityProviderTrait, NotificationSink};
use super::types::{
    credential_expiry, Credential, ImplicitGrantConfig, LoginStart, LoginState, Notification,
    RedirectAction, RedirectOutcome, RejectReason, DEV_TOKEN_EXPIRES_IN_SECS,
};

/// Shown when the callback state does not match the pending login.
pub const SECURITY_CHECK_FAILED_MESSAGE: &str =
    "The OAuth response failed the security check.\nPlease retry.";

/// Shown while user-info and account lookups run.
pub const COMPLETING_LOGIN_MESSAGE: &str = "Completing the login process...";

const ERROR_AUTO_CLOSE: Duration = Duration::from_secs(10);
const PROGRESS_AUTO_CLOSE: Duration = Duration::from_secs(7);

/// Error type for login service operations
#[derive(Debug)]
pub enum LoginServiceError {
    /// Configuration prevents building the authorization request
    ConfigError(String),

    /// Browser launch failed
    BrowserError(String),
}

impl std::fmt::Display for LoginServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            Self::BrowserError(msg) => write!(f, "Browser launch failed: {msg}"),
        }
    }
}

impl std::error::Error for LoginServiceError {}

/// Implicit Grant login service
///
/// High-level service that orchestrates:
/// - CSRF state generation and validation
/// - System-browser authorization
/// - Identity and default-account resolution
/// - User-visible progress and failure notifications
pub struct ImplicitLoginService<P = IdentityClient>
where
    P: IdentityProviderTrait + 'static,
{
    config: ImplicitGrantConfig,
    identity: Arc<P>,
    browser: Arc<dyn BrowserLauncher>,
    notifier: Arc<dyn NotificationSink>,
    session: Mutex<OAuthSession>,
    allow_dev_token: bool,
}

impl<P> ImplicitLoginService<P>
where
    P: IdentityProviderTrait + 'static,
{
    /// Create a new login service
    ///
    /// # Arguments
    /// * `config` - Provider, client and redirect settings
    /// * `identity` - Identity provider used after a callback is accepted
    /// * `browser` - System browser launcher
    /// * `notifier` - Sink for user-visible messages
    ///
    /// The development-token shortcut is honoured only in builds with debug
    /// assertions enabled.
    #[must_use]
    pub fn new(
        config: ImplicitGrantConfig,
        identity: Arc<P>,
        browser: Arc<dyn BrowserLauncher>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            identity,
            browser,
            notifier,
            session: Mutex::new(OAuthSession::new()),
            allow_dev_token: cfg!(debug_assertions),
        }
    }

    /// Get a reference to the login configuration
    #[must_use]
    pub const fn config(&self) -> &ImplicitGrantConfig {
        &self.config
    }

    /// Start the login flow
    ///
    /// Generates a fresh state (replacing any pending one), builds the
    /// authorization URL and opens it in the system browser. In debug builds
    /// with a development token configured, the browser is skipped and a
    /// callback is synthesized locally instead.
    ///
    /// # Errors
    /// Returns error if the authorization URL cannot be built or the browser
    /// fails to open; in both cases the session is left idle.
    pub async fn start_login(&self) -> Result<LoginStart, LoginServiceError> {
        if let Some(token) = self.development_token() {
            let state = generate_state();
            self.session.lock().await.begin(state.clone());
            info!("development access token configured; skipping browser login");

            let action = RedirectAction::OAuthCallback {
                action_name: self.config.return_path.clone(),
                access_token: token,
                state,
                expires_in_seconds: DEV_TOKEN_EXPIRES_IN_SECS,
            };
            return Ok(LoginStart::DevelopmentToken(self.handle_redirect(action).await));
        }

        let state = generate_state();
        let authorization_url = self
            .config
            .authorization_url(&state)
            .map_err(|e| LoginServiceError::ConfigError(format!("invalid idp_url: {e}")))?;

        // Held across the browser launch so a callback cannot observe a state
        // without its window.
        let mut session = self.session.lock().await;
        if let Some(previous) = session.take_window() {
            self.browser.close(&previous).await;
        }
        session.begin(state);

        match self.browser.open(&authorization_url).await {
            Ok(handle) => {
                session.attach_window(handle);
                info!(host = authorization_url.host_str().unwrap_or(""), "OAuth login started");
                Ok(LoginStart::Browser { authorization_url })
            }
            Err(reason) => {
                session.take_state();
                drop(session);
                warn!(error = %reason, "failed to open system browser for login");
                self.notify_error(format!("Could not open the system browser.\nError: {reason}"))
                    .await;
                Err(LoginServiceError::BrowserError(reason))
            }
        }
    }

    /// Parse a raw URL delivered by the OS and handle it.
    pub async fn handle_redirect_url(&self, raw_url: &str) -> RedirectOutcome {
        let action = parse_redirect_url(raw_url, &self.config.return_path);
        self.handle_redirect(action).await
    }

    /// Handle a parsed redirect action
    ///
    /// Only an `OAuthCallback` whose `action_name` equals the configured
    /// return path is considered. The pending state is consumed whether or
    /// not it matches, so a second delivery of the same URL is rejected.
    pub async fn handle_redirect(&self, action: RedirectAction) -> RedirectOutcome {
        let RedirectAction::OAuthCallback { action_name, access_token, state, expires_in_seconds } =
            action
        else {
            debug!("ignoring redirect that is not a login callback");
            return RedirectOutcome::Ignored;
        };

        if action_name != self.config.return_path {
            debug!(action = %action_name, "ignoring callback for another return path");
            return RedirectOutcome::Ignored;
        }

        let received_at = Utc::now();
        let (expected, window) = {
            let mut session = self.session.lock().await;
            (session.take_state(), session.take_window())
        };
        if let Some(handle) = window {
            self.browser.close(&handle).await;
        }

        if !validate_state(expected.as_deref(), &state) {
            warn!(pending = expected.is_some(), "OAuth callback failed the state check");
            self.notify_error(SECURITY_CHECK_FAILED_MESSAGE).await;
            return RedirectOutcome::Rejected(RejectReason::StateMismatch);
        }

        let expires_at =
            credential_expiry(received_at, expires_in_seconds, self.config.expiration_buffer_seconds);
        let progress = self
            .notifier
            .notify(Notification::info(COMPLETING_LOGIN_MESSAGE).auto_close(PROGRESS_AUTO_CLOSE))
            .await;

        let outcome = self.resolve_identity(&access_token, expires_at).await;
        self.notifier.dismiss(progress).await;

        match outcome {
            Ok(credential) => {
                info!(
                    account_id = %credential.account_id,
                    expires_at = %credential.expires_at,
                    "OAuth login completed successfully"
                );
                RedirectOutcome::Authenticated(credential)
            }
            Err(err) => {
                warn!(error = %err, "identity resolution failed");
                self.notify_error(format!(
                    "Problem while completing login.\nPlease retry.\nError: {err}"
                ))
                .await;
                RedirectOutcome::Rejected(RejectReason::IdentityResolution(err.to_string()))
            }
        }
    }

    /// Resolve the user and default account behind an access token
    ///
    /// The external account identifier is optional: a failed lookup is
    /// logged and leaves the field empty.
    ///
    /// # Errors
    /// Returns error if user-info fails or the default account is missing or
    /// ambiguous.
    pub async fn resolve_identity(
        &self,
        access_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Credential, IdentityError> {
        let user = self.identity.fetch_user_info(access_token).await?;
        let account = user.default_account()?;

        let external_account_id = match self
            .identity
            .fetch_external_account_id(&account.base_uri, &account.account_id, access_token)
            .await
        {
            Ok(id) => id,
            Err(err) => {
                debug!(error = %err, "external account id lookup failed; continuing without it");
                None
            }
        };

        Ok(Credential {
            access_token: access_token.to_string(),
            expires_at,
            display_name: user.name.clone(),
            email: user.email.clone(),
            account_id: account.account_id.clone(),
            external_account_id,
            account_name: account.account_name.clone(),
            base_uri: account.base_uri.clone(),
        })
    }

    /// Cancel any login in progress
    ///
    /// Callable from any state; always leaves the service idle.
    pub async fn cancel_login(&self) {
        let window = {
            let mut session = self.session.lock().await;
            session.take_state();
            session.take_window()
        };
        if let Some(handle) = window {
            self.browser.close(&handle).await;
        }
        info!("OAuth login cancelled");
    }

    /// Close the login browser window if one is open (idempotent)
    pub async fn close_window(&self) {
        let window = self.session.lock().await.take_window();
        if let Some(handle) = window {
            self.browser.close(&handle).await;
        }
    }

    /// Current state of the login flow
    pub async fn login_state(&self) -> LoginState {
        self.session.lock().await.login_state()
    }

    /// Check if there's a pending login flow
    pub async fn has_pending_login(&self) -> bool {
        self.session.lock().await.pending_state().is_some()
    }

    fn development_token(&self) -> Option<String> {
        if !self.allow_dev_token {
            return None;
        }
        self.config
            .dev_access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    async fn notify_error(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::error(message).auto_close(ERROR_AUTO_CLOSE)).await;
    }
}

impl<P> std::fmt::Debug for ImplicitLoginService<P>
where
    P: IdentityProviderTrait + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplicitLoginService")
            .field("config", &self.config)
            .field("allow_dev_token", &self.allow_dev_token)
            .finish_non_exhaustive()
    }
}

#[cfg(all(test, feature = "platform"))]
mod tests {
    //! Unit tests for auth::service.
    use super::*;
    use crate::auth::identity::{AccountInfo, UserInfo};
    use crate::auth::types::NotificationLevel;
    use crate::testing::{MockBrowserLauncher, MockIdentityProvider, RecordingNotifier};

    const CALLBACK: &str = "quillsign:/implicit-result#access_token=abc123&expires_in=28800&token_type=bearer&state=";

    struct Harness {
        service: ImplicitLoginService<MockIdentityProvider>,
        identity: Arc<MockIdentityProvider>,
        browser: Arc<MockBrowserLauncher>,
        notifier: Arc<RecordingNotifier>,
    }

    fn user_info() -> UserInfo {
        UserInfo {
            sub: Some("user-guid".into()),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            accounts: vec![
                AccountInfo {
                    account_id: "acc-other".into(),
                    account_name: "Other".into(),
                    base_uri: "https://other.example.net".into(),
                    is_default: false,
                },
                AccountInfo {
                    account_id: "acc-1".into(),
                    account_name: "Ada Co".into(),
                    base_uri: "https://demo.example.net".into(),
                    is_default: true,
                },
            ],
        }
    }

    fn harness_with(config: ImplicitGrantConfig, browser: MockBrowserLauncher) -> Harness {
        let identity = Arc::new(MockIdentityProvider::new(user_info()));
        identity.set_external_account_id(Some("1234567".into()));
        let browser = Arc::new(browser);
        let notifier = Arc::new(RecordingNotifier::new());
        let service = ImplicitLoginService::new(
            config,
            identity.clone(),
            browser.clone(),
            notifier.clone(),
        );
        Harness { service, identity, browser, notifier }
    }

    fn config() -> ImplicitGrantConfig {
        ImplicitGrantConfig::new(
            "https://account-d.example.com",
            "client-123",
            "quillsign",
            "implicit-result",
        )
    }

    fn harness() -> Harness {
        harness_with(config(), MockBrowserLauncher::new())
    }

    async fn pending_state(harness: &Harness) -> String {
        let url = harness.browser.opened_urls().pop().unwrap();
        url.query_pairs().find(|(k, _)| k == "state").map(|(_, v)| v.into_owned()).unwrap()
    }

    /// Validates `ImplicitLoginService::start_login` behavior for the browser
    /// login scenario.
    ///
    /// Assertions:
    /// - Confirms the browser opened the provider authorization URL.
    /// - Confirms the login state is `LoginStarted`.
    /// - Confirms the state is 40 hex characters.
    #[tokio::test]
    async fn test_start_login_opens_browser() {
        let h = harness();

        let start = h.service.start_login().await.unwrap();
        let LoginStart::Browser { authorization_url } = start else {
            panic!("expected browser login");
        };

        assert!(authorization_url
            .as_str()
            .starts_with("https://account-d.example.com/oauth/auth?response_type=token"));
        assert_eq!(h.browser.open_count(), 1);
        assert_eq!(h.service.login_state().await, LoginState::LoginStarted);
        assert_eq!(pending_state(&h).await.len(), 40);
    }

    /// Validates `ImplicitLoginService::handle_redirect_url` behavior for the
    /// matching state scenario.
    ///
    /// Assertions:
    /// - Confirms the identity provider saw access token `abc123`.
    /// - Confirms the credential carries the default account.
    /// - Confirms the expiry applies the 600 second buffer.
    /// - Confirms the browser window was closed and the session is idle.
    #[tokio::test]
    async fn test_matching_state_yields_credential() {
        let h = harness();
        h.service.start_login().await.unwrap();
        let state = pending_state(&h).await;

        let before = Utc::now();
        let outcome = h.service.handle_redirect_url(&format!("{CALLBACK}{state}")).await;
        let after = Utc::now();

        let credential = outcome.credential().cloned().unwrap();
        assert_eq!(h.identity.last_access_token().as_deref(), Some("abc123"));
        assert_eq!(credential.access_token, "abc123");
        assert_eq!(credential.account_id, "acc-1");
        assert_eq!(credential.account_name, "Ada Co");
        assert_eq!(credential.base_uri, "https://demo.example.net");
        assert_eq!(credential.external_account_id.as_deref(), Some("1234567"));
        assert_eq!(credential.display_name, "Ada Lovelace");
        assert!(credential.expires_at >= before + chrono::Duration::seconds(28_200));
        assert!(credential.expires_at <= after + chrono::Duration::seconds(28_200));

        assert_eq!(h.browser.closed_handles().len(), 1);
        assert_eq!(h.service.login_state().await, LoginState::Idle);
        assert_eq!(h.notifier.dismissed().len(), 1);
    }

    /// Validates `ImplicitLoginService::handle_redirect` behavior for the
    /// state mismatch scenario.
    ///
    /// Assertions:
    /// - Confirms the outcome is `Rejected(StateMismatch)`.
    /// - Confirms no identity call was issued.
    /// - Confirms the security notification was shown and state cleared.
    #[tokio::test]
    async fn test_state_mismatch_is_rejected() {
        let h = harness();
        h.service.start_login().await.unwrap();

        let outcome = h.service.handle_redirect_url(&format!("{CALLBACK}other")).await;

        assert_eq!(outcome, RedirectOutcome::Rejected(RejectReason::StateMismatch));
        assert_eq!(h.identity.user_info_calls(), 0);
        assert!(!h.service.has_pending_login().await);
        let errors = h.notifier.messages_at(NotificationLevel::Error);
        assert_eq!(errors, vec![SECURITY_CHECK_FAILED_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_replayed_callback_is_rejected() {
        let h = harness();
        h.service.start_login().await.unwrap();
        let url = format!("{CALLBACK}{}", pending_state(&h).await);

        assert!(h.service.handle_redirect_url(&url).await.credential().is_some());
        let replay = h.service.handle_redirect_url(&url).await;

        assert_eq!(replay, RedirectOutcome::Rejected(RejectReason::StateMismatch));
        assert_eq!(h.identity.user_info_calls(), 1);
    }

    #[tokio::test]
    async fn test_callback_without_login_is_rejected() {
        let h = harness();
        let outcome = h.service.handle_redirect_url(&format!("{CALLBACK}xyz789")).await;

        assert_eq!(outcome, RedirectOutcome::Rejected(RejectReason::StateMismatch));
        assert_eq!(h.identity.user_info_calls(), 0);
    }

    /// Validates `ImplicitLoginService::start_login` behavior for the
    /// restarted login scenario.
    ///
    /// Assertions:
    /// - Ensures a callback for the first state is rejected.
    /// - Confirms the first window was closed when the second opened.
    #[tokio::test]
    async fn test_restart_invalidates_previous_state() {
        let h = harness();
        h.service.start_login().await.unwrap();
        let first = pending_state(&h).await;
        h.service.start_login().await.unwrap();

        let outcome = h.service.handle_redirect_url(&format!("{CALLBACK}{first}")).await;

        assert_eq!(outcome, RedirectOutcome::Rejected(RejectReason::StateMismatch));
        assert_eq!(h.browser.closed_handles().len(), 2);
    }

    #[tokio::test]
    async fn test_unrelated_actions_are_ignored() {
        let h = harness();
        h.service.start_login().await.unwrap();

        let unknown = h.service.handle_redirect_url("quillsign:/settings").await;
        let other_path = h
            .service
            .handle_redirect(RedirectAction::OAuthCallback {
                action_name: "other-result".into(),
                access_token: "abc".into(),
                state: pending_state(&h).await,
                expires_in_seconds: 60,
            })
            .await;

        assert_eq!(unknown, RedirectOutcome::Ignored);
        assert_eq!(other_path, RedirectOutcome::Ignored);
        assert!(h.service.has_pending_login().await);
        assert!(h.browser.closed_handles().is_empty());
        assert!(h.notifier.notifications().is_empty());
    }

    /// Validates `ImplicitLoginService::handle_redirect` behavior for the
    /// user-info failure scenario.
    ///
    /// Assertions:
    /// - Confirms the outcome is an identity rejection naming the status.
    /// - Confirms the error notification starts with the login problem text.
    /// - Ensures the service returns to `Idle`.
    #[tokio::test]
    async fn test_user_info_failure_surfaces_error() {
        let h = harness();
        h.identity.fail_user_info(401, "Unauthorized");
        h.service.start_login().await.unwrap();

        let outcome =
            h.service.handle_redirect_url(&format!("{CALLBACK}{}", pending_state(&h).await)).await;

        let RedirectOutcome::Rejected(RejectReason::IdentityResolution(detail)) = outcome else {
            panic!("expected identity rejection");
        };
        assert!(detail.contains("401"));
        let errors = h.notifier.messages_at(NotificationLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Problem while completing login.\nPlease retry.\nError: "));
        assert_eq!(h.identity.external_calls(), 0);
        assert_eq!(h.service.login_state().await, LoginState::Idle);
    }

    #[tokio::test]
    async fn test_ambiguous_default_account_aborts() {
        let h = harness();
        let mut info = user_info();
        info.accounts.iter_mut().for_each(|account| account.is_default = true);
        h.identity.set_user_info(info);
        h.service.start_login().await.unwrap();

        let outcome =
            h.service.handle_redirect_url(&format!("{CALLBACK}{}", pending_state(&h).await)).await;

        assert!(matches!(outcome, RedirectOutcome::Rejected(RejectReason::IdentityResolution(_))));
        assert_eq!(h.identity.external_calls(), 0);
    }

    #[tokio::test]
    async fn test_external_account_lookup_is_soft_failure() {
        let h = harness();
        h.identity.fail_external_lookup();
        h.service.start_login().await.unwrap();

        let outcome =
            h.service.handle_redirect_url(&format!("{CALLBACK}{}", pending_state(&h).await)).await;

        let credential = outcome.credential().cloned().unwrap();
        assert_eq!(credential.external_account_id, None);
        assert!(h.notifier.messages_at(NotificationLevel::Error).is_empty());
    }

    /// Validates `ImplicitLoginService::start_login` behavior for the browser
    /// failure scenario.
    ///
    /// Assertions:
    /// - Ensures `BrowserError` is returned.
    /// - Ensures no login is left pending.
    #[tokio::test]
    async fn test_browser_failure_leaves_idle() {
        let h = harness_with(config(), MockBrowserLauncher::failing("no display"));

        let result = h.service.start_login().await;

        assert!(matches!(result, Err(LoginServiceError::BrowserError(_))));
        assert!(!h.service.has_pending_login().await);
        assert_eq!(h.notifier.messages_at(NotificationLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_idp_url_is_config_error() {
        let mut config = config();
        config.idp_url = "not a url".into();
        let h = harness_with(config, MockBrowserLauncher::new());

        let result = h.service.start_login().await;

        assert!(matches!(result, Err(LoginServiceError::ConfigError(_))));
        assert_eq!(h.browser.open_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_login_clears_session() {
        let h = harness();
        h.service.start_login().await.unwrap();
        let state = pending_state(&h).await;

        h.service.cancel_login().await;
        h.service.cancel_login().await;

        assert_eq!(h.service.login_state().await, LoginState::Idle);
        assert_eq!(h.browser.closed_handles().len(), 1);
        let outcome = h.service.handle_redirect_url(&format!("{CALLBACK}{state}")).await;
        assert_eq!(outcome, RedirectOutcome::Rejected(RejectReason::StateMismatch));
    }

    #[tokio::test]
    async fn test_close_window_is_idempotent() {
        let h = harness();
        h.service.start_login().await.unwrap();

        h.service.close_window().await;
        h.service.close_window().await;

        assert_eq!(h.browser.closed_handles().len(), 1);
        assert!(h.service.has_pending_login().await);
    }

    /// Validates `ImplicitLoginService::start_login` behavior for the
    /// development token scenario.
    ///
    /// Assertions:
    /// - Confirms no browser window was opened.
    /// - Confirms the credential uses the configured token.
    #[cfg(debug_assertions)]
    #[tokio::test]
    async fn test_development_token_skips_browser() {
        let mut config = config();
        config.dev_access_token = Some("dev-token".into());
        let h = harness_with(config, MockBrowserLauncher::new());

        let start = h.service.start_login().await.unwrap();

        let LoginStart::DevelopmentToken(RedirectOutcome::Authenticated(credential)) = start else {
            panic!("expected development login");
        };
        assert_eq!(credential.access_token, "dev-token");
        assert_eq!(h.browser.open_count(), 0);
        assert_eq!(h.service.login_state().await, LoginState::Idle);
    }
}
