//! Login commands

use std::time::Instant;

use chrono::{DateTime, Utc};
use quillsign_common::auth::{
    Credential, LoginServiceError, LoginStart, Notification, RedirectOutcome, RejectReason,
};
use quillsign_domain::{QuillSignError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::logging::{error_label, log_command_execution};
use crate::AppContext;

/// Shown when a send is attempted with an expired credential.
pub const SESSION_ENDED_MESSAGE: &str = "Your login session has ended. Please login again";

/// Non-secret view of the logged-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub display_name: String,
    pub email: String,
    pub account_name: String,
    pub external_account_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Credential> for SessionInfo {
    fn from(credential: &Credential) -> Self {
        Self {
            display_name: credential.display_name.clone(),
            email: credential.email.clone(),
            account_name: credential.account_name.clone(),
            external_account_id: credential.external_account_id.clone(),
            expires_at: credential.expires_at,
        }
    }
}

fn map_login_error(err: LoginServiceError) -> QuillSignError {
    match err {
        LoginServiceError::ConfigError(msg) => QuillSignError::Config(msg),
        LoginServiceError::BrowserError(msg) => QuillSignError::Platform(msg),
    }
}

/// Apply a redirect outcome to the context.
async fn apply_outcome(ctx: &AppContext, outcome: RedirectOutcome) -> Result<Option<SessionInfo>> {
    match outcome {
        RedirectOutcome::Ignored => Ok(None),
        RedirectOutcome::Rejected(RejectReason::StateMismatch) => {
            Err(QuillSignError::Security("login callback failed the state check".into()))
        }
        RedirectOutcome::Rejected(RejectReason::IdentityResolution(detail)) => {
            Err(QuillSignError::Auth(detail))
        }
        RedirectOutcome::Authenticated(credential) => {
            let session = SessionInfo::from(&credential);
            ctx.store_credential(credential).await;
            ctx.notifier
                .notify(Notification::success(format!(
                    "Welcome {}, you are now logged in",
                    session.display_name
                )))
                .await;
            Ok(Some(session))
        }
    }
}

/// Start the login flow.
///
/// Opens the system browser and returns `None`; with a development token
/// (debug builds) the login completes immediately and the session is
/// returned.
///
/// # Errors
/// Returns `Config` if the authorization URL cannot be built and `Platform`
/// if the browser cannot be opened.
pub async fn start_login(ctx: &AppContext) -> Result<Option<SessionInfo>> {
    let command_name = "auth::start_login";
    let start = Instant::now();

    let result = match ctx.login.start_login().await.map_err(map_login_error) {
        Ok(LoginStart::Browser { authorization_url }) => {
            info!(
                command = command_name,
                host = authorization_url.host_str().unwrap_or_default(),
                "waiting for login callback"
            );
            Ok(None)
        }
        Ok(LoginStart::DevelopmentToken(outcome)) => apply_outcome(ctx, outcome).await,
        Err(err) => Err(err),
    };

    log_command_execution(command_name, start.elapsed(), result.as_ref().err().map(error_label));
    result
}

/// Abandon a pending login (idempotent).
pub async fn cancel_login(ctx: &AppContext) {
    let start = Instant::now();
    ctx.login.cancel_login().await;
    log_command_execution("auth::cancel_login", start.elapsed(), None);
}

/// Handle a URL delivered through the custom scheme.
///
/// Returns `None` for URLs that are not login callbacks.
///
/// # Errors
/// Returns `Security` when the callback state does not match the pending
/// login and `Auth` when the identity provider could not resolve the user.
pub async fn handle_redirect(ctx: &AppContext, raw_url: &str) -> Result<Option<SessionInfo>> {
    let command_name = "auth::handle_redirect";
    let start = Instant::now();

    let outcome = ctx.login.handle_redirect_url(raw_url).await;
    let result = apply_outcome(ctx, outcome).await;

    log_command_execution(command_name, start.elapsed(), result.as_ref().err().map(error_label));
    result
}

/// The logged-in session, if any and still usable.
pub async fn session_status(ctx: &AppContext) -> Option<SessionInfo> {
    ctx.credential().await.filter(Credential::is_usable).as_ref().map(SessionInfo::from)
}

/// Forget the credential and any pending login.
pub async fn logout(ctx: &AppContext) {
    let start = Instant::now();
    let had_session = ctx.clear_credential().await;
    ctx.login.cancel_login().await;
    info!(had_session, "logged out");
    log_command_execution("auth::logout", start.elapsed(), None);
}
