//! Collaborator traits for the login flow
//!
//! These traits keep the state machine free of browser, UI and HTTP details
//! and let tests substitute deterministic implementations.

use async_trait::async_trait;
use url::Url;

use super::identity::{IdentityError, UserInfo};
use super::types::{Notification, NotificationId, WindowHandle};

/// Trait for identity provider calls made after a successful callback
#[async_trait]
pub trait IdentityProviderTrait: Send + Sync {
    /// Fetch the user profile and account list for an access token
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or an unexpected
    /// response shape
    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, IdentityError>;

    /// Fetch the human-friendly identifier of an account
    ///
    /// # Arguments
    /// * `base_uri` - API base URI of the account
    /// * `account_id` - Account GUID
    /// * `access_token` - Bearer token
    ///
    /// # Errors
    /// Returns error on any failure; callers treat this lookup as optional
    async fn fetch_external_account_id(
        &self,
        base_uri: &str,
        account_id: &str,
        access_token: &str,
    ) -> Result<Option<String>, IdentityError>;
}

/// Trait for opening the system browser
///
/// Implementations must use the OS browser, never an embedded web view.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Open `url` and return a handle to the window
    ///
    /// # Errors
    /// Returns a description of why the browser could not be launched
    async fn open(&self, url: &Url) -> Result<WindowHandle, String>;

    /// Request that the window be closed; closing an unknown handle is a no-op
    async fn close(&self, handle: &WindowHandle);
}

/// Trait for user-visible notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Show a notification and return its identifier
    async fn notify(&self, notification: Notification) -> NotificationId;

    /// Remove a notification that is still showing
    async fn dismiss(&self, id: NotificationId);
}
