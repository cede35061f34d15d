//! Mock implementations of the auth collaborator traits
//!
//! Provides deterministic browser, notification and identity-provider doubles
//! that record every call for later assertions.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::auth::{
    BrowserLauncher, IdentityError, IdentityProviderTrait, Notification, NotificationId,
    NotificationLevel, NotificationSink, UserInfo, WindowHandle,
};

/// Mock system browser
///
/// # Examples
///
/// ```
/// use quillsign_common::testing::MockBrowserLauncher;
///
/// let browser = MockBrowserLauncher::new();
/// assert_eq!(browser.open_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockBrowserLauncher {
    opened: Arc<Mutex<Vec<Url>>>,
    closed: Arc<Mutex<Vec<WindowHandle>>>,
    failure: Option<String>,
}

impl MockBrowserLauncher {
    /// Create a launcher whose `open` always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a launcher whose `open` always fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { failure: Some(reason.into()), ..Self::default() }
    }

    /// URLs passed to `open`, oldest first.
    pub fn opened_urls(&self) -> Vec<Url> {
        self.opened.lock().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().len()
    }

    /// Handles passed to `close`, oldest first.
    pub fn closed_handles(&self) -> Vec<WindowHandle> {
        self.closed.lock().clone()
    }
}

#[async_trait]
impl BrowserLauncher for MockBrowserLauncher {
    async fn open(&self, url: &Url) -> Result<WindowHandle, String> {
        if let Some(reason) = &self.failure {
            return Err(reason.clone());
        }
        let mut opened = self.opened.lock();
        opened.push(url.clone());
        Ok(WindowHandle::new(format!("mock-window-{}", opened.len())))
    }

    async fn close(&self, handle: &WindowHandle) {
        self.closed.lock().push(handle.clone());
    }
}

/// Notification sink that records everything it is asked to show
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    shown: Arc<Mutex<Vec<(NotificationId, Notification)>>>,
    dismissed: Arc<Mutex<Vec<NotificationId>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification shown, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.shown.lock().iter().map(|(_, n)| n.clone()).collect()
    }

    /// Messages of notifications shown at `level`.
    pub fn messages_at(&self, level: NotificationLevel) -> Vec<String> {
        self.shown
            .lock()
            .iter()
            .filter(|(_, n)| n.level == level)
            .map(|(_, n)| n.message.clone())
            .collect()
    }

    pub fn dismissed(&self) -> Vec<NotificationId> {
        self.dismissed.lock().clone()
    }

    /// Notifications shown and not dismissed.
    pub fn visible(&self) -> Vec<Notification> {
        let dismissed = self.dismissed.lock().clone();
        self.shown
            .lock()
            .iter()
            .filter(|(id, _)| !dismissed.contains(id))
            .map(|(_, n)| n.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.shown.lock().clear();
        self.dismissed.lock().clear();
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> NotificationId {
        let id = NotificationId::generate();
        self.shown.lock().push((id, notification));
        id
    }

    async fn dismiss(&self, id: NotificationId) {
        self.dismissed.lock().push(id);
    }
}

/// Identity provider double with configurable responses and call counters
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    user_info: Arc<Mutex<UserInfo>>,
    user_info_failure: Arc<Mutex<Option<(u16, String)>>>,
    external_account_id: Arc<Mutex<Option<String>>>,
    external_failure: Arc<Mutex<bool>>,
    user_info_calls: Arc<Mutex<usize>>,
    external_calls: Arc<Mutex<usize>>,
    last_access_token: Arc<Mutex<Option<String>>>,
}

impl MockIdentityProvider {
    /// Create a provider that answers user-info with `user_info`.
    pub fn new(user_info: UserInfo) -> Self {
        Self {
            user_info: Arc::new(Mutex::new(user_info)),
            user_info_failure: Arc::new(Mutex::new(None)),
            external_account_id: Arc::new(Mutex::new(None)),
            external_failure: Arc::new(Mutex::new(false)),
            user_info_calls: Arc::new(Mutex::new(0)),
            external_calls: Arc::new(Mutex::new(0)),
            last_access_token: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_user_info(&self, user_info: UserInfo) {
        *self.user_info.lock() = user_info;
    }

    /// Make user-info answer with a non-2xx status.
    pub fn fail_user_info(&self, status: u16, reason: &str) {
        *self.user_info_failure.lock() = Some((status, reason.to_string()));
    }

    pub fn set_external_account_id(&self, id: Option<String>) {
        *self.external_account_id.lock() = id;
    }

    /// Make the account lookup fail.
    pub fn fail_external_lookup(&self) {
        *self.external_failure.lock() = true;
    }

    pub fn user_info_calls(&self) -> usize {
        *self.user_info_calls.lock()
    }

    pub fn external_calls(&self) -> usize {
        *self.external_calls.lock()
    }

    /// Access token seen by the most recent call.
    pub fn last_access_token(&self) -> Option<String> {
        self.last_access_token.lock().clone()
    }
}

#[async_trait]
impl IdentityProviderTrait for MockIdentityProvider {
    async fn fetch_user_info(&self, access_token: &str) -> Result<UserInfo, IdentityError> {
        *self.user_info_calls.lock() += 1;
        *self.last_access_token.lock() = Some(access_token.to_string());

        if let Some((status, reason)) = self.user_info_failure.lock().clone() {
            return Err(IdentityError::Status { status, reason });
        }
        Ok(self.user_info.lock().clone())
    }

    async fn fetch_external_account_id(
        &self,
        _base_uri: &str,
        _account_id: &str,
        access_token: &str,
    ) -> Result<Option<String>, IdentityError> {
        *self.external_calls.lock() += 1;
        *self.last_access_token.lock() = Some(access_token.to_string());

        if *self.external_failure.lock() {
            return Err(IdentityError::Status { status: 500, reason: "Mock failure".into() });
        }
        Ok(self.external_account_id.lock().clone())
    }
}
