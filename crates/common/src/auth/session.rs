//! Per-process login session state

use super::types::{LoginState, WindowHandle};

/// Mutable state of the single login attempt a process may have in flight
///
/// Owned by [`super::service::ImplicitLoginService`] behind a mutex; nothing
/// else reads or writes it.
#[derive(Debug, Default)]
pub struct OAuthSession {
    pending_state: Option<String>,
    browser_handle: Option<WindowHandle>,
}

impl OAuthSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new pending state, replacing any earlier one.
    ///
    /// A callback for the replaced state will fail the equality check.
    pub fn begin(&mut self, state: String) {
        self.pending_state = Some(state);
    }

    /// Remember the window opened for the current attempt and return the
    /// handle it replaced, if any.
    pub fn attach_window(&mut self, handle: WindowHandle) -> Option<WindowHandle> {
        self.browser_handle.replace(handle)
    }

    /// Consume the pending state.
    pub fn take_state(&mut self) -> Option<String> {
        self.pending_state.take()
    }

    /// Consume the window handle.
    pub fn take_window(&mut self) -> Option<WindowHandle> {
        self.browser_handle.take()
    }

    #[must_use]
    pub fn pending_state(&self) -> Option<&str> {
        self.pending_state.as_deref()
    }

    #[must_use]
    pub const fn has_window(&self) -> bool {
        self.browser_handle.is_some()
    }

    #[must_use]
    pub const fn login_state(&self) -> LoginState {
        if self.pending_state.is_some() {
            LoginState::LoginStarted
        } else {
            LoginState::Idle
        }
    }
}
