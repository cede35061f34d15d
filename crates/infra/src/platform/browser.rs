//! System browser launcher
//!
//! Opens the authorization URL in the user's default browser. The browser is
//! a separate process, so the handle returned is only a correlation id and
//! closing it is a logged no-op.

use async_trait::async_trait;
use quillsign_common::auth::{BrowserLauncher, WindowHandle};
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowserLauncher;

impl SystemBrowserLauncher {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserLauncher for SystemBrowserLauncher {
    async fn open(&self, url: &Url) -> Result<WindowHandle, String> {
        let target = url.to_string();
        tokio::task::spawn_blocking(move || open::that(target))
            .await
            .map_err(|e| format!("browser launch task failed: {e}"))?
            .map_err(|e| format!("failed to open system browser: {e}"))?;

        let handle = WindowHandle::generate();
        info!(window = %handle, host = url.host_str().unwrap_or_default(), "opened system browser");
        Ok(handle)
    }

    async fn close(&self, handle: &WindowHandle) {
        debug!(window = %handle, "system browser windows are closed by the user");
    }
}
