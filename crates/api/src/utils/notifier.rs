//! Notification sink for the headless binary
//!
//! Notifications are written to the log and kept in a list until they are
//! dismissed or their auto-close delay runs out.

use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;
use quillsign_common::auth::{Notification, NotificationId, NotificationLevel, NotificationSink};
use tracing::{error, info};

#[derive(Debug)]
struct Shown {
    id: NotificationId,
    notification: Notification,
    expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct TracingNotifier {
    shown: Mutex<Vec<Shown>>,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications neither dismissed nor auto-closed.
    pub fn visible(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut shown = self.shown.lock();
        shown.retain(|entry| entry.expires_at.map_or(true, |at| at > now));
        shown.iter().map(|entry| entry.notification.clone()).collect()
    }
}

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, notification: Notification) -> NotificationId {
        let id = NotificationId::generate();
        match notification.level {
            NotificationLevel::Error => error!(message = %notification.message, "notification"),
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(level = ?notification.level, message = %notification.message, "notification");
            }
        }

        let expires_at = notification.auto_close.map(|delay| Instant::now() + delay);
        self.shown.lock().push(Shown { id, notification, expires_at });
        id
    }

    async fn dismiss(&self, id: NotificationId) {
        self.shown.lock().retain(|entry| entry.id != id);
    }
}
