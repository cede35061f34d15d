//! Testing utilities and helpers
//!
//! - **[`mocks`]**: Recording doubles for the auth collaborator traits
//!   (browser, notification sink, identity provider)
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use quillsign_common::testing::{MockBrowserLauncher, RecordingNotifier};
//!
//! let browser = Arc::new(MockBrowserLauncher::new());
//! let notifier = Arc::new(RecordingNotifier::new());
//! assert!(notifier.notifications().is_empty());
//! assert_eq!(browser.open_count(), 0);
//! ```

pub mod mocks;

pub use mocks::{MockBrowserLauncher, MockIdentityProvider, RecordingNotifier};
