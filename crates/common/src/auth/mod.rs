//! OAuth 2.0 Implicit Grant over a custom URL scheme
//!
//! This module implements the desktop side of the Implicit Grant flow: the
//! provider redirects to an OS-registered scheme (`quillsign:/implicit-result`)
//! with the access token in the URL fragment, and the OS hands that URL to the
//! application.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────┐
//! │ ImplicitLoginService  │  State machine (pending state + window handle)
//! └──────────┬────────────┘
//!            │
//!            ├──► parse_redirect_url   (raw URL → RedirectAction)
//!            ├──► IdentityProviderTrait (user-info + account lookup)
//!            ├──► BrowserLauncher       (system browser, never embedded)
//!            └──► NotificationSink      (user-visible messages)
//! ```
//!
//! # Usage Example
//!
//! Requires the `test-utils` feature for the mock collaborators.
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use quillsign_common::auth::{
//!     IdentityClient, ImplicitGrantConfig, ImplicitLoginService, RedirectOutcome,
//! };
//! use quillsign_common::testing::{MockBrowserLauncher, RecordingNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ImplicitGrantConfig::new(
//!         "https://account-d.docusign.com",
//!         "integration-key",
//!         "quillsign",
//!         "implicit-result",
//!     );
//!     let identity = Arc::new(IdentityClient::new(&config, "quillsign1")?);
//!     let service = ImplicitLoginService::new(
//!         config,
//!         identity,
//!         Arc::new(MockBrowserLauncher::new()),
//!         Arc::new(RecordingNotifier::new()),
//!     );
//!
//!     service.start_login().await?;
//!
//!     // ... the OS later delivers the redirect URL ...
//!     let raw = "quillsign:/implicit-result#access_token=...";
//!     if let RedirectOutcome::Authenticated(credential) = service.handle_redirect_url(raw).await {
//!         println!("Logged in as {}", credential.email);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: Configuration, `RedirectAction`, `Credential`,
//!   notifications
//! - **[`state`]**: CSRF state generation and comparison
//! - **[`redirect`]**: Raw redirect URL parser
//! - **[`protocol`]**: Protocol-launcher argument extraction
//! - **[`identity`]**: User-info and account lookup client
//! - **[`session`]**: Pending state and window handle
//! - **[`service`]**: Login state machine
//! - **[`traits`]**: Collaborator traits

pub mod identity;
pub mod protocol;
pub mod redirect;
pub mod service;
pub mod session;
pub mod state;
pub mod traits;
pub mod types;

// Re-export commonly used types and functions
pub use identity::{AccountInfo, IdentityClient, IdentityError, UserInfo, SDK_HEADER_NAME};
pub use protocol::{find_protocol_url, PROTOCOL_LAUNCHER_FLAG};
pub use redirect::parse_redirect_url;
pub use service::{
    ImplicitLoginService, LoginServiceError, COMPLETING_LOGIN_MESSAGE,
    SECURITY_CHECK_FAILED_MESSAGE,
};
pub use session::OAuthSession;
pub use state::{generate_state, validate_state};
pub use traits::{BrowserLauncher, IdentityProviderTrait, NotificationSink};
pub use types::{
    credential_expiry, Credential, ImplicitGrantConfig, LoginStart, LoginState, Notification,
    NotificationId, NotificationLevel, RedirectAction, RedirectOutcome, RejectReason,
    WindowHandle,
};
