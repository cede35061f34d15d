//! Application commands
//!
//! Each command is the single entry point a front end calls for one user
//! action. Commands log their outcome and return domain errors.

pub mod auth;
pub mod envelope;

pub use auth::{
    cancel_login, handle_redirect, logout, session_status, start_login, SessionInfo,
    SESSION_ENDED_MESSAGE,
};
pub use envelope::send_envelope;
