use std::time::Duration;

use quillsign_domain::QuillSignError;
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"auth::start_login"`).
/// * `elapsed` - Duration the command execution took.
/// * `error_type` - Stable label of the failure, `None` on success.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error_type: Option<&str>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error_type {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(error_type) => {
            warn!(command, duration_ms, error_type, "command_execution_failure");
        }
    }
}

/// Convert a `QuillSignError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &QuillSignError) -> &'static str {
    match error {
        QuillSignError::Config(_) => "config",
        QuillSignError::Platform(_) => "platform",
        QuillSignError::Network(_) => "network",
        QuillSignError::Auth(_) => "auth",
        QuillSignError::Security(_) => "security",
        QuillSignError::NotFound(_) => "not_found",
        QuillSignError::InvalidInput(_) => "invalid_input",
        QuillSignError::Internal(_) => "internal",
    }
}
