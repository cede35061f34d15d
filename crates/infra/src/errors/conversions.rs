//! Conversions from external infrastructure errors into domain errors.

use quillsign_domain::QuillSignError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub QuillSignError);

impl From<InfraError> for QuillSignError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<QuillSignError> for InfraError {
    fn from(value: QuillSignError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoQuillSignError {
    fn into_quillsign(self) -> QuillSignError;
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → QuillSignError */
/* -------------------------------------------------------------------------- */

impl IntoQuillSignError for std::io::Error {
    fn into_quillsign(self) -> QuillSignError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => QuillSignError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => {
                QuillSignError::Platform(format!("permission denied: {self}"))
            }
            _ => QuillSignError::Platform(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_quillsign())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → QuillSignError */
/* -------------------------------------------------------------------------- */

impl IntoQuillSignError for HttpError {
    fn into_quillsign(self) -> QuillSignError {
        if self.is_timeout() {
            return QuillSignError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return QuillSignError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => QuillSignError::Auth(message),
                404 => QuillSignError::NotFound(message),
                400..=499 if code != 429 => QuillSignError::InvalidInput(message),
                _ => QuillSignError::Network(message),
            };
        }

        QuillSignError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_quillsign())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
