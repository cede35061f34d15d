//! Envelope submission types
//!
//! An envelope is a signing transaction: one document plus the signer who
//! receives it. These types carry user-entered form data into the signing
//! pipeline and the API outcome back out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signer of an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    pub name: String,
    /// Country calling code for SMS delivery, digits only (e.g. `1`)
    pub sms_country_code: String,
    /// National number for SMS delivery
    pub sms_number: String,
}

/// Reference to the document asset attached to an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// File name looked up by the asset resolver
    pub file_name: String,
    /// Name shown to the signer
    pub display_name: String,
    pub extension: String,
}

/// Everything needed to submit one envelope, besides the credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeRequest {
    pub recipient: Recipient,
    pub subject: String,
    pub document: DocumentRef,
}

/// Rate-limit and trace metadata copied from response headers
///
/// Present on both outcomes; these never decide success or failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDiagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_api_requests: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_requests_reset_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ApiDiagnostics {
    /// True when no diagnostic header was present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.available_api_requests.is_none()
            && self.api_requests_reset_at.is_none()
            && self.trace_id.is_none()
    }
}

/// Why a submission did not produce an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FailureKind {
    /// The document could not be found locally; nothing was sent
    AssetMissing,
    /// No HTTP response was received (DNS, connect, timeout)
    Transport,
    /// The API answered with a non-2xx status
    Api { status: u16 },
    /// The API answered 2xx but the body was not an envelope summary
    InvalidResponse,
}

/// Outcome of an envelope submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum EnvelopeResult {
    Success {
        envelope_id: String,
        #[serde(flatten)]
        diagnostics: ApiDiagnostics,
    },
    Failure {
        error_message: String,
        failure: FailureKind,
        #[serde(flatten)]
        diagnostics: ApiDiagnostics,
    },
}

impl EnvelopeResult {
    /// Build a failure that never reached the network.
    pub fn asset_missing(message: impl Into<String>) -> Self {
        Self::Failure {
            error_message: message.into(),
            failure: FailureKind::AssetMissing,
            diagnostics: ApiDiagnostics::default(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Diagnostics attached to either outcome.
    #[must_use]
    pub const fn diagnostics(&self) -> &ApiDiagnostics {
        match self {
            Self::Success { diagnostics, .. } | Self::Failure { diagnostics, .. } => diagnostics,
        }
    }

    #[must_use]
    pub fn envelope_id(&self) -> Option<&str> {
        match self {
            Self::Success { envelope_id, .. } => Some(envelope_id),
            Self::Failure { .. } => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_message, .. } => Some(error_message),
        }
    }
}
