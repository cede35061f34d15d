//! Envelope submission service - core business logic

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use quillsign_common::auth::Credential;
use quillsign_common::validation::{EmailValidator, StringValidator, Validator};
use quillsign_domain::constants::MIN_FORM_FIELD_LENGTH;
use quillsign_domain::{
    DocumentRef, EnvelopeRequest, EnvelopeResult, QuillSignError, Recipient, Result,
};
use tracing::{info, instrument, warn};

use super::definition::EnvelopeDefinition;
use super::ports::{AssetResolver, EnvelopeGateway};

/// Envelope submission service
pub struct SigningService {
    assets: Arc<dyn AssetResolver>,
    gateway: Arc<dyn EnvelopeGateway>,
}

impl SigningService {
    /// Create a new signing service
    pub fn new(assets: Arc<dyn AssetResolver>, gateway: Arc<dyn EnvelopeGateway>) -> Self {
        Self { assets, gateway }
    }

    /// Build and send an envelope for one recipient.
    ///
    /// The document is looked up through the [`AssetResolver`]; when it
    /// cannot be found no request is made and the failure names the
    /// application base path. Everything past that point is reported by the
    /// gateway.
    #[instrument(skip_all, fields(account_id = %account_id, document = %document.file_name))]
    pub async fn submit(
        &self,
        base_uri: &str,
        account_id: &str,
        access_token: &str,
        document: &DocumentRef,
        recipient: &Recipient,
        subject: &str,
    ) -> EnvelopeResult {
        let Some(path) = self.assets.locate(&document.file_name).await else {
            let base_path = self.assets.base_path();
            warn!(%base_path, "document asset not found");
            return EnvelopeResult::asset_missing(format!(
                "Could not locate document file. [appPath: {base_path}]"
            ));
        };

        let bytes = match self.assets.read(&path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "document asset unreadable");
                return EnvelopeResult::asset_missing(format!(
                    "Could not read document file. [path: {}]",
                    path.display()
                ));
            }
        };

        let definition = EnvelopeDefinition::new(subject, recipient, document, STANDARD.encode(bytes));
        let result =
            self.gateway.create_envelope(base_uri, account_id, access_token, &definition).await;

        match &result {
            EnvelopeResult::Success { envelope_id, .. } => info!(%envelope_id, "envelope sent"),
            EnvelopeResult::Failure { failure, .. } => warn!(?failure, "envelope not sent"),
        }
        result
    }

    /// Submit on behalf of a logged-in user.
    ///
    /// # Errors
    /// Returns [`QuillSignError::Auth`] when the credential is no longer
    /// usable at `now`, and [`QuillSignError::InvalidInput`] when a recipient,
    /// subject or document field is missing or malformed. No request is made
    /// in either case.
    pub async fn submit_for(
        &self,
        credential: &Credential,
        request: &EnvelopeRequest,
        now: DateTime<Utc>,
    ) -> Result<EnvelopeResult> {
        if !credential.is_usable_at(now) {
            return Err(QuillSignError::Auth(format!(
                "credential expired at {}",
                credential.expires_at.to_rfc3339()
            )));
        }
        validate_request(request)?;

        Ok(self
            .submit(
                &credential.base_uri,
                &credential.account_id,
                &credential.access_token,
                &request.document,
                &request.recipient,
                &request.subject,
            )
            .await)
    }
}

impl std::fmt::Debug for SigningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningService").finish_non_exhaustive()
    }
}

/// Check the recipient form and document reference before any I/O.
///
/// # Errors
/// Returns [`QuillSignError::InvalidInput`] listing every failing field.
pub fn validate_request(request: &EnvelopeRequest) -> Result<()> {
    let form_field = StringValidator::new().not_empty().min_length(MIN_FORM_FIELD_LENGTH);
    let mut validator = Validator::new();

    let recipient = &request.recipient;
    validator.validate_field("email", &recipient.email, &EmailValidator::new());
    validator.validate_field("email", &recipient.email, &form_field);
    validator.validate_field("name", &recipient.name, &form_field);
    validator.validate_field("sms_number", &recipient.sms_number, &form_field);
    validator.validate_field(
        "sms_country_code",
        &recipient.sms_country_code,
        &StringValidator::new().not_empty().digits_only(),
    );
    validator.validate_not_empty("subject", &request.subject);
    validator.validate_not_empty("document.file_name", &request.document.file_name);
    validator.validate_not_empty("document.display_name", &request.document.display_name);
    validator.validate_not_empty("document.extension", &request.document.extension);

    validator.finish().map_err(|err| QuillSignError::InvalidInput(err.to_string()))
}

#[cfg(test)]
mod tests {
    //! Unit tests for signing::service.
    use super::*;

    fn request() -> EnvelopeRequest {
        EnvelopeRequest {
            recipient: Recipient {
                email: "ada@example.com".into(),
                name: "Ada Lovelace".into(),
                sms_country_code: "1".into(),
                sms_number: "5551234567".into(),
            },
            subject: "Please sign".into(),
            document: DocumentRef {
                file_name: "contract.pdf".into(),
                display_name: "Contract".into(),
                extension: "pdf".into(),
            },
        }
    }

    #[test]
    fn complete_request_is_valid() {
        assert!(validate_request(&request()).is_ok());
    }

    /// Validates `validate_request` behavior for the short field scenario.
    ///
    /// Assertions:
    /// - Ensures fields shorter than five characters are rejected.
    /// - Ensures the error names the offending field.
    #[test]
    fn short_name_is_rejected() {
        let mut req = request();
        req.recipient.name = "Ada".into();

        let err = validate_request(&req).unwrap_err();

        assert!(matches!(err, QuillSignError::InvalidInput(ref msg) if msg.contains("name")));
    }

    #[test]
    fn country_code_must_be_digits() {
        let mut req = request();
        req.recipient.sms_country_code = "+44".into();
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn empty_subject_and_document_are_rejected() {
        let mut req = request();
        req.subject = "  ".into();
        req.document.extension = String::new();

        let err = validate_request(&req).unwrap_err().to_string();

        assert!(err.contains("subject"));
        assert!(err.contains("document.extension"));
    }
}
