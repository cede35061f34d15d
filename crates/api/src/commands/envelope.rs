//! Envelope commands

use std::time::{Duration, Instant};

use chrono::Utc;
use quillsign_common::auth::Notification;
use quillsign_domain::{EnvelopeRequest, EnvelopeResult, QuillSignError, Recipient, Result};
use tracing::info;

use super::auth::SESSION_ENDED_MESSAGE;
use crate::utils::logging::{error_label, log_command_execution};
use crate::AppContext;

const RESULT_AUTO_CLOSE: Duration = Duration::from_secs(10);

/// Send the configured document to `recipient` for signature.
///
/// A credential that has expired is dropped and the user is asked to log in
/// again. The send result is also surfaced as a notification.
///
/// # Errors
/// Returns `Auth` without a usable login and `InvalidInput` for an
/// incomplete recipient form. API and transport failures are not errors:
/// they come back as [`EnvelopeResult::Failure`].
pub async fn send_envelope(ctx: &AppContext, recipient: Recipient) -> Result<EnvelopeResult> {
    let command_name = "envelope::send_envelope";
    let start = Instant::now();

    let result = send(ctx, recipient).await;

    log_command_execution(command_name, start.elapsed(), result.as_ref().err().map(error_label));
    result
}

async fn send(ctx: &AppContext, recipient: Recipient) -> Result<EnvelopeResult> {
    let Some(credential) = ctx.credential().await else {
        return Err(QuillSignError::Auth("Please login first".into()));
    };

    let now = Utc::now();
    if !credential.is_usable_at(now) {
        ctx.clear_credential().await;
        ctx.notifier.notify(Notification::info(SESSION_ENDED_MESSAGE)).await;
        return Err(QuillSignError::Auth(SESSION_ENDED_MESSAGE.into()));
    }

    let request = EnvelopeRequest {
        recipient,
        subject: ctx.config.signing.email_subject.clone(),
        document: ctx.config.signing.document(),
    };
    let result = ctx.signing.submit_for(&credential, &request, now).await?;

    let notification = match &result {
        EnvelopeResult::Success { envelope_id, .. } => {
            info!(%envelope_id, "envelope sent");
            Notification::success(format!("Envelope sent. Envelope ID: {envelope_id}"))
        }
        EnvelopeResult::Failure { error_message, .. } => {
            Notification::error(format!("Problem while sending the envelope.\n{error_message}"))
                .auto_close(RESULT_AUTO_CLOSE)
        }
    };
    ctx.notifier.notify(notification).await;

    Ok(result)
}
