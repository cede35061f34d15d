//! Envelope creation request body
//!
//! Wire shape of `POST /accounts/{id}/envelopes`: one signer with an SMS
//! secondary notification and a sign-here tab anchored on `/sn1/`, and one
//! document sent as base64 with responsive HTML rendering.

use quillsign_domain::constants::{ENVELOPE_STATUS_SENT, SIGN_HERE_ANCHOR};
use quillsign_domain::{DocumentRef, Recipient};
use serde::{Deserialize, Serialize};

const RECIPIENT_ID: &str = "1";
const DOCUMENT_ID: &str = "1";
const SMS_DELIVERY: &str = "SMS";
const ANCHOR_X_OFFSET: &str = "20";
const ANCHOR_UNITS: &str = "pixels";
const HTML_SOURCE_DOCUMENT: &str = "document";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDefinition {
    pub email_subject: String,
    pub status: String,
    pub recipients: Recipients,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipients {
    pub signers: Vec<Signer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    pub email: String,
    pub name: String,
    pub additional_notifications: Vec<AdditionalNotification>,
    pub recipient_id: String,
    pub tabs: Tabs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalNotification {
    pub secondary_delivery_method: String,
    pub phone_number: PhoneNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub country_code: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tabs {
    pub sign_here_tabs: Vec<SignHereTab>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignHereTab {
    pub anchor_string: String,
    pub anchor_x_offset: String,
    pub anchor_units: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    pub file_extension: String,
    pub document_id: String,
    pub document_base64: String,
    pub html_definition: HtmlDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlDefinition {
    pub source: String,
}

impl EnvelopeDefinition {
    /// Build a ready-to-send envelope for a single signer.
    #[must_use]
    pub fn new(
        subject: &str,
        recipient: &Recipient,
        document: &DocumentRef,
        document_base64: String,
    ) -> Self {
        let signer = Signer {
            email: recipient.email.clone(),
            name: recipient.name.clone(),
            additional_notifications: vec![AdditionalNotification {
                secondary_delivery_method: SMS_DELIVERY.to_string(),
                phone_number: PhoneNumber {
                    country_code: recipient.sms_country_code.clone(),
                    number: recipient.sms_number.clone(),
                },
            }],
            recipient_id: RECIPIENT_ID.to_string(),
            tabs: Tabs {
                sign_here_tabs: vec![SignHereTab {
                    anchor_string: SIGN_HERE_ANCHOR.to_string(),
                    anchor_x_offset: ANCHOR_X_OFFSET.to_string(),
                    anchor_units: ANCHOR_UNITS.to_string(),
                }],
            },
        };

        Self {
            email_subject: subject.to_string(),
            status: ENVELOPE_STATUS_SENT.to_string(),
            recipients: Recipients { signers: vec![signer] },
            documents: vec![Document {
                name: document.display_name.clone(),
                file_extension: document.extension.clone(),
                document_id: DOCUMENT_ID.to_string(),
                document_base64,
                html_definition: HtmlDefinition { source: HTML_SOURCE_DOCUMENT.to_string() },
            }],
        }
    }
}
