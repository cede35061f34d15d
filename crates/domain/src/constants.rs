//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Signing API surface
pub const SIGNING_API_PATH: &str = "/restapi/v2.1";
pub const SDK_HEADER_NAME: &str = "X-DocuSign-SDK";
pub const DEFAULT_SDK_HEADER_VALUE: &str = "quillsign1";

// Response diagnostics
pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";
pub const TRACE_TOKEN_HEADER: &str = "X-DocuSign-TraceToken";

// Envelope defaults
pub const DEFAULT_DOCUMENT_FILE_NAME: &str = "World_Wide_Corp_lorem.pdf";
pub const DEFAULT_DOCUMENT_NAME: &str = "Example document.pdf";
pub const DEFAULT_DOCUMENT_EXTENSION: &str = "pdf";
pub const DEFAULT_EMAIL_SUBJECT: &str = "Please sign the attached document";
pub const SIGN_HERE_ANCHOR: &str = "/sn1/";
pub const ENVELOPE_STATUS_SENT: &str = "sent";

// Minimum length of user-entered form fields (email, name, phone)
pub const MIN_FORM_FIELD_LENGTH: usize = 5;

/// User-facing message for failures that happen before any HTTP response.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Networking error: check your Internet and DNS connections";

// Identity provider defaults
pub const DEFAULT_IDP_URL: &str = "https://account-d.docusign.com";
pub const DEFAULT_RETURN_PATH: &str = "implicit-result";
pub const DEFAULT_SCOPE: &str = "signature";
pub const DEFAULT_SCHEME_NAME: &str = "quillsign";
pub const DEFAULT_EXPIRATION_BUFFER_SECS: i64 = 600;

// Geo-IP lookup
pub const DEFAULT_GEOIP_URL: &str = "http://ipwhois.app/json/?objects=country_code";

// HTTP
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
