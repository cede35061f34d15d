//! Rate-limit and trace header extraction
//!
//! The envelope API reports the remaining request budget, the instant the
//! budget resets (unix seconds) and a trace token on every response,
//! successful or not.

use chrono::{DateTime, Utc};
use quillsign_domain::constants::{
    RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER, TRACE_TOKEN_HEADER,
};
use quillsign_domain::ApiDiagnostics;
use reqwest::header::HeaderMap;

/// Read the diagnostics headers; absent or malformed values are `None`.
pub fn diagnostics_from_headers(headers: &HeaderMap) -> ApiDiagnostics {
    ApiDiagnostics {
        available_api_requests: header_str(headers, RATE_LIMIT_REMAINING_HEADER)
            .and_then(|value| value.parse().ok()),
        api_requests_reset_at: header_str(headers, RATE_LIMIT_RESET_HEADER)
            .and_then(|value| value.parse::<i64>().ok())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        trace_id: header_str(headers, TRACE_TOKEN_HEADER)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok()).map(str::trim)
}
