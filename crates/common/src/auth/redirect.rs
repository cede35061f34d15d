//! Redirect URL parsing
//!
//! The OS hands the application whatever URL was opened with the registered
//! scheme, so the input is attacker-influenceable. Parsing is total: every
//! input that is not a well-formed login callback becomes
//! [`RedirectAction::Unknown`].
//!
//! The fragment is validated on the raw input; [`Url`] is used only for the
//! path/host check. That check is a coarse substring match. It is not the CSRF
//! defense; the state comparison in [`super::service`] is.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error};
use url::Url;

use super::types::RedirectAction;

const FRAGMENT_MARKER: &str = "#access_token=";

/// Characters permitted anywhere in the callback fragment.
static FRAGMENT_ALLOW_LIST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[#.\-&=_a-zA-Z0-9]*$")
        .expect("fragment allow-list regex should compile - this is a bug")
});

/// Fixed positional grammar of the Implicit Grant fragment.
static FRAGMENT_FIELDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#access_token=(.*)&expires_in=(.*)&token_type=(.*)&state=(.*)$")
        .expect("fragment field regex should compile - this is a bug")
});

/// Parse a raw URL delivered by the OS into a typed action.
///
/// # Arguments
/// * `raw_url` - URL exactly as received from the protocol launcher
/// * `return_path` - Configured return-path token (e.g. `implicit-result`)
///
/// Single-slash (`scheme:/implicit-result`) and double-slash
/// (`scheme://implicit-result`) forms are both accepted: the token is looked
/// for case-insensitively in the path and in the host.
///
/// # Examples
/// ```
/// use quillsign_common::auth::{parse_redirect_url, RedirectAction};
///
/// let action = parse_redirect_url(
///     "quillsign:/implicit-result#access_token=abc123&expires_in=28800&token_type=bearer&state=xyz789",
///     "implicit-result",
/// );
/// assert!(matches!(action, RedirectAction::OAuthCallback { expires_in_seconds: 28800, .. }));
/// ```
#[must_use]
pub fn parse_redirect_url(raw_url: &str, return_path: &str) -> RedirectAction {
    let unknown = || RedirectAction::Unknown { raw_url: raw_url.to_string() };

    let Ok(url) = Url::parse(raw_url) else {
        debug!(len = raw_url.len(), "redirect URL did not parse");
        return unknown();
    };

    if !matches_return_path(&url, return_path) {
        debug!(scheme = url.scheme(), "redirect URL is not the login callback");
        return unknown();
    }

    // The URL parser strips tabs and newlines, so the fragment is checked as
    // it was received.
    let Some((_, fragment)) = raw_url.split_once('#') else {
        debug!("login callback has no fragment");
        return unknown();
    };
    let hash = format!("#{fragment}");

    if !hash.starts_with(FRAGMENT_MARKER) {
        debug!("login callback fragment does not start with the access token");
        return unknown();
    }

    if !FRAGMENT_ALLOW_LIST.is_match(&hash) {
        error!(
            fragment_len = hash.len(),
            "potential injection attempt: disallowed characters in redirect fragment"
        );
        return unknown();
    }

    let Some(captures) = FRAGMENT_FIELDS.captures(&hash) else {
        debug!("login callback fragment does not match the expected field layout");
        return unknown();
    };

    let access_token = captures.get(1).map_or("", |m| m.as_str());
    let expires_in = captures.get(2).map_or("", |m| m.as_str());
    let state = captures.get(4).map_or("", |m| m.as_str());

    if access_token.is_empty() || state.is_empty() {
        debug!("login callback is missing the access token or state");
        return unknown();
    }

    let Ok(expires_in_seconds) = expires_in.parse::<u64>() else {
        debug!("login callback expires_in is not a non-negative integer");
        return unknown();
    };

    RedirectAction::OAuthCallback {
        action_name: return_path.to_string(),
        access_token: access_token.to_string(),
        state: state.to_string(),
        expires_in_seconds,
    }
}

fn matches_return_path(url: &Url, return_path: &str) -> bool {
    let needle = return_path.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }

    let in_path = url.path().to_lowercase().contains(&needle);
    let in_host = url.host_str().is_some_and(|host| host.to_lowercase().contains(&needle));
    in_path || in_host
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::redirect.
    use super::*;

    const RETURN_PATH: &str = "implicit-result";
    const CALLBACK: &str = "quillsign:/implicit-result#access_token=abc123&expires_in=28800&token_type=bearer&state=xyz789";

    fn callback(access_token: &str, state: &str, expires_in_seconds: u64) -> RedirectAction {
        RedirectAction::OAuthCallback {
            action_name: RETURN_PATH.to_string(),
            access_token: access_token.to_string(),
            state: state.to_string(),
            expires_in_seconds,
        }
    }

    /// Validates `parse_redirect_url` behavior for the single slash callback
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the four fragment fields are extracted.
    /// - Confirms `action_name` is the configured return path.
    #[test]
    fn parses_single_slash_callback() {
        assert_eq!(parse_redirect_url(CALLBACK, RETURN_PATH), callback("abc123", "xyz789", 28800));
    }

    #[test]
    fn parses_double_slash_callback_from_host() {
        let raw = "quillsign://implicit-result#access_token=abc&expires_in=3600&token_type=bearer&state=s1";
        assert_eq!(parse_redirect_url(raw, RETURN_PATH), callback("abc", "s1", 3600));
    }

    #[test]
    fn return_path_match_is_case_insensitive() {
        let raw = "QuillSign:/Implicit-Result#access_token=abc&expires_in=1&token_type=bearer&state=s";
        assert!(parse_redirect_url(raw, RETURN_PATH).is_callback());
    }

    /// Validates `parse_redirect_url` behavior for the script injection
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the result is `Unknown` carrying the raw URL.
    #[test]
    fn rejects_disallowed_fragment_characters() {
        let raw = "quillsign:/implicit-result#access_token=abc<script>&state=xyz";
        assert_eq!(
            parse_redirect_url(raw, RETURN_PATH),
            RedirectAction::Unknown { raw_url: raw.to_string() }
        );
    }

    #[test]
    fn rejects_percent_and_punctuation_in_fragment() {
        for fragment in [
            "access_token=a%20b&expires_in=1&token_type=bearer&state=s",
            "access_token=a/b&expires_in=1&token_type=bearer&state=s",
            "access_token=a+b&expires_in=1&token_type=bearer&state=s",
            "access_token=a'b&expires_in=1&token_type=bearer&state=s",
            "access_token=a:b&expires_in=1&token_type=bearer&state=s",
        ] {
            let raw = format!("quillsign:/implicit-result#{fragment}");
            assert!(!parse_redirect_url(&raw, RETURN_PATH).is_callback(), "accepted {raw}");
        }
    }

    /// Validates `parse_redirect_url` behavior for the control character
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures a tab, LF or CR anywhere in the fragment gives `Unknown`,
    ///   even though URL parsing would strip it.
    #[test]
    fn rejects_whitespace_controls_in_fragment() {
        for raw in [
            "quillsign:/implicit-result#access_token=ab\tc&expires_in=1&token_type=bearer&state=s",
            "quillsign:/implicit-result#access_token=abc&expires_in=1\n&token_type=bearer&state=s",
            "quillsign:/implicit-result#access_token=abc&expires_in=1&token_type=bearer&state=s\r",
        ] {
            assert_eq!(
                parse_redirect_url(raw, RETURN_PATH),
                RedirectAction::Unknown { raw_url: raw.to_string() },
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn ignores_other_paths() {
        let raw = "quillsign:/something-else#access_token=abc&expires_in=1&token_type=bearer&state=s";
        assert!(!parse_redirect_url(raw, RETURN_PATH).is_callback());
    }

    #[test]
    fn requires_access_token_marker_first() {
        let no_fragment = "quillsign:/implicit-result";
        let wrong_order =
            "quillsign:/implicit-result#state=s&access_token=abc&expires_in=1&token_type=bearer";
        let error_fragment = "quillsign:/implicit-result#error=access_denied";

        for raw in [no_fragment, wrong_order, error_fragment] {
            assert!(!parse_redirect_url(raw, RETURN_PATH).is_callback(), "accepted {raw}");
        }
    }

    /// Validates `parse_redirect_url` behavior for the structural mismatch
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures a fragment missing `state` is `Unknown`.
    /// - Ensures a non-numeric `expires_in` is `Unknown`.
    /// - Ensures an empty access token is `Unknown`.
    #[test]
    fn rejects_structurally_invalid_fragments() {
        for raw in [
            "quillsign:/implicit-result#access_token=abc&expires_in=1&token_type=bearer",
            "quillsign:/implicit-result#access_token=abc&expires_in=soon&token_type=bearer&state=s",
            "quillsign:/implicit-result#access_token=abc&expires_in=-5&token_type=bearer&state=s",
            "quillsign:/implicit-result#access_token=&expires_in=1&token_type=bearer&state=s",
            "quillsign:/implicit-result#access_token=abc&expires_in=1&token_type=bearer&state=",
        ] {
            assert!(!parse_redirect_url(raw, RETURN_PATH).is_callback(), "accepted {raw}");
        }
    }

    #[test]
    fn unparseable_input_is_unknown() {
        for raw in ["", "not a url", "implicit-result#access_token=abc"] {
            assert_eq!(
                parse_redirect_url(raw, RETURN_PATH),
                RedirectAction::Unknown { raw_url: raw.to_string() }
            );
        }
    }

    #[test]
    fn empty_return_path_never_matches() {
        assert!(!parse_redirect_url(CALLBACK, "").is_callback());
    }

    #[test]
    fn extracted_fields_stay_inside_allow_list() {
        let raw = "quillsign:/implicit-result#access_token=eyJ0eXAi.eyJzdWIi.sig-_x&expires_in=28800&token_type=bearer&state=0f9a";
        let RedirectAction::OAuthCallback { access_token, state, .. } =
            parse_redirect_url(raw, RETURN_PATH)
        else {
            panic!("expected callback");
        };

        assert_eq!(access_token, "eyJ0eXAi.eyJzdWIi.sig-_x");
        assert_eq!(state, "0f9a");
    }
}
