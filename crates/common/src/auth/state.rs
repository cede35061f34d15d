//! CSRF state tokens for the Implicit Grant flow
//!
//! The state is an opaque value sent with the authorization request and
//! compared for exact equality when the redirect comes back.

use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes in a state token (hex-encoded to 40 characters).
pub const STATE_BYTES: usize = 20;

/// Generate a random state token for CSRF protection
///
/// Returns 20 bytes from the operating system RNG, hex-encoded. Hex keeps the
/// token inside the character class accepted by the redirect parser.
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Validate that the state token matches
///
/// # Arguments
/// * `expected` - The state stored when the login started, if any
/// * `actual` - The state received in the callback
///
/// # Returns
/// `true` only when a state is pending and it equals `actual` exactly
#[must_use]
pub fn validate_state(expected: Option<&str>, actual: &str) -> bool {
    expected.is_some_and(|expected| expected == actual)
}
