//! Protocol-launcher argument extraction
//!
//! When the OS opens a custom-scheme URL it starts the executable with the URL
//! somewhere in its arguments. On Windows the handler is registered as
//! `<exe> --protocol-launcher "%1"` and the browser may add switches of its
//! own; elsewhere the URL is the first argument.

use tracing::{debug, warn};

/// Flag placed before the URL in the Windows protocol-handler registration.
pub const PROTOCOL_LAUNCHER_FLAG: &str = "--protocol-launcher";

/// Find the custom-scheme URL among process arguments.
///
/// # Arguments
/// * `args` - Full argument vector, executable path first
/// * `scheme_prefixes` - Registered prefixes such as `quillsign:`
///
/// # Returns
/// The URL to hand to the redirect parser, or `None` when the arguments do not
/// carry exactly one URL for a registered scheme.
#[must_use]
pub fn find_protocol_url<S: AsRef<str>>(args: &[S], scheme_prefixes: &[String]) -> Option<String> {
    let has_scheme = |arg: &str| {
        scheme_prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .any(|prefix| starts_with_ignore_case(arg, prefix))
    };

    if args.iter().any(|arg| arg.as_ref() == PROTOCOL_LAUNCHER_FLAG) {
        let mut matches = args.iter().map(AsRef::as_ref).filter(|arg| has_scheme(arg));
        let url = matches.next();
        if matches.next().is_some() {
            warn!("more than one protocol URL in launch arguments; ignoring all of them");
            return None;
        }
        if url.is_none() {
            warn!(arg_count = args.len(), "protocol launcher flag present without a URL");
        }
        return url.map(str::to_string);
    }

    let candidate = args.get(1).map(AsRef::as_ref)?;
    if has_scheme(candidate) {
        Some(candidate.to_string())
    } else {
        debug!("first launch argument is not a protocol URL");
        None
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.is_char_boundary(prefix.len())
        && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}
