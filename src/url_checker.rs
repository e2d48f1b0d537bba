use url::Url;
use tracing::debug;

/// Schemes accepted when no explicit set is given.
pub const DEFAULT_PROTOCOLS: &[&str] = &["http", "https"];

/// Checks that `text` is an absolute URL using one of the default schemes.
pub fn is_valid_url(text: &str) -> bool {
    is_valid_url_with(text, DEFAULT_PROTOCOLS)
}

/// Checks that `text` is an absolute URL whose scheme is in `protocols`.
///
/// Entries may be written with or without the trailing colon (`"https"` or `"https:"`).
/// Anything that fails to parse is reported as invalid.
pub fn is_valid_url_with(text: &str, protocols: &[&str]) -> bool {
    match Url::parse(text) {
        Ok(url) => {
            let scheme = url.scheme();
            protocols
                .iter()
                .any(|p| p.trim_end_matches(':').eq_ignore_ascii_case(scheme))
        }
        Err(err) => {
            debug!(candidate = text, error = %err, "rejected URL candidate");
            false
        }
    }
}
