//! URL manipulation utilities.
//!
//! Listing and profile links carry tracking parameters; these helpers strip
//! them without otherwise normalising the URL (no trailing-slash rewrite).

use regex::Regex;
use std::sync::LazyLock;

static TRACKING_PARAMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&](adSubId|fli|trk|utm_\w+)=[^&]*")
        .expect("BUG: hardcoded tracking-parameter regex is invalid")
});

/// Drop the query string (and fragment) from a URL.
#[must_use]
pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Remove `adSubId`, `fli`, `trk` and `utm_*` query parameters.
///
/// Other parameters survive in their original order.
///
/// ```
/// # use attorney_scrape::utils::url_utils::strip_tracking_params;
/// assert_eq!(
///     strip_tracking_params("https://firm.example/?utm_source=sl&id=4"),
///     "https://firm.example/?id=4"
/// );
/// assert_eq!(strip_tracking_params("https://firm.example/?trk=x"), "https://firm.example/");
/// ```
#[must_use]
pub fn strip_tracking_params(url: &str) -> String {
    let cleaned = TRACKING_PARAMS.replace_all(url, "");
    let mut cleaned = cleaned.replacen("?&", "?", 1);
    if url.contains('?')
        && !cleaned.contains('?')
        && let Some(amp) = cleaned.find('&')
    {
        // First param was removed together with its '?'
        cleaned.replace_range(amp..=amp, "?");
    }
    if cleaned.ends_with('?') {
        cleaned.pop();
    }
    cleaned
}

/// Join a site root and a path without doubling slashes.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
