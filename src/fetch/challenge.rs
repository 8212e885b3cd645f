//! Bot-challenge detection and response classification.
//!
//! A challenge page comes back with a normal transport result, so it has to
//! be recognised from the body (literal markers) or from the
//! `cf-mitigated: challenge` response header.

use super::outcome::FetchResult;

pub const CHALLENGE_MARKERS: [&str; 3] = [
    "<title>Just a moment...</title>",
    "challenge-platform",
    "Verifying you are human",
];

pub const CHALLENGE_HEADER: &str = "cf-mitigated";

#[must_use]
pub fn is_challenge_page(html: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|m| html.contains(m))
}

#[must_use]
pub fn is_challenge_header(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("challenge"))
}

/// Map a completed HTTP exchange onto a [`FetchResult`].
///
/// 404/410 are permanent. A challenge header or marker wins over the status
/// code. Any other non-2xx, and an empty 2xx body, is transient.
#[must_use]
pub fn classify_response(status: u16, challenge_header: Option<&str>, body: String) -> FetchResult {
    if matches!(status, 404 | 410) {
        return FetchResult::NotFound;
    }
    if is_challenge_header(challenge_header) || is_challenge_page(&body) {
        return FetchResult::ChallengeDetected;
    }
    if !(200..300).contains(&status) {
        return FetchResult::TransientFailure(format!("HTTP {status}"));
    }
    if body.trim().is_empty() {
        return FetchResult::TransientFailure("empty response body".to_string());
    }
    FetchResult::Success(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_permanent_even_with_markers() {
        assert_eq!(
            classify_response(404, None, "challenge-platform".into()),
            FetchResult::NotFound
        );
    }

    #[test]
    fn challenge_by_header_or_body() {
        assert_eq!(
            classify_response(403, Some("challenge"), String::new()),
            FetchResult::ChallengeDetected
        );
        assert_eq!(
            classify_response(200, None, "<title>Just a moment...</title>".into()),
            FetchResult::ChallengeDetected
        );
    }

    #[test]
    fn server_errors_are_transient() {
        assert_eq!(
            classify_response(503, None, "down".into()),
            FetchResult::TransientFailure("HTTP 503".into())
        );
    }

    #[test]
    fn ok_body_is_success() {
        assert_eq!(
            classify_response(200, Some("none"), "<html>ok</html>".into()),
            FetchResult::Success("<html>ok</html>".into())
        );
    }
}
