//! Response classification.
//!
//! Status codes are checked before content: a 4xx/5xx page is never
//! searched for the required fragment, even when its error page happens
//! to contain it.

use pagewatch_core::{Outcome, ProbeResponse};

/// Classify one probe response against the target's content requirement.
pub fn classify(response: &ProbeResponse, content_requirement: &str) -> Outcome {
    let descriptor = match response {
        ProbeResponse::Unreachable { .. } => return Outcome::Unreachable,
        ProbeResponse::Received(descriptor) => descriptor,
    };

    match descriptor.status_code {
        400..=499 => Outcome::ClientError,
        500..=599 => Outcome::ServerError,
        _ if contains(&descriptor.body, content_requirement) => Outcome::Success,
        _ => Outcome::ContentMismatch,
    }
}

/// Case-sensitive substring test. An empty fragment matches any text.
pub fn contains(text: &str, fragment: &str) -> bool {
    fragment.is_empty() || text.contains(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_finds_fragment() {
        assert!(contains("let's test servers", "server"));
    }

    #[test]
    fn contains_misses_absent_fragment() {
        assert!(!contains("let's test servers", "server22"));
    }

    #[test]
    fn contains_is_case_sensitive() {
        assert!(!contains("let's test servers", "Server"));
    }

    #[test]
    fn empty_fragment_always_matches() {
        assert!(contains("anything", ""));
        assert!(contains("", ""));
    }

    #[test]
    fn unreachable_wins() {
        let response = ProbeResponse::unreachable("connection refused");
        assert_eq!(classify(&response, "hello"), Outcome::Unreachable);
    }

    #[test]
    fn client_error_ignores_body() {
        let response = ProbeResponse::received(404, "hello world");
        assert_eq!(classify(&response, "hello"), Outcome::ClientError);
    }

    #[test]
    fn server_error_ignores_body() {
        let response = ProbeResponse::received(503, "hello world");
        assert_eq!(classify(&response, "hello"), Outcome::ServerError);
    }

    #[test]
    fn status_range_boundaries() {
        assert_eq!(classify(&ProbeResponse::received(399, ""), "x"), Outcome::ContentMismatch);
        assert_eq!(classify(&ProbeResponse::received(400, ""), "x"), Outcome::ClientError);
        assert_eq!(classify(&ProbeResponse::received(499, ""), "x"), Outcome::ClientError);
        assert_eq!(classify(&ProbeResponse::received(500, ""), "x"), Outcome::ServerError);
        assert_eq!(classify(&ProbeResponse::received(599, ""), "x"), Outcome::ServerError);
        assert_eq!(classify(&ProbeResponse::received(600, "x"), "x"), Outcome::Success);
    }

    #[test]
    fn success_when_content_present() {
        let response = ProbeResponse::received(200, "hello world");
        assert_eq!(classify(&response, "hello"), Outcome::Success);
    }

    #[test]
    fn mismatch_when_content_absent() {
        let response = ProbeResponse::received(200, "goodbye");
        assert_eq!(classify(&response, "hello"), Outcome::ContentMismatch);
    }

    #[test]
    fn redirect_status_is_content_checked() {
        let response = ProbeResponse::received(301, "Moved");
        assert_eq!(classify(&response, "Moved"), Outcome::Success);
    }

    #[test]
    fn empty_requirement_skips_content_check() {
        let response = ProbeResponse::received(200, "");
        assert_eq!(classify(&response, ""), Outcome::Success);
    }
}
