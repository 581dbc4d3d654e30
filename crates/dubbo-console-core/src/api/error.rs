use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request error {status}: {url}")]
    Http {
        status: u16,
        url: String,
        status_text: String,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unable to reach server: {0}")]
    Unreachable(String),

    #[error("Login rejected - check user name and password")]
    LoginRejected,

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("Failed to update credential storage: {0}")]
    Storage(#[from] StorageError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Error for a non-success response. `reason` is the reason phrase the
    /// server actually sent; without one the canonical phrase is used, and
    /// an unregistered status ends up with empty status text.
    pub fn from_status(status: reqwest::StatusCode, reason: Option<&str>, url: &str, body: &str) -> Self {
        let status_text = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .or_else(|| status.canonical_reason())
            .unwrap_or_default();
        ApiError::Http {
            status: status.as_u16(),
            url: url.to_string(),
            status_text: status_text.to_string(),
            body: Self::truncate_body(body),
        }
    }

    /// Status code of the response, if one arrived
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request never produced a response
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Unreachable(_))
    }

    /// The registry no longer accepts the stored token
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_keeps_reason() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, None, "http://host/api/dev/services", "");
        match err {
            ApiError::Http { status, url, status_text, .. } => {
                assert_eq!(status, 404);
                assert_eq!(url, "http://host/api/dev/services");
                assert_eq!(status_text, "Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_status_has_empty_reason() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = ApiError::from_status(status, None, "u", "");
        assert!(matches!(err, ApiError::Http { ref status_text, .. } if status_text.is_empty()));
    }

    #[test]
    fn test_sent_reason_wins_over_canonical() {
        let status = StatusCode::from_u16(999).unwrap();
        let err = ApiError::from_status(status, Some("Strange Things"), "u", "");
        assert!(matches!(err, ApiError::Http { ref status_text, .. } if status_text == "Strange Things"));

        let err = ApiError::from_status(StatusCode::NOT_FOUND, Some("  "), "u", "");
        assert!(matches!(err, ApiError::Http { ref status_text, .. } if status_text == "Not Found"));
    }

    #[test]
    fn test_body_is_truncated() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None, "u", &body);
        let ApiError::Http { body, .. } = err else {
            panic!("expected http error");
        };
        assert!(body.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(body.ends_with("(truncated, 2000 total bytes)"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "é".repeat(400);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_classification() {
        assert!(ApiError::Unreachable("refused".into()).is_network());
        assert!(!ApiError::LoginRejected.is_network());
        let unauthorized = ApiError::from_status(StatusCode::UNAUTHORIZED, None, "u", "");
        assert!(unauthorized.is_unauthorized());
        assert_eq!(unauthorized.status(), Some(401));
    }
}
