use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend rejected request: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Unavailable(e.to_string())
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Map a non-success HTTP status. The backend reports business failures
    /// inside a 200 reply, so any failing status means it could not be reached.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            429 => ApiError::Unavailable("rate limited".to_string()),
            _ => ApiError::Unavailable(format!("Status {}: {}", status, truncated)),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ApiError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body() {
        assert_eq!(ApiError::truncate_body("short"), "short");

        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(300); // 600 bytes
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 600 total bytes"));
    }

    #[test]
    fn test_from_status_is_unavailable() {
        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(err.is_unavailable());
        assert!(err.to_string().contains("boom"));
    }
}
