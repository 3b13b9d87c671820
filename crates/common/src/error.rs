//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::CredentialsUnreadable`] → 500
/// - [`ServiceError::Unavailable`] → 503
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed — empty identifier, missing field, or invalid JSON.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No record exists for the requested user.
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored credentials exist but could not be decrypted (wrong key, corruption, tampering).
    #[error("credentials unreadable: {0}")]
    CredentialsUnreadable(String),

    /// The backing store is temporarily unavailable.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::CredentialsUnreadable(_) => 500,
            ServiceError::Unavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code placed in the `code` field of error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::CredentialsUnreadable(_) => "credentials_unreadable",
            ServiceError::Unavailable(_) => "service_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ServiceError::NotFound("x".into()).http_status(), 404);
        assert_eq!(
            ServiceError::CredentialsUnreadable("x".into()).http_status(),
            500
        );
        assert_eq!(ServiceError::Unavailable("x".into()).http_status(), 503);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn codes_are_distinct_for_decrypt_failures() {
        assert_eq!(
            ServiceError::CredentialsUnreadable("x".into()).code(),
            "credentials_unreadable"
        );
        assert_ne!(
            ServiceError::CredentialsUnreadable("x".into()).code(),
            ServiceError::Internal("x".into()).code()
        );
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("user id must not be empty".into());
        assert!(e.to_string().contains("user id must not be empty"));
    }
}
