//! Request and response types exchanged over the HTTP API.
//!
//! All bodies are JSON. Timestamps are RFC 3339 strings in UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Request body for `PUT /credentials/:user_id`.
#[derive(Clone, Serialize, Deserialize)]
pub struct SaveCredentialsRequest {
    /// Login name on the external salon-management portal.
    pub username: String,
    /// Portal password in plaintext. Encrypted before it is stored.
    pub password: String,
}

impl std::fmt::Debug for SaveCredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveCredentialsRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful response body for `PUT /credentials/:user_id`.
///
/// Deliberately carries no password, plaintext or encrypted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCredentialsResponse {
    pub user_id: String,
    pub username: String,
    pub updated_at: DateTime<Utc>,
}

/// Successful response body for `GET /credentials/:user_id`.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsResponse {
    pub user_id: String,
    pub username: String,
    /// Decrypted portal password.
    pub password: String,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for CredentialsResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsResponse")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Sync status
// ---------------------------------------------------------------------------

/// Request body for `PUT /sync-status/:user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSyncStatusRequest {
    /// Whether a portal sync is currently running for the user.
    pub syncing: bool,
}

/// Response body for `GET` and `PUT /sync-status/:user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatusResponse {
    pub user_id: String,
    pub syncing: bool,
    /// `None` when no live status is held for the user.
    pub updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Cipher mode used for new encryptions (`"cbc"` or `"sealed"`).
    pub cipher_mode: String,
    /// Number of users with stored credentials.
    pub credentials_stored: usize,
}
