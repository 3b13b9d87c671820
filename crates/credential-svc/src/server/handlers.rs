//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    CredentialsResponse, ErrorResponse, HealthResponse, SaveCredentialsRequest,
    SaveCredentialsResponse, SetSyncStatusRequest, SyncStatusResponse,
};
use common::ServiceError;
use tracing::{info, warn};

use super::state::AppState;
use crate::credentials::CredentialError;

/// Longest accepted user identifier, in characters.
pub const MAX_USER_ID_LEN: usize = 128;

impl From<CredentialError> for ServiceError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Unreadable(e) => ServiceError::CredentialsUnreadable(e.to_string()),
            CredentialError::Encrypt(_) => ServiceError::Internal("encryption failed".into()),
            CredentialError::Repository(e) => ServiceError::Unavailable(e.to_string()),
        }
    }
}

fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(&err))).into_response()
}

fn validate_user_id(user_id: &str) -> Result<(), ServiceError> {
    if user_id.trim().is_empty() {
        return Err(ServiceError::BadRequest("user id must not be empty".into()));
    }
    if user_id.chars().count() > MAX_USER_ID_LEN {
        return Err(ServiceError::BadRequest(format!(
            "user id must be at most {MAX_USER_ID_LEN} characters"
        )));
    }
    Ok(())
}

/// `PUT /credentials/:user_id` — encrypt and store portal credentials.
pub async fn save_credentials(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SaveCredentialsRequest>,
) -> Response {
    if let Err(e) = validate_user_id(&user_id) {
        return error_response(e);
    }
    if req.username.trim().is_empty() || req.password.is_empty() {
        return error_response(ServiceError::BadRequest(
            "username and password are required".into(),
        ));
    }

    match state
        .credentials
        .save(&user_id, &req.username, &req.password)
    {
        Ok(row) => {
            info!(user_id = %user_id, "portal credentials updated");
            let body = SaveCredentialsResponse {
                user_id,
                username: row.username,
                updated_at: row.updated_at,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "saving portal credentials failed");
            error_response(e.into())
        }
    }
}

/// `GET /credentials/:user_id` — return decrypted portal credentials.
///
/// A row that cannot be decrypted yields `500 credentials_unreadable`, never
/// an empty password.
pub async fn get_credentials(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    if let Err(e) = validate_user_id(&user_id) {
        return error_response(e);
    }

    match state.credentials.get(&user_id) {
        Ok(Some(creds)) => {
            let body = CredentialsResponse {
                user_id,
                username: creds.username,
                password: creds.password,
                updated_at: creds.updated_at,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(None) => error_response(ServiceError::NotFound(format!(
            "no credentials stored for {user_id}"
        ))),
        Err(e) => error_response(e.into()),
    }
}

/// `DELETE /credentials/:user_id` — forget stored portal credentials.
pub async fn delete_credentials(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    if let Err(e) = validate_user_id(&user_id) {
        return error_response(e);
    }

    match state.credentials.delete(&user_id) {
        Ok(true) => {
            info!(user_id = %user_id, "portal credentials deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => error_response(ServiceError::NotFound(format!(
            "no credentials stored for {user_id}"
        ))),
        Err(e) => error_response(e.into()),
    }
}

/// `GET /sync-status/:user_id` — report whether a portal sync is running.
pub async fn get_sync_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    if let Err(e) = validate_user_id(&user_id) {
        return error_response(e);
    }

    let status = state.sync_status.get(&user_id).await;
    let body = SyncStatusResponse {
        user_id,
        syncing: status.is_some_and(|s| s.syncing),
        updated_at: status.map(|s| s.updated_at),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `PUT /sync-status/:user_id` — record the portal sync flag.
pub async fn set_sync_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SetSyncStatusRequest>,
) -> Response {
    if let Err(e) = validate_user_id(&user_id) {
        return error_response(e);
    }

    let status = state.sync_status.set(&user_id, req.syncing).await;
    let body = SyncStatusResponse {
        user_id,
        syncing: status.syncing,
        updated_at: Some(status.updated_at),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `DELETE /sync-status/:user_id` — drop the sync flag. Idempotent.
pub async fn clear_sync_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    if let Err(e) = validate_user_id(&user_id) {
        return error_response(e);
    }

    state.sync_status.clear(&user_id).await;
    StatusCode::NO_CONTENT.into_response()
}

/// `GET /health` — liveness and readiness check.
///
/// The key is validated before the listener starts, so the service is ready
/// whenever it answers; `503` means the credential repository is unreachable.
pub async fn health(State(state): State<AppState>) -> Response {
    let cipher_mode = state.credentials.cipher().mode().as_str().to_owned();
    let (status_code, status_str, credentials_stored) = match state.credentials.count() {
        Ok(n) => (StatusCode::OK, "ok", n),
        Err(e) => {
            warn!(error = %e, "credential repository unhealthy");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", 0)
        }
    };

    let body = HealthResponse {
        status: status_str.into(),
        cipher_mode,
        credentials_stored,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}
