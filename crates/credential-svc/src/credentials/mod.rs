//! Credential store: saves portal credentials with the password encrypted and
//! returns them decrypted to the portal-login workflow.
//!
//! # Invariants
//!
//! - The plaintext password is never persisted, logged, or included in traces.
//! - A row that fails to decrypt is an error, never an empty or garbage password.

pub mod repository;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::crypto::{CipherError, CredentialCipher};
pub use repository::{CredentialRepository, InMemoryCredentialRepository, RepositoryError, StoredCredential};

/// Errors produced by [`CredentialService`].
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The stored password could not be decrypted.
    #[error("stored credentials could not be decrypted: {0}")]
    Unreadable(#[source] CipherError),

    /// The password could not be encrypted.
    #[error("failed to encrypt credentials: {0}")]
    Encrypt(#[source] CipherError),

    /// The repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Decrypted portal credentials, held only for the duration of a request.
#[derive(Clone, PartialEq, Eq)]
pub struct PortalCredentials {
    pub username: String,
    pub password: String,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for PortalCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Encrypting front for a [`CredentialRepository`].
#[derive(Clone)]
pub struct CredentialService {
    repo: Arc<dyn CredentialRepository>,
    cipher: CredentialCipher,
}

impl CredentialService {
    pub fn new(repo: Arc<dyn CredentialRepository>, cipher: CredentialCipher) -> Self {
        Self { repo, cipher }
    }

    pub fn cipher(&self) -> &CredentialCipher {
        &self.cipher
    }

    /// Encrypt `password` and store it with `username` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Encrypt`] or [`CredentialError::Repository`].
    pub fn save(
        &self,
        user_id: &str,
        username: &str,
        password: &str,
    ) -> Result<StoredCredential, CredentialError> {
        let encrypted_password = self
            .cipher
            .encrypt(password)
            .map_err(CredentialError::Encrypt)?;
        let row = StoredCredential {
            username: username.to_owned(),
            encrypted_password,
            updated_at: Utc::now(),
        };
        self.repo.put(user_id, row.clone())?;
        debug!(user_id, "portal credentials saved");
        Ok(row)
    }

    /// Load and decrypt the credentials for `user_id`.
    ///
    /// Rows written in a format other than the current cipher mode's are
    /// re-encrypted and written back, only if the row is still the one that was
    /// read. A skipped or failed write-back is logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Unreadable`] if the row exists but cannot be
    /// decrypted, or [`CredentialError::Repository`] if the lookup fails.
    pub fn get(&self, user_id: &str) -> Result<Option<PortalCredentials>, CredentialError> {
        let Some(row) = self.repo.get(user_id)? else {
            return Ok(None);
        };

        let password = self
            .cipher
            .decrypt(&row.encrypted_password)
            .map_err(|e| {
                warn!(user_id, error = %e, "stored portal password failed to decrypt");
                CredentialError::Unreadable(e)
            })?;

        if !self.cipher.is_current_format(&row.encrypted_password) {
            self.migrate(user_id, &row, &password);
        }

        Ok(Some(PortalCredentials {
            username: row.username,
            password,
            updated_at: row.updated_at,
        }))
    }

    /// Delete the credentials for `user_id`. Returns `true` if any existed.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Repository`] if the delete fails.
    pub fn delete(&self, user_id: &str) -> Result<bool, CredentialError> {
        Ok(self.repo.remove(user_id)?)
    }

    /// Number of users with stored credentials.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Repository`] if the count fails.
    pub fn count(&self) -> Result<usize, CredentialError> {
        Ok(self.repo.len()?)
    }

    fn migrate(&self, user_id: &str, row: &StoredCredential, password: &str) {
        let encrypted_password = match self.cipher.encrypt(password) {
            Ok(s) => s,
            Err(e) => {
                warn!(user_id, error = %e, "re-encryption failed; keeping stored format");
                return;
            }
        };
        let updated = StoredCredential {
            encrypted_password,
            ..row.clone()
        };
        match self
            .repo
            .put_if_current(user_id, &row.encrypted_password, updated)
        {
            Ok(true) => debug!(user_id, mode = self.cipher.mode().as_str(), "credentials re-encrypted"),
            Ok(false) => debug!(user_id, "row changed since read; re-encryption skipped"),
            Err(e) => warn!(user_id, error = %e, "re-encrypted credentials not written back"),
        }
    }
}
