//! Persistence seam for encrypted credentials, plus the in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced by a [`CredentialRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached or is in a broken state.
    #[error("credential repository unavailable: {0}")]
    Unavailable(String),
}

/// One persisted row: the password only ever appears here in encrypted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub username: String,
    /// Output of [`CredentialCipher::encrypt`](crate::crypto::CredentialCipher::encrypt).
    pub encrypted_password: String,
    pub updated_at: DateTime<Utc>,
}

/// Storage for encrypted credentials keyed by user id.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialRepository: Send + Sync {
    /// Fetch the row for `user_id`, if any.
    fn get(&self, user_id: &str) -> Result<Option<StoredCredential>, RepositoryError>;

    /// Insert or replace the row for `user_id`.
    fn put(&self, user_id: &str, credential: StoredCredential) -> Result<(), RepositoryError>;

    /// Replace the row for `user_id` only if its stored ciphertext still equals
    /// `expected_encrypted_password`. Returns `false`, writing nothing, if the
    /// row was deleted or changed since it was read.
    fn put_if_current(
        &self,
        user_id: &str,
        expected_encrypted_password: &str,
        credential: StoredCredential,
    ) -> Result<bool, RepositoryError>;

    /// Delete the row for `user_id`. Returns `true` if one existed.
    fn remove(&self, user_id: &str) -> Result<bool, RepositoryError>;

    /// Number of stored rows.
    fn len(&self) -> Result<usize, RepositoryError>;
}

/// Process-local [`CredentialRepository`] backed by a `RwLock<HashMap>`.
///
/// Contents are lost on restart.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCredentialRepository {
    inner: Arc<RwLock<HashMap<String, StoredCredential>>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Unavailable("lock poisoned".into())
}

impl CredentialRepository for InMemoryCredentialRepository {
    fn get(&self, user_id: &str) -> Result<Option<StoredCredential>, RepositoryError> {
        Ok(self.inner.read().map_err(poisoned)?.get(user_id).cloned())
    }

    fn put(&self, user_id: &str, credential: StoredCredential) -> Result<(), RepositoryError> {
        self.inner
            .write()
            .map_err(poisoned)?
            .insert(user_id.to_owned(), credential);
        Ok(())
    }

    fn put_if_current(
        &self,
        user_id: &str,
        expected_encrypted_password: &str,
        credential: StoredCredential,
    ) -> Result<bool, RepositoryError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        match map.get_mut(user_id) {
            Some(row) if row.encrypted_password == expected_encrypted_password => {
                *row = credential;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn remove(&self, user_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.inner.write().map_err(poisoned)?.remove(user_id).is_some())
    }

    fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.inner.read().map_err(poisoned)?.len())
    }
}
