//! Shared application state injected into every Axum handler.

use std::sync::Arc;
use std::time::Duration;

use crate::credentials::{CredentialService, InMemoryCredentialRepository};
use crate::crypto::{CipherMode, CredentialCipher, EncryptionKey, KEY_LEN};
use crate::sync::SyncStatusStore;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-backed) so that Axum can clone the
/// state for each request without copying data.
#[derive(Clone)]
pub struct AppState {
    /// Encrypting credential store.
    pub credentials: CredentialService,
    /// Per-user portal sync flags.
    pub sync_status: SyncStatusStore,
}

impl AppState {
    /// Create a new [`AppState`] from its parts.
    pub fn new(credentials: CredentialService, sync_status: SyncStatusStore) -> Self {
        Self {
            credentials,
            sync_status,
        }
    }
}

impl Default for AppState {
    /// In-memory store under an all-zero key, suitable for tests.
    fn default() -> Self {
        let cipher = CredentialCipher::new(EncryptionKey::from_bytes([0u8; KEY_LEN]), CipherMode::Cbc);
        Self::new(
            CredentialService::new(Arc::new(InMemoryCredentialRepository::new()), cipher),
            SyncStatusStore::new(Duration::from_secs(900)),
        )
    }
}
