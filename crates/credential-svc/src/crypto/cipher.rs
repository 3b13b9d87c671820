//! [`CredentialCipher`]: string-in, string-out encryption of portal passwords.

use std::sync::Arc;

use serde::Deserialize;

use super::cbc::{self, CbcEnvelope};
use super::error::CipherError;
use super::key::EncryptionKey;
use super::sealed::{self, SealedValue};

/// Which format [`CredentialCipher::encrypt`] writes.
///
/// Decryption always accepts both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherMode {
    /// AES-256-CBC, `hex(iv):hex(ciphertext)`.
    #[default]
    Cbc,
    /// AES-256-GCM-SIV, `v1.<nonce>.<ciphertext>`.
    Sealed,
}

impl CipherMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherMode::Cbc => "cbc",
            CipherMode::Sealed => "sealed",
        }
    }
}

/// Encrypts and decrypts secrets under the process-wide [`EncryptionKey`].
///
/// Stateless apart from the immutable key: clones share it, and calls from any
/// number of tasks need no coordination.
#[derive(Clone, Debug)]
pub struct CredentialCipher {
    key: Arc<EncryptionKey>,
    mode: CipherMode,
}

impl CredentialCipher {
    pub fn new(key: EncryptionKey, mode: CipherMode) -> Self {
        Self {
            key: Arc::new(key),
            mode,
        }
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Encrypt `plaintext` into its persisted string form.
    ///
    /// Every call draws a fresh IV/nonce, so equal inputs give different outputs.
    ///
    /// # Errors
    ///
    /// Only [`CipherMode::Sealed`] can fail, with [`CipherError::Encryption`]
    /// on an internal AEAD error.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        match self.mode {
            CipherMode::Cbc => Ok(cbc::encrypt(plaintext.as_bytes(), &self.key).encode()),
            CipherMode::Sealed => Ok(sealed::seal(plaintext.as_bytes(), &self.key)?.encode()),
        }
    }

    /// Recover the plaintext from a persisted string in either format.
    ///
    /// # Errors
    ///
    /// - [`CipherError::Malformed`] if `stored` cannot be parsed.
    /// - [`CipherError::Integrity`] if decryption fails validation or the
    ///   result is not UTF-8.
    pub fn decrypt(&self, stored: &str) -> Result<String, CipherError> {
        let bytes = if SealedValue::is_sealed(stored) {
            sealed::open(&SealedValue::parse(stored)?, &self.key)?
        } else {
            cbc::decrypt(&CbcEnvelope::parse(stored)?, &self.key)?
        };
        String::from_utf8(bytes).map_err(|_| CipherError::Integrity)
    }

    /// Returns `true` if `stored` is in the format the current mode writes.
    pub fn is_current_format(&self, stored: &str) -> bool {
        SealedValue::is_sealed(stored) == (self.mode == CipherMode::Sealed)
    }
}
