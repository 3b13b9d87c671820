//! AES-256-GCM-SIV authenticated encryption, persisted as
//! `v1.<base64url(nonce)>.<base64url(ciphertext+tag)>`.
//!
//! Any modification of the stored value fails authentication, unlike CBC.

use aes_gcm_siv::{
    aead::{Aead, KeyInit},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use super::error::{CipherError, MalformedReason};
use super::key::EncryptionKey;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Prefix that appears at the start of every sealed value.
pub const VERSION_PREFIX: &str = "v1";

/// A parsed sealed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedValue {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

impl SealedValue {
    /// Encode this value to its canonical string representation.
    pub fn encode(&self) -> String {
        format!(
            "{}.{}.{}",
            VERSION_PREFIX,
            URL_SAFE_NO_PAD.encode(self.nonce),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
        )
    }

    /// Returns `true` if `s` carries the sealed-format prefix.
    pub fn is_sealed(s: &str) -> bool {
        s.strip_prefix(VERSION_PREFIX)
            .is_some_and(|rest| rest.starts_with('.'))
    }

    /// Parse a sealed string back into a [`SealedValue`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Malformed`] if the string does not match the
    /// expected `v1.<nonce>.<ciphertext>` structure.
    pub fn parse(s: &str) -> Result<Self, CipherError> {
        let malformed = CipherError::Malformed(MalformedReason::SealedEncoding);
        let parts: Vec<&str> = s.splitn(3, '.').collect();
        if parts.len() != 3 || parts[0] != VERSION_PREFIX {
            return Err(malformed);
        }
        let nonce: [u8; NONCE_LEN] = URL_SAFE_NO_PAD
            .decode(parts[1])
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| malformed.clone())?;
        let ciphertext = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| malformed.clone())?;

        Ok(Self { nonce, ciphertext })
    }
}

/// Seal `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
///
/// Returns [`CipherError::Encryption`] on an internal AEAD error (unreachable
/// with a valid key and nonce).
pub fn seal(plaintext: &[u8], key: &EncryptionKey) -> Result<SealedValue, CipherError> {
    let cipher =
        Aes256GcmSiv::new_from_slice(key.as_bytes()).map_err(|_| CipherError::Encryption)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| CipherError::Encryption)?;

    Ok(SealedValue {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Open a [`SealedValue`] back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CipherError::Integrity`] if authentication fails (wrong key or tampered data).
pub fn open(value: &SealedValue, key: &EncryptionKey) -> Result<Vec<u8>, CipherError> {
    let cipher = Aes256GcmSiv::new_from_slice(key.as_bytes()).map_err(|_| CipherError::Integrity)?;
    cipher
        .decrypt(Nonce::from_slice(&value.nonce), value.ciphertext.as_ref())
        .map_err(|_| CipherError::Integrity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;

    fn key() -> EncryptionKey {
        EncryptionKey::from_bytes([0x42; KEY_LEN])
    }

    #[test]
    fn seal_open_round_trip() {
        let sealed = seal(b"123-45-6789", &key()).unwrap();
        assert_eq!(open(&sealed, &key()).unwrap(), b"123-45-6789");
    }

    #[test]
    fn encryption_failure_is_not_an_integrity_error() {
        assert_ne!(CipherError::Encryption, CipherError::Integrity);
        assert_eq!(CipherError::Encryption.to_string(), "encryption failed");
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(b"secret", &key()).unwrap();
        let other = EncryptionKey::from_bytes([0x43; KEY_LEN]);
        assert_eq!(open(&sealed, &other), Err(CipherError::Integrity));
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let mut sealed = seal(b"tamper me", &key()).unwrap();
        sealed.ciphertext[0] ^= 0xFF;
        assert_eq!(open(&sealed, &key()), Err(CipherError::Integrity));
    }

    #[test]
    fn encoding_round_trip() {
        let sealed = seal(b"hello", &key()).unwrap();
        let s = sealed.encode();
        assert!(s.starts_with("v1."));
        assert!(SealedValue::is_sealed(&s));
        assert_eq!(SealedValue::parse(&s).unwrap(), sealed);
    }

    #[test]
    fn is_sealed_ignores_hex_values() {
        assert!(!SealedValue::is_sealed("00112233:aabb"));
        assert!(!SealedValue::is_sealed("v1"));
        assert!(!SealedValue::is_sealed("v10.abc"));
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(SealedValue::parse("v2.abc.def").is_err());
        assert!(SealedValue::parse("v1.abc").is_err());
        assert!(SealedValue::parse("v1.!!!.abc").is_err());
        // Valid base64 but the nonce is too short.
        assert!(SealedValue::parse("v1.AAAA.AAAA").is_err());
    }
}
