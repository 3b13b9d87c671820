//! [`EncryptionKey`]: the process-wide AES-256 key, validated once at startup.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Errors produced while building an [`EncryptionKey`] from configuration.
///
/// Every variant is fatal: the service refuses to start without a valid key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The configured value is not hexadecimal.
    #[error("encryption key is not valid hex")]
    InvalidHex,

    /// The configured value decodes to the wrong number of bytes.
    #[error("encryption key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

/// Fixed-size AES-256 key.
///
/// The bytes are overwritten with zeroes on drop and never printed.
#[derive(Clone)]
pub struct EncryptionKey(Box<[u8; KEY_LEN]>);

impl EncryptionKey {
    /// Decode a key from its hexadecimal configuration form.
    ///
    /// Surrounding whitespace is ignored. Upper- and lower-case digits are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidHex`] if `value` is not hex, or
    /// [`KeyError::InvalidLength`] if it does not decode to exactly [`KEY_LEN`] bytes.
    pub fn from_hex(value: &str) -> Result<Self, KeyError> {
        let value = value.trim();
        if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(KeyError::InvalidHex);
        }
        let mut decoded =
            hex::decode(value).map_err(|_| KeyError::InvalidLength(value.len() / 2))?;
        if decoded.len() != KEY_LEN {
            let len = decoded.len();
            decoded.iter_mut().for_each(|b| *b = 0);
            return Err(KeyError::InvalidLength(len));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(&decoded);
        decoded.iter_mut().for_each(|b| *b = 0);
        Ok(Self(buf))
    }

    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Raw key bytes, for handing to a block cipher.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Short non-secret identifier: the first 8 hex chars of SHA-256 over the key.
    ///
    /// Lets operators tell which key a process loaded without exposing it.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_slice());
        hex::encode(&digest[..4])
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_64_hex_chars() {
        let key = EncryptionKey::from_hex(&"00".repeat(KEY_LEN)).unwrap();
        assert_eq!(key.as_bytes(), &[0u8; KEY_LEN]);
    }

    #[test]
    fn accepts_uppercase_and_surrounding_whitespace() {
        let key = EncryptionKey::from_hex(&format!("  {}\n", "AB".repeat(KEY_LEN))).unwrap();
        assert_eq!(key.as_bytes(), &[0xABu8; KEY_LEN]);
    }

    #[test]
    fn rejects_short_key() {
        assert_eq!(
            EncryptionKey::from_hex(&"00".repeat(16)).unwrap_err(),
            KeyError::InvalidLength(16)
        );
    }

    #[test]
    fn rejects_long_key() {
        assert_eq!(
            EncryptionKey::from_hex(&"00".repeat(33)).unwrap_err(),
            KeyError::InvalidLength(33)
        );
    }

    #[test]
    fn rejects_empty_key() {
        assert_eq!(
            EncryptionKey::from_hex("").unwrap_err(),
            KeyError::InvalidLength(0)
        );
    }

    #[test]
    fn rejects_odd_length() {
        assert!(matches!(
            EncryptionKey::from_hex(&"0".repeat(63)),
            Err(KeyError::InvalidLength(_))
        ));
    }

    #[test]
    fn rejects_non_hex() {
        assert_eq!(
            EncryptionKey::from_hex(&"zz".repeat(KEY_LEN)).unwrap_err(),
            KeyError::InvalidHex
        );
    }

    #[test]
    fn odd_length_non_hex_is_reported_as_non_hex() {
        assert_eq!(EncryptionKey::from_hex("zzz").unwrap_err(), KeyError::InvalidHex);
        assert_eq!(
            EncryptionKey::from_hex(&format!("{}g", "0".repeat(62))).unwrap_err(),
            KeyError::InvalidHex
        );
    }

    #[test]
    fn debug_is_redacted() {
        let key = EncryptionKey::from_bytes([0x42; KEY_LEN]);
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("42"));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = EncryptionKey::from_bytes([1; KEY_LEN]);
        let b = EncryptionKey::from_bytes([1; KEY_LEN]);
        let c = EncryptionKey::from_bytes([2; KEY_LEN]);
        assert_eq!(a.fingerprint().len(), 8);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
