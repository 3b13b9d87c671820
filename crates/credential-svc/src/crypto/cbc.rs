//! AES-256-CBC with PKCS#7 padding, persisted as `hex(iv):hex(ciphertext)`.
//!
//! CBC carries no authentication tag. Padding validation catches most
//! accidental corruption but a deliberate bit-flip can go unnoticed; see the
//! `sealed` module for the authenticated alternative.

use aes::cipher::{
    block_padding::Pkcs7, generic_array::GenericArray, BlockDecryptMut, BlockEncryptMut,
    KeyIvInit,
};
use rand::{rngs::OsRng, RngCore};

use super::error::{CipherError, MalformedReason};
use super::key::EncryptionKey;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Byte length of a CBC initialisation vector (one AES block).
pub const IV_LEN: usize = 16;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Separator between the IV and ciphertext halves of the persisted string.
pub const DELIMITER: char = ':';

/// A parsed CBC ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbcEnvelope {
    /// Random per-encryption IV.
    pub iv: [u8; IV_LEN],
    /// Padded ciphertext; always a positive multiple of [`BLOCK_LEN`].
    pub ciphertext: Vec<u8>,
}

impl CbcEnvelope {
    /// Encode as `hex(iv):hex(ciphertext)` using lowercase digits.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            hex::encode(self.iv),
            DELIMITER,
            hex::encode(&self.ciphertext)
        )
    }

    /// Parse a persisted `hex(iv):hex(ciphertext)` string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Malformed`] naming the first violated rule.
    pub fn parse(s: &str) -> Result<Self, CipherError> {
        let (iv_hex, ct_hex) = s
            .split_once(DELIMITER)
            .ok_or(CipherError::Malformed(MalformedReason::MissingDelimiter))?;

        let iv_bytes = decode_lower_hex(iv_hex)
            .ok_or(CipherError::Malformed(MalformedReason::IvNotHex))?;
        let iv: [u8; IV_LEN] = iv_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CipherError::Malformed(MalformedReason::IvLength(iv_bytes.len())))?;

        let ciphertext = decode_lower_hex(ct_hex)
            .ok_or(CipherError::Malformed(MalformedReason::CiphertextNotHex))?;
        if ciphertext.is_empty() {
            return Err(CipherError::Malformed(MalformedReason::EmptyCiphertext));
        }
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CipherError::Malformed(
                MalformedReason::CiphertextNotBlockAligned(ciphertext.len()),
            ));
        }

        Ok(Self { iv, ciphertext })
    }
}

fn decode_lower_hex(s: &str) -> Option<Vec<u8>> {
    if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    hex::decode(s).ok()
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> CbcEnvelope {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(GenericArray::from_slice(key.as_bytes()), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    CbcEnvelope { iv, ciphertext }
}

/// Decrypt a [`CbcEnvelope`] back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CipherError::Integrity`] if the padding is invalid after decryption.
pub fn decrypt(envelope: &CbcEnvelope, key: &EncryptionKey) -> Result<Vec<u8>, CipherError> {
    Aes256CbcDec::new(GenericArray::from_slice(key.as_bytes()), &envelope.iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|_| CipherError::Integrity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;

    fn zero_key() -> EncryptionKey {
        EncryptionKey::from_bytes([0u8; KEY_LEN])
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = zero_key();
        let env = encrypt(b"sB9/pass!", &key);
        assert_eq!(decrypt(&env, &key).unwrap(), b"sB9/pass!");
    }

    #[test]
    fn padding_always_adds_a_block() {
        let key = zero_key();
        assert_eq!(encrypt(b"", &key).ciphertext.len(), BLOCK_LEN);
        assert_eq!(encrypt(&[7u8; BLOCK_LEN], &key).ciphertext.len(), 2 * BLOCK_LEN);
    }

    #[test]
    fn fresh_iv_per_call() {
        let key = zero_key();
        let a = encrypt(b"same", &key);
        let b = encrypt(b"same", &key);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_does_not_recover_plaintext() {
        let env = encrypt(b"secret", &zero_key());
        let other = EncryptionKey::from_bytes([0x11; KEY_LEN]);
        match decrypt(&env, &other) {
            Ok(p) => assert_ne!(p, b"secret"),
            Err(e) => assert_eq!(e, CipherError::Integrity),
        }
    }

    #[test]
    fn encode_parse_preserves_fields() {
        let env = encrypt(b"hello", &zero_key());
        let s = env.encode();
        assert_eq!(s.len(), 2 * IV_LEN + 1 + 2 * BLOCK_LEN);
        assert_eq!(CbcEnvelope::parse(&s).unwrap(), env);
    }

    #[test]
    fn parse_rejects_missing_delimiter() {
        assert_eq!(
            CbcEnvelope::parse("not-a-valid-string"),
            Err(CipherError::Malformed(MalformedReason::MissingDelimiter))
        );
    }

    #[test]
    fn parse_rejects_short_iv() {
        assert_eq!(
            CbcEnvelope::parse("00112233:zz"),
            Err(CipherError::Malformed(MalformedReason::IvLength(4)))
        );
    }

    #[test]
    fn parse_rejects_non_hex_ciphertext() {
        let s = format!("{}:zz", "00".repeat(IV_LEN));
        assert_eq!(
            CbcEnvelope::parse(&s),
            Err(CipherError::Malformed(MalformedReason::CiphertextNotHex))
        );
    }

    #[test]
    fn parse_rejects_uppercase_hex() {
        let s = format!("{}:{}", "AB".repeat(IV_LEN), "00".repeat(BLOCK_LEN));
        assert_eq!(
            CbcEnvelope::parse(&s),
            Err(CipherError::Malformed(MalformedReason::IvNotHex))
        );
    }

    #[test]
    fn parse_rejects_extra_delimiter() {
        let s = format!("{}:{}:00", "00".repeat(IV_LEN), "00".repeat(BLOCK_LEN));
        assert_eq!(
            CbcEnvelope::parse(&s),
            Err(CipherError::Malformed(MalformedReason::CiphertextNotHex))
        );
    }

    #[test]
    fn parse_rejects_empty_and_unaligned_ciphertext() {
        let iv = "00".repeat(IV_LEN);
        assert_eq!(
            CbcEnvelope::parse(&format!("{iv}:")),
            Err(CipherError::Malformed(MalformedReason::EmptyCiphertext))
        );
        assert_eq!(
            CbcEnvelope::parse(&format!("{iv}:{}", "00".repeat(15))),
            Err(CipherError::Malformed(
                MalformedReason::CiphertextNotBlockAligned(15)
            ))
        );
    }
}
