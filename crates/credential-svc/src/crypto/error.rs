//! Errors produced by the cipher layer.

use thiserror::Error;

/// Why a stored ciphertext string could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// No `:` between the IV and ciphertext halves.
    MissingDelimiter,
    /// The IV half is not lowercase hexadecimal.
    IvNotHex,
    /// The IV half decodes to something other than 16 bytes.
    IvLength(usize),
    /// The ciphertext half is not lowercase hexadecimal.
    CiphertextNotHex,
    /// The ciphertext half is empty.
    EmptyCiphertext,
    /// The ciphertext length is not a multiple of the AES block size.
    CiphertextNotBlockAligned(usize),
    /// A `v1.` sealed value that does not have three well-formed segments.
    SealedEncoding,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDelimiter => f.write_str("missing ':' delimiter"),
            Self::IvNotHex => f.write_str("IV is not lowercase hex"),
            Self::IvLength(n) => write!(f, "IV must be 16 bytes, got {n}"),
            Self::CiphertextNotHex => f.write_str("ciphertext is not lowercase hex"),
            Self::EmptyCiphertext => f.write_str("ciphertext is empty"),
            Self::CiphertextNotBlockAligned(n) => {
                write!(f, "ciphertext length {n} is not a multiple of 16")
            }
            Self::SealedEncoding => f.write_str("invalid sealed value encoding"),
        }
    }
}

/// Errors produced by the cipher layer.
///
/// Every variant is per-call and recoverable; retrying cannot change the outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The stored string does not match any known ciphertext format.
    #[error("malformed ciphertext: {0}")]
    Malformed(MalformedReason),

    /// Decryption ran but the result failed validation: bad padding, failed
    /// authentication, or non-UTF-8 plaintext. Wrong key, corruption, or tampering.
    #[error("ciphertext failed integrity check")]
    Integrity,

    /// The cipher could not be set up or refused to encrypt. Never caused by
    /// stored data.
    #[error("encryption failed")]
    Encryption,
}
