//! Encryption of portal passwords at rest.
//!
//! This module is free of HTTP and storage dependencies. The key is validated
//! once at startup and shared immutably by every call.
//!
//! # Stored formats
//!
//! ```text
//! <hex(iv, 16 bytes)>:<hex(aes-256-cbc + pkcs7 ciphertext)>      (cbc, default)
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext+tag)> (sealed)
//! ```

pub mod cbc;
pub mod cipher;
pub mod error;
pub mod key;
pub mod sealed;

pub use cipher::{CipherMode, CredentialCipher};
pub use error::CipherError;
pub use key::{EncryptionKey, KEY_LEN};
