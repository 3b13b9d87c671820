//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No key material, plaintext passwords, or ciphertext** may appear in any
//!   span attribute or log field. The key fingerprint is the only key-derived
//!   value ever logged.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden by `RUST_LOG`.

pub mod init;

pub use init::init_telemetry;
