//! `credential-svc` — binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Build the [`EncryptionKey`]; an invalid key aborts startup.
//! 3. Initialise the telemetry pipeline (JSON logs, optional OTLP).
//! 4. Build the credential store and sync status store.
//! 5. Spawn the sync status sweep task.
//! 6. Build the Axum router and start the HTTP server.

mod config;
mod credentials;
mod crypto;
mod server;
mod sync;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::credentials::{CredentialService, InMemoryCredentialRepository};
use crate::crypto::{CredentialCipher, EncryptionKey};
use crate::server::state::AppState;
use crate::sync::SyncStatusStore;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Encryption key
    // -----------------------------------------------------------------------
    let key = EncryptionKey::from_hex(&cfg.encryption_key)
        .context("ENCRYPTION_KEY must be 64 hex characters (32 bytes)")?;
    let key_fingerprint = key.fingerprint();

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otlp_endpoint(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        cipher_mode = cfg.cipher_mode.as_str(),
        key_fingerprint = %key_fingerprint,
        "credential-svc starting"
    );

    // -----------------------------------------------------------------------
    // 4. Stores
    // -----------------------------------------------------------------------
    let cipher = CredentialCipher::new(key, cfg.cipher_mode);
    let credentials =
        CredentialService::new(Arc::new(InMemoryCredentialRepository::new()), cipher);
    let sync_status = SyncStatusStore::new(Duration::from_secs(cfg.sync_status_ttl_secs));

    // -----------------------------------------------------------------------
    // 5. Background tasks
    // -----------------------------------------------------------------------
    let _sync_sweep = sync::sweep_task(
        sync_status.clone(),
        Duration::from_secs(cfg.sync_status_sweep_interval_secs),
    );

    // -----------------------------------------------------------------------
    // 6. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(credentials, sync_status);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
