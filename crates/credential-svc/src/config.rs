//! Configuration loading and validation for the credential service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::CipherMode;

/// Validated service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Hex-encoded 32-byte AES key. **Required.** Never printed.
    pub encryption_key: String,

    /// Format written by new encryptions: `cbc` or `sealed`.
    #[serde(default)]
    pub cipher_mode: CipherMode,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Seconds a sync status stays live after its last update.
    #[serde(default = "default_sync_status_ttl")]
    pub sync_status_ttl_secs: u64,

    /// How often (seconds) expired sync statuses are purged.
    #[serde(default = "default_sync_status_sweep_interval")]
    pub sync_status_sweep_interval_secs: u64,

    /// OTLP/gRPC endpoint for span export. Logs only when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_sync_status_ttl() -> u64 {
    900
}
fn default_sync_status_sweep_interval() -> u64 {
    60
}
fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &"[REDACTED]")
            .field("cipher_mode", &self.cipher_mode)
            .field("listen_port", &self.listen_port)
            .field("sync_status_ttl_secs", &self.sync_status_ttl_secs)
            .field(
                "sync_status_sweep_interval_secs",
                &self.sync_status_sweep_interval_secs,
            )
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    fn load(source: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(source)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// OTLP endpoint, treating an empty value as unset.
    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otel_exporter_otlp_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    ///
    /// The key's hex content and length are checked when the key is built.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.encryption_key, "ENCRYPTION_KEY")?;

        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if self.sync_status_ttl_secs == 0 {
            anyhow::bail!("SYNC_STATUS_TTL_SECS must be > 0");
        }
        if self.sync_status_sweep_interval_secs == 0 {
            anyhow::bail!("SYNC_STATUS_SWEEP_INTERVAL_SECS must be > 0");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        config::Environment::default().source(Some(map))
    }

    fn valid() -> Config {
        Config {
            encryption_key: "00".repeat(32),
            cipher_mode: CipherMode::Cbc,
            listen_port: default_listen_port(),
            sync_status_ttl_secs: default_sync_status_ttl(),
            sync_status_sweep_interval_secs: default_sync_status_sweep_interval(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_listen_port(), 8080);
        assert_eq!(default_sync_status_ttl(), 900);
        assert_eq!(default_sync_status_sweep_interval(), 60);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn loads_from_environment_with_defaults() {
        let key = "ab".repeat(32);
        let cfg = Config::load(env(&[("ENCRYPTION_KEY", key.as_str())])).unwrap();
        assert_eq!(cfg.encryption_key, key);
        assert_eq!(cfg.cipher_mode, CipherMode::Cbc);
        assert_eq!(cfg.listen_port, 8080);
        assert!(cfg.otlp_endpoint().is_none());
    }

    #[test]
    fn loads_overrides() {
        let key = "ab".repeat(32);
        let cfg = Config::load(env(&[
            ("ENCRYPTION_KEY", key.as_str()),
            ("CIPHER_MODE", "sealed"),
            ("LISTEN_PORT", "9090"),
            ("SYNC_STATUS_TTL_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(cfg.cipher_mode, CipherMode::Sealed);
        assert_eq!(cfg.listen_port, 9090);
        assert_eq!(cfg.sync_status_ttl_secs, 30);
    }

    #[test]
    fn missing_key_is_an_error() {
        assert!(Config::load(env(&[("LISTEN_PORT", "9090")])).is_err());
    }

    #[test]
    fn validate_rejects_empty_key() {
        let cfg = Config {
            encryption_key: "  ".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_intervals() {
        let cfg = Config {
            sync_status_ttl_secs: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
        let cfg = Config {
            sync_status_sweep_interval_secs: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_otlp_endpoint_is_unset() {
        let cfg = Config {
            otel_exporter_otlp_endpoint: Some(" ".into()),
            ..valid()
        };
        assert!(cfg.otlp_endpoint().is_none());
    }

    #[test]
    fn debug_hides_key() {
        let cfg = Config {
            encryption_key: "ab".repeat(32),
            ..valid()
        };
        assert!(!format!("{cfg:?}").contains("abab"));
    }
}
