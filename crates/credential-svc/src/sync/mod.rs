//! Per-user "portal sync in progress" flags with a bounded lifetime.
//!
//! # Lifecycle
//!
//! 1. The portal-sync workflow calls [`SyncStatusStore::set`] when a sync
//!    starts and again when it ends (or [`SyncStatusStore::clear`]s the entry).
//! 2. An entry not updated within the configured TTL reads as absent, so a
//!    crashed sync never leaves a user stuck as "syncing".
//! 3. [`sweep_task`] purges expired entries on an interval, keeping the map
//!    bounded by the number of users active within one TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time;
use tracing::debug;

/// A live status entry as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub syncing: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    status: SyncStatus,
    touched: Instant,
}

/// Thread-safe keyed store of [`SyncStatus`] entries with a fixed time-to-live.
#[derive(Clone, Debug)]
pub struct SyncStatusStore {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl SyncStatusStore {
    /// Create an empty store whose entries expire `ttl` after their last update.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Record the sync flag for `user_id`, resetting its TTL.
    pub async fn set(&self, user_id: &str, syncing: bool) -> SyncStatus {
        self.set_at(user_id, syncing, Instant::now()).await
    }

    /// Current status for `user_id`, or `None` if absent or expired.
    pub async fn get(&self, user_id: &str) -> Option<SyncStatus> {
        self.get_at(user_id, Instant::now()).await
    }

    /// Remove the entry for `user_id`. Returns `true` if a live entry was removed.
    pub async fn clear(&self, user_id: &str) -> bool {
        let now = Instant::now();
        self.inner
            .write()
            .await
            .remove(user_id)
            .is_some_and(|e| !self.is_expired(&e, now))
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now()).await
    }

    /// Number of entries held, expired or not.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    async fn set_at(&self, user_id: &str, syncing: bool, now: Instant) -> SyncStatus {
        let status = SyncStatus {
            syncing,
            updated_at: Utc::now(),
        };
        self.inner.write().await.insert(
            user_id.to_owned(),
            Entry {
                status,
                touched: now,
            },
        );
        status
    }

    async fn get_at(&self, user_id: &str, now: Instant) -> Option<SyncStatus> {
        self.inner
            .read()
            .await
            .get(user_id)
            .filter(|e| !self.is_expired(e, now))
            .map(|e| e.status)
    }

    async fn purge_expired_at(&self, now: Instant) -> usize {
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, e| !self.is_expired(e, now));
        before - map.len()
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.touched) >= self.ttl
    }
}

/// Spawn a background task that purges expired entries every `interval`.
pub fn sweep_task(store: SyncStatusStore, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        // First tick fires immediately; nothing can have expired yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = store.purge_expired().await;
            if purged > 0 {
                let remaining = store.len().await;
                debug!(purged, remaining, "expired sync statuses purged");
            }
        }
    })
}
