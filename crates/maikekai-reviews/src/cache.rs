//! Keyed in-memory cache with per-entry expiry.
//!
//! Entries are stamped with [`tokio::time::Instant`] so expiry follows the
//! tokio clock and can be driven by a paused runtime in tests. Expired
//! entries are evicted lazily on `get` and in bulk by [`ReviewCache::purge_expired`],
//! which the server runs on a schedule.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct ReviewCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    default_ttl: Duration,
}

impl<T: Clone> ReviewCache<T> {
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return a clone of the live value under `key`, evicting it if expired.
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().await;
        let live = entries
            .get(key)
            .is_some_and(|entry| entry.expires_at > Instant::now());
        if live {
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: T) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_with_ttl(&self, key: impl Into<String>, value: T, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .await
            .insert(key.into(), Entry { value, expires_at });
    }

    /// Remove `key`. Returns `true` when an entry (live or expired) was present.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Drop every expired entry and return how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl<T: Clone> Default for ReviewCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
