//! The key/value store the cache persists entries in.
//!
//! The plugin only needs `get` and `set`; eviction, replication and on-disk
//! formats belong to the implementation. [`MemoryStore`] is an in-process
//! implementation suitable for tests and single-process clients.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::trace;

use super::clock::{Clock, SystemClock};
use super::entry::CacheEntry;

/// Failures reported by a [`CacheStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode or decode cache entry: {0}")]
    Codec(#[from] serde_json::Error),
}

/// A key/value store with per-item expiry.
///
/// Keys are opaque digests produced by the plugin. Implementations must be
/// usable from any task; the plugin calls them inline, without locking around
/// the read-then-write sequence of a request.
pub trait CacheStore: Send + Sync {
    /// Returns the live entry for `key`, or `None` on a miss.
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Stores `entry` under `key`. `ttl` is in seconds; `None` keeps the entry
    /// until evicted.
    fn set(&self, key: &str, entry: CacheEntry, ttl: Option<i64>) -> Result<(), StoreError>;
}

impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, entry: CacheEntry, ttl: Option<i64>) -> Result<(), StoreError> {
        (**self).set(key, entry, ttl)
    }
}

struct Slot {
    payload: Vec<u8>,
    expires_at: Option<i64>,
}

/// In-process store keeping serialized entries in a map.
///
/// Entries are stored as JSON, the same shape an external store would hold,
/// so every `get` returns an independent value.
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Slot>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored (possibly expired) entries.
    pub fn len(&self) -> usize {
        self.lock().map(|slots| slots.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Slot>>, StoreError> {
        self.slots
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, StoreError> {
        let now = self.clock.now();
        let mut slots = self.lock()?;

        let expired = match slots.get(key) {
            None => return Ok(None),
            Some(slot) => slot.expires_at.is_some_and(|expires_at| now >= expires_at),
        };
        if expired {
            trace!(key, "dropping expired store item");
            slots.remove(key);
            return Ok(None);
        }

        match slots.get(key) {
            Some(slot) => Ok(Some(serde_json::from_slice(&slot.payload)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, entry: CacheEntry, ttl: Option<i64>) -> Result<(), StoreError> {
        let payload = serde_json::to_vec(&entry)?;
        let expires_at = ttl.map(|ttl| self.clock.now().saturating_add(ttl));
        self.lock()?
            .insert(key.to_owned(), Slot { payload, expires_at });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use bytes::Bytes;

    use super::*;
    use crate::cache::entry::CachedResponse;
    use crate::http::{Headers, StatusCode};

    struct ManualClock(AtomicI64);

    impl Clock for ManualClock {
        fn now(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn entry() -> CacheEntry {
        CacheEntry {
            response: CachedResponse {
                status: StatusCode::Ok,
                headers: Headers::new(),
            },
            body: Bytes::from_static(b"body"),
            created_at: Some(0),
            expires_at: None,
            etag: Vec::new(),
        }
    }

    #[test]
    fn miss_then_hit() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", entry(), None).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(entry()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ttl_expires_items() {
        let clock = Arc::new(ManualClock(AtomicI64::new(1_000)));
        let store = MemoryStore::with_clock(clock.clone());
        store.set("k", entry(), Some(60)).unwrap();

        clock.0.store(1_059, Ordering::SeqCst);
        assert!(store.get("k").unwrap().is_some());

        clock.0.store(1_060, Ordering::SeqCst);
        assert!(store.get("k").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn last_write_wins() {
        let store = MemoryStore::new();
        store.set("k", entry(), None).unwrap();
        let mut newer = entry();
        newer.body = Bytes::from_static(b"newer");
        store.set("k", newer.clone(), None).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(newer));
    }
}
