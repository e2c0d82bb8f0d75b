//! Cache store adapter: TTL-stamped entries on top of a raw [`Storage`].

use super::clock::{duration_millis, Clock, SystemClock};
use super::key::CacheKey;
use crate::storage::Storage;
use crate::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Serialized entry: `{"data": ..., "timestamp": <epoch ms>, "ttl": <ms>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: u64,
    pub ttl: u64,
}

impl<T> CacheEntry<T> {
    pub fn is_expired(&self, now_millis: u64) -> bool {
        now_millis.saturating_sub(self.timestamp) > self.ttl
    }
}

/// Result of a single lookup, before it is collapsed to hit-or-absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Fresh(T),
    Absent,
    /// Entry was past its ttl and has been removed.
    Expired,
    /// Entry could not be decoded and has been removed.
    Malformed,
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Fresh(data) => Some(data),
            _ => None,
        }
    }
}

/// Reads and writes cache entries in one storage backend.
///
/// Nothing is mirrored in memory: every read goes to the backend and decodes
/// the stored JSON again.
#[derive(Clone)]
pub struct CacheStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Payload stored at `key`, or `None` if absent, expired or malformed.
    pub fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        Ok(self.lookup(key)?.into_option())
    }

    /// Like [`CacheStore::read`] but reports why nothing was returned.
    /// Expired and malformed entries are removed from the backend.
    pub fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Lookup<T>> {
        let raw = match self.storage.get_item(key.as_str())? {
            Some(raw) => raw,
            None => return Ok(Lookup::Absent),
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, backend = self.storage.name(), error = %e, "Malformed cache entry, removing");
                self.storage.remove_item(key.as_str())?;
                return Ok(Lookup::Malformed);
            }
        };

        if entry.is_expired(self.clock.now_millis()) {
            debug!(key = %key, ttl_ms = entry.ttl, "Cache entry expired, removing");
            self.storage.remove_item(key.as_str())?;
            return Ok(Lookup::Expired);
        }

        Ok(Lookup::Fresh(entry.data))
    }

    /// Store `data` under `key`, replacing whatever was there.
    pub fn write<T: Serialize>(&self, key: &CacheKey, data: &T, ttl: Duration) -> Result<()> {
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now_millis(),
            ttl: duration_millis(ttl),
        };
        let json = serde_json::to_string(&entry)?;
        self.storage.set_item(key.as_str(), &json)
    }

    pub fn remove(&self, key: &CacheKey) -> Result<()> {
        self.storage.remove_item(key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn store() -> (CacheStore, Arc<MemoryStorage>, Arc<ManualClock>) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(1_000_000));
        (
            CacheStore::with_clock(storage.clone(), clock.clone()),
            storage,
            clock,
        )
    }

    #[test]
    fn test_write_then_read() {
        let (store, _, clock) = store();
        let key = CacheKey::from("k");
        store
            .write(&key, &json!({"users": [1, 2]}), Duration::from_secs(60))
            .unwrap();
        clock.advance(Duration::from_secs(30));
        assert_eq!(
            store.read::<serde_json::Value>(&key).unwrap(),
            Some(json!({"users": [1, 2]}))
        );
    }

    #[test]
    fn test_entry_format() {
        let (store, storage, _) = store();
        store
            .write(&CacheKey::from("k"), &"payload", Duration::from_millis(300_000))
            .unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&storage.get_item("k").unwrap().unwrap()).unwrap();
        assert_eq!(
            raw,
            json!({"data": "payload", "timestamp": 1_000_000, "ttl": 300_000})
        );
    }

    #[test]
    fn test_unbounded_ttl_saturates() {
        let (store, storage, clock) = store();
        let key = CacheKey::from("k");
        store.write(&key, &"forever", Duration::MAX).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&storage.get_item("k").unwrap().unwrap()).unwrap();
        assert_eq!(raw["ttl"], json!(u64::MAX));

        clock.advance(Duration::from_secs(10 * 365 * 24 * 3600));
        assert_eq!(store.read::<String>(&key).unwrap().as_deref(), Some("forever"));
    }

    #[test]
    fn test_expired_entry_is_removed() {
        let (store, storage, clock) = store();
        let key = CacheKey::from("k");
        store.write(&key, &1u32, Duration::from_millis(100)).unwrap();

        // Exactly at the deadline the entry is still fresh.
        clock.advance(Duration::from_millis(100));
        assert_eq!(store.read::<u32>(&key).unwrap(), Some(1));

        clock.advance(Duration::from_millis(1));
        assert_eq!(store.lookup::<u32>(&key).unwrap(), Lookup::Expired);
        assert_eq!(storage.get_item("k").unwrap(), None);
        assert_eq!(store.lookup::<u32>(&key).unwrap(), Lookup::Absent);
    }

    #[test]
    fn test_malformed_entry_fails_closed() {
        let (store, storage, _) = store();
        storage.set_item("k", "{not json").unwrap();
        assert_eq!(
            store.lookup::<serde_json::Value>(&CacheKey::from("k")).unwrap(),
            Lookup::Malformed
        );
        assert!(storage.is_empty());
    }

    #[test]
    fn test_payload_type_mismatch_is_malformed() {
        let (store, storage, _) = store();
        let key = CacheKey::from("k");
        store.write(&key, &"text", Duration::from_secs(1)).unwrap();
        assert_eq!(store.read::<u64>(&key).unwrap(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_overwrite_and_remove() {
        let (store, _, _) = store();
        let key = CacheKey::from("k");
        store.write(&key, &1, Duration::from_secs(1)).unwrap();
        store.write(&key, &2, Duration::from_secs(1)).unwrap();
        assert_eq!(store.read::<i32>(&key).unwrap(), Some(2));
        store.remove(&key).unwrap();
        store.remove(&key).unwrap();
        assert_eq!(store.read::<i32>(&key).unwrap(), None);
    }
}
