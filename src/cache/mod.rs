//! # Cache Module
//!
//! TTL-stamped response entries kept in a [`Storage`](crate::storage::Storage)
//! backend, plus the key derivation that decides which requests share a slot.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheStore`] | Reads, writes and removes entries; evicts expired or malformed ones on read |
//! | [`CacheEntry`] | On-storage entry format `{data, timestamp, ttl}` |
//! | [`CacheKeyGenerator`] | Default `method-url-query-body` key derivation |
//! | [`Clock`] | Time source; [`ManualClock`] makes expiry deterministic in tests |
//! | [`CacheStats`] | Hit/miss/write/eviction counters |
//!
//! Per key an entry moves `absent -> fresh -> stale -> absent`: it is fresh
//! after a write, becomes stale once its ttl has elapsed, and is removed by
//! the next read that finds it stale.
//!
//! ```rust
//! use request_cache::cache::{CacheKey, CacheStore};
//! use request_cache::storage::MemoryStorage;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = CacheStore::new(Arc::new(MemoryStorage::new()));
//! let key = CacheKey::from("get-/users-null-null");
//! store.write(&key, &vec!["ada", "grace"], Duration::from_secs(60)).unwrap();
//! let users: Option<Vec<String>> = store.read(&key).unwrap();
//! assert_eq!(users.unwrap().len(), 2);
//! ```

mod clock;
mod key;
mod stats;
mod store;

pub use clock::{duration_millis, Clock, ManualClock, SystemClock};
pub use key::{CacheKey, CacheKeyGenerator, KeyFn};
pub use stats::CacheStats;
pub(crate) use stats::AtomicStats;
pub use store::{CacheEntry, CacheStore, Lookup};
