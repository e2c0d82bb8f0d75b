use crate::cache::{AtomicStats, CacheKeyGenerator, CacheStore, Clock, SystemClock};
use crate::config::CacheConfig;
use crate::storage::{FileStorage, MemoryStorage, Storage};
use crate::transport::HttpClient;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;

use super::core::CachedClient;

/// Builder for [`CachedClient`].
///
/// Storage not set explicitly is derived from the config: the persistent
/// backend is a [`FileStorage`] in `storage_dir` when one is configured, and
/// in-memory otherwise; the session backend is always in-memory.
pub struct CachedClientBuilder {
    config: CacheConfig,
    http: Option<Arc<dyn HttpClient>>,
    persistent: Option<Arc<dyn Storage>>,
    session: Option<Arc<dyn Storage>>,
    clock: Arc<dyn Clock>,
}

impl CachedClientBuilder {
    pub fn new() -> Self {
        Self {
            config: CacheConfig::default(),
            http: None,
            persistent: None,
            session: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    pub fn http_client<C: HttpClient + 'static>(mut self, http: C) -> Self {
        self.http = Some(Arc::new(http));
        self
    }

    pub fn persistent_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.persistent = Some(storage);
        self
    }

    pub fn session_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.session = Some(storage);
        self
    }

    /// Time source for entry timestamps (tests use a manual clock).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(mut self) -> Result<CachedClient> {
        let http = self.http.take().ok_or_else(|| {
            Error::configuration_with_context(
                "an HTTP client is required",
                ErrorContext::new()
                    .with_field_path("http_client")
                    .with_source("cached_client_builder"),
            )
        })?;
        Ok(self.build_with(http))
    }

    pub(crate) fn build_with(self, http: Arc<dyn HttpClient>) -> CachedClient {
        let persistent: Arc<dyn Storage> = match self.persistent {
            Some(storage) => storage,
            None => match &self.config.storage_dir {
                Some(dir) => Arc::new(FileStorage::in_dir(dir)),
                None => Arc::new(MemoryStorage::new()),
            },
        };
        let session: Arc<dyn Storage> = match self.session {
            Some(storage) => storage,
            None => Arc::new(MemoryStorage::new()),
        };

        CachedClient {
            http,
            persistent: CacheStore::with_clock(persistent, self.clock.clone()),
            session: CacheStore::with_clock(session, self.clock),
            keys: CacheKeyGenerator::new().hashed(self.config.hash_keys),
            config: self.config,
            stats: Arc::new(AtomicStats::default()),
        }
    }
}

impl Default for CachedClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_http_client() {
        let err = CachedClientBuilder::new().build().err().unwrap();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_storage_dir_selects_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let http = crate::transport::ReqwestClient::from_client(reqwest::Client::new());
        let client = CachedClientBuilder::new()
            .config(CacheConfig::default().with_storage_dir(dir.path()))
            .http_client(http)
            .build()
            .unwrap();
        assert_eq!(client.store(crate::storage::Backend::Persistent).storage().name(), "file");
        assert_eq!(client.store(crate::storage::Backend::Session).storage().name(), "memory");
    }
}
