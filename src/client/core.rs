use crate::cache::{
    duration_millis, AtomicStats, CacheKey, CacheKeyGenerator, CacheStats, CacheStore, Lookup,
};
use crate::config::CacheConfig;
use crate::storage::Backend;
use crate::transport::HttpClient;
use crate::types::{HttpResponse, RequestDescriptor};
use crate::Result;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use super::builder::CachedClientBuilder;
use super::options::{CacheOptions, Resolved};
use super::outcome::CacheOutcome;

/// HTTP client decorator that memoizes successful responses.
///
/// Concurrent calls for the same key are not coalesced: both miss, both hit
/// the transport, and the later write wins.
pub struct CachedClient {
    pub(crate) http: Arc<dyn HttpClient>,
    pub(crate) persistent: CacheStore,
    pub(crate) session: CacheStore,
    pub(crate) config: CacheConfig,
    pub(crate) keys: CacheKeyGenerator,
    pub(crate) stats: Arc<AtomicStats>,
}

impl CachedClient {
    pub fn builder() -> CachedClientBuilder {
        CachedClientBuilder::new()
    }

    /// Client with default config and in-memory storage for both backends.
    pub fn new<C: HttpClient + 'static>(http: C) -> Self {
        CachedClientBuilder::new().build_with(Arc::new(http))
    }

    /// Serve `request` from the cache, or fetch and cache it.
    ///
    /// Hits and misses return the same response shape. Transport failures are
    /// returned unchanged; with `clear_on_error` the entry for the request's
    /// key is removed first.
    pub async fn cached_request(
        &self,
        request: &RequestDescriptor,
        options: Option<&CacheOptions>,
    ) -> Result<HttpResponse> {
        let outcome = self.execute(request, options).await?;
        Ok(outcome.into_response(request))
    }

    /// [`CachedClient::cached_request`] with the payload deserialized into `T`.
    pub async fn cached_json<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
        options: Option<&CacheOptions>,
    ) -> Result<HttpResponse<T>> {
        self.cached_request(request, options).await?.json()
    }

    /// Like [`CachedClient::cached_request`] but tells which path served it.
    pub async fn execute(
        &self,
        request: &RequestDescriptor,
        options: Option<&CacheOptions>,
    ) -> Result<CacheOutcome> {
        if !self.config.enabled {
            return Ok(CacheOutcome::Miss(self.http.execute(request).await?));
        }

        let opts = CacheOptions::resolve(options, &self.config);
        let key = self.key_for(request, &opts);
        let store = self.store(opts.backend);

        match store.lookup::<serde_json::Value>(&key) {
            Ok(Lookup::Fresh(data)) => {
                AtomicStats::incr(&self.stats.hits);
                debug!(key = %key, backend = %opts.backend, "Cache hit");
                return Ok(CacheOutcome::Hit(data));
            }
            Ok(Lookup::Expired) | Ok(Lookup::Malformed) => {
                AtomicStats::incr(&self.stats.evictions);
            }
            Ok(Lookup::Absent) => {}
            Err(e) => {
                AtomicStats::incr(&self.stats.errors);
                warn!(key = %key, backend = %opts.backend, error = %e, "Cache read failed, treating as miss");
            }
        }
        AtomicStats::incr(&self.stats.misses);
        debug!(key = %key, backend = %opts.backend, "Cache miss");

        match self.http.execute(request).await {
            Ok(resp) => {
                match store.write(&key, &resp.data, opts.ttl) {
                    Ok(()) => {
                        AtomicStats::incr(&self.stats.writes);
                        debug!(key = %key, ttl_ms = duration_millis(opts.ttl), "Cached response");
                    }
                    Err(e) => {
                        AtomicStats::incr(&self.stats.errors);
                        warn!(key = %key, error = %e, "Cache write failed");
                    }
                }
                Ok(CacheOutcome::Miss(resp))
            }
            Err(err) => {
                if opts.clear_on_error {
                    debug!(key = %key, "Request failed, clearing cache entry");
                    if let Err(e) = store.remove(&key) {
                        AtomicStats::incr(&self.stats.errors);
                        warn!(key = %key, error = %e, "Cache removal failed");
                    }
                }
                Err(err)
            }
        }
    }

    /// Key under which `request` is cached with these options.
    pub fn cache_key(&self, request: &RequestDescriptor, options: Option<&CacheOptions>) -> CacheKey {
        self.key_for(request, &CacheOptions::resolve(options, &self.config))
    }

    /// Drop the cached entry for `request`, if any.
    pub fn invalidate(&self, request: &RequestDescriptor, options: Option<&CacheOptions>) -> Result<()> {
        let opts = CacheOptions::resolve(options, &self.config);
        self.store(opts.backend).remove(&self.key_for(request, &opts))
    }

    /// Remove every item in one backend's storage.
    pub fn clear(&self, backend: Backend) -> Result<()> {
        self.store(backend).storage().clear()
    }

    pub fn store(&self, backend: Backend) -> &CacheStore {
        match backend {
            Backend::Persistent => &self.persistent,
            Backend::Session => &self.session,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    fn key_for(&self, request: &RequestDescriptor, opts: &Resolved) -> CacheKey {
        let key = match &opts.key_fn {
            Some(f) => CacheKey::new(f(request)),
            None => self.keys.generate(request),
        };
        match &self.config.key_prefix {
            Some(prefix) => key.prefixed(prefix),
            None => key,
        }
    }
}
