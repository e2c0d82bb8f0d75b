use crate::cache::KeyFn;
use crate::config::CacheConfig;
use crate::storage::Backend;
use crate::types::RequestDescriptor;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Per-call overrides. Unset fields fall back to the client's [`CacheConfig`].
#[derive(Clone, Default)]
pub struct CacheOptions {
    pub backend: Option<Backend>,
    pub ttl: Option<Duration>,
    pub clear_on_error: Option<bool>,
    pub key_fn: Option<KeyFn>,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_clear_on_error(mut self, clear: bool) -> Self {
        self.clear_on_error = Some(clear);
        self
    }

    pub fn with_key_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestDescriptor) -> String + Send + Sync + 'static,
    {
        self.key_fn = Some(Arc::new(f));
        self
    }

    pub(crate) fn resolve(options: Option<&CacheOptions>, config: &CacheConfig) -> Resolved {
        let options = options.cloned().unwrap_or_default();
        Resolved {
            backend: options.backend.unwrap_or(config.default_backend),
            ttl: options.ttl.unwrap_or(config.default_ttl),
            clear_on_error: options.clear_on_error.unwrap_or(config.clear_on_error),
            key_fn: options.key_fn,
        }
    }
}

impl fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("backend", &self.backend)
            .field("ttl", &self.ttl)
            .field("clear_on_error", &self.clear_on_error)
            .field("key_fn", &self.key_fn.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Effective options for one call.
pub(crate) struct Resolved {
    pub(crate) backend: Backend,
    pub(crate) ttl: Duration,
    pub(crate) clear_on_error: bool,
    pub(crate) key_fn: Option<KeyFn>,
}
