//! Client-level cache configuration.
//!
//! Values can come from code (`with_*` builders), from the environment
//! ([`CacheConfig::from_env`]) or from a YAML/JSON file ([`CacheConfig::load`]).

use crate::storage::Backend;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub default_backend: Backend,
    #[serde(rename = "default_ttl_ms", with = "duration_ms")]
    pub default_ttl: Duration,
    pub clear_on_error: bool,
    pub key_prefix: Option<String>,
    pub hash_keys: bool,
    /// Directory of the persistent file store. Without it the persistent
    /// backend is in-memory as well.
    pub storage_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_backend: Backend::Persistent,
            default_ttl: DEFAULT_TTL,
            clear_on_error: false,
            key_prefix: None,
            hash_keys: false,
            storage_dir: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.default_backend = backend;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_clear_on_error(mut self, clear: bool) -> Self {
        self.clear_on_error = clear;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_hash_keys(mut self, hash: bool) -> Self {
        self.hash_keys = hash;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// Defaults overridden by `REQUEST_CACHE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Apply `REQUEST_CACHE_*` overrides on top of `self`.
    pub fn merge_env(self) -> Result<Self> {
        self.merge_vars(|name| env::var(name).ok())
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = var("REQUEST_CACHE_ENABLED") {
            self.enabled = parse_bool("REQUEST_CACHE_ENABLED", &v)?;
        }
        if let Some(v) = var("REQUEST_CACHE_BACKEND") {
            self.default_backend = v.parse()?;
        }
        if let Some(v) = var("REQUEST_CACHE_TTL_MS") {
            let ms = v.trim().parse::<u64>().map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid ttl '{}'", v),
                    ErrorContext::new()
                        .with_field_path("REQUEST_CACHE_TTL_MS")
                        .with_details(e.to_string()),
                )
            })?;
            self.default_ttl = Duration::from_millis(ms);
        }
        if let Some(v) = var("REQUEST_CACHE_CLEAR_ON_ERROR") {
            self.clear_on_error = parse_bool("REQUEST_CACHE_CLEAR_ON_ERROR", &v)?;
        }
        if let Some(v) = var("REQUEST_CACHE_PREFIX") {
            self.key_prefix = Some(v).filter(|p| !p.is_empty());
        }
        if let Some(v) = var("REQUEST_CACHE_HASH_KEYS") {
            self.hash_keys = parse_bool("REQUEST_CACHE_HASH_KEYS", &v)?;
        }
        if let Some(v) = var("REQUEST_CACHE_DIR") {
            self.storage_dir = Some(PathBuf::from(v)).filter(|p| !p.as_os_str().is_empty());
        }
        Ok(self)
    }

    /// Load from a YAML or JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                "cannot read config file",
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::configuration_with_context(
            format!("invalid boolean '{}'", value),
            ErrorContext::new().with_field_path(name),
        )),
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(crate::cache::duration_millis(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
