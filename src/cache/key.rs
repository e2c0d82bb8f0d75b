//! Cache key generation.

use crate::types::RequestDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Caller-supplied key derivation.
pub type KeyFn = Arc<dyn Fn(&RequestDescriptor) -> String + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace the key as `prefix:key`.
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self(format!("{}:{}", prefix, self.0))
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Built-in key derivation: `method-url-query-body`.
///
/// Query and body are serialized with `serde_json`, whose objects keep keys
/// sorted, so two semantically identical descriptors always produce the same
/// key. Headers do not participate. Different descriptors can in theory
/// collide through the `-` separator; that risk is accepted.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyGenerator {
    hash: bool,
}

impl CacheKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the readable key with its SHA-256 hex digest.
    pub fn hashed(mut self, hash: bool) -> Self {
        self.hash = hash;
        self
    }

    pub fn generate(&self, request: &RequestDescriptor) -> CacheKey {
        let raw = format!(
            "{}-{}-{}-{}",
            request.normalized_method(),
            request.url,
            canonical_json(request.query.as_ref()),
            canonical_json(request.body.as_ref()),
        );
        if self.hash {
            CacheKey::new(sha256_hex(&raw))
        } else {
            CacheKey::new(raw)
        }
    }
}

/// Compact JSON with object keys sorted at every depth, whatever map
/// ordering serde_json was built with. `None` renders as `null`.
fn canonical_json(value: Option<&Value>) -> String {
    let mut out = String::new();
    match value {
        Some(value) => write_canonical(value, &mut out),
        None => out.push_str("null"),
    }
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(k.clone()).to_string());
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, v) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
