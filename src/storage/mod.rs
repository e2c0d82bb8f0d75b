//! # Storage Module
//!
//! Raw key/value stores the cache writes its entries into. The interface
//! mirrors the browser Web Storage API: string keys, string values, and
//! atomic single-key `get_item` / `set_item` / `remove_item`.
//!
//! | Backend | Implementation | Lifetime |
//! |---------|----------------|----------|
//! | [`Backend::Persistent`] | [`FileStorage`] (or [`MemoryStorage`] without a directory) | survives restarts |
//! | [`Backend::Session`] | [`MemoryStorage`] | current process |

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Synchronous key/value store.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    /// Deletes the item; no-op if absent.
    fn remove_item(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Which of the two storage targets a request is cached in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Persistent,
    Session,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Persistent => "persistent",
            Backend::Session => "session",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "persistent" | "local" => Ok(Backend::Persistent),
            "session" => Ok(Backend::Session),
            other => Err(Error::configuration_with_context(
                format!("unknown storage backend '{}'", other),
                ErrorContext::new()
                    .with_field_path("backend")
                    .with_details("expected 'persistent' or 'session'"),
            )),
        }
    }
}
