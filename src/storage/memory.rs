use super::Storage;
use crate::{Error, ErrorContext, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-lifetime key/value store.
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> Error {
    Error::storage_with_context(
        "MemoryStorage poisoned",
        ErrorContext::new().with_source("memory_storage"),
    )
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.items.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
