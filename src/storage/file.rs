use super::Storage;
use crate::{Error, ErrorContext, Result};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

/// Key/value store persisted as a single JSON document on disk.
///
/// Every operation re-reads the document under an advisory lock held on a
/// sidecar `<file>.lock`: shared for reads, exclusive for read-modify-write.
/// Writes go through a uniquely named temp file in the same directory that is
/// then renamed over the document, so items survive process restarts and
/// instances pointed at the same file (in this or another process) observe
/// each other's writes.
pub struct FileStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStorage {
    pub const FILE_NAME: &'static str = "request-cache.json";

    /// Open (lazily) the store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    /// Store backed by [`FileStorage::FILE_NAME`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Open the sidecar lock file and take the advisory lock. The lock is
    /// released when the returned handle is dropped.
    fn lock(&self, exclusive: bool) -> Result<File> {
        fs::create_dir_all(self.dir()).map_err(|e| self.io_error("create dir failed", e))?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| self.io_error("open lock file failed", e))?;
        let locked = if exclusive {
            file.lock_exclusive()
        } else {
            file.lock_shared()
        };
        locked.map_err(|e| self.io_error("lock failed", e))?;
        Ok(file)
    }

    fn read_raw(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error("read failed", e)),
        }
    }

    fn parse(&self, raw: &str) -> Result<BTreeMap<String, String>> {
        serde_json::from_str(raw).map_err(|e| {
            Error::storage_with_context(
                "storage file is not a JSON object of strings",
                ErrorContext::new()
                    .with_field_path(self.path.display().to_string())
                    .with_details(e.to_string())
                    .with_source("file_storage"),
            )
        })
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match self.read_raw()? {
            Some(raw) => self.parse(&raw),
            None => Ok(BTreeMap::new()),
        }
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string(items)?;
        let mut tmp = NamedTempFile::new_in(self.dir())
            .map_err(|e| self.io_error("create temp file failed", e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| self.io_error("write failed", e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error("rename failed", e.error))?;
        Ok(())
    }

    /// Read-modify-write under the exclusive lock. A document that does not
    /// parse is replaced: it is treated as empty and always rewritten.
    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let _lock = self.lock(true)?;
        let (mut items, recovered) = match self.read_raw()? {
            None => (BTreeMap::new(), false),
            Some(raw) => match self.parse(&raw) {
                Ok(items) => (items, false),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Discarding unreadable storage file"
                    );
                    (BTreeMap::new(), true)
                }
            },
        };
        if f(&mut items) || recovered {
            self.persist(&items)?;
        }
        Ok(())
    }

    fn io_error(&self, msg: &str, e: std::io::Error) -> Error {
        Error::storage_with_context(
            msg,
            ErrorContext::new()
                .with_field_path(self.path.display().to_string())
                .with_details(e.to_string())
                .with_source("file_storage"),
        )
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _lock = self.lock(false)?;
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|items| items.remove(key).is_some())
    }

    fn clear(&self) -> Result<()> {
        self.update(|items| {
            let had_items = !items.is_empty();
            items.clear();
            had_items
        })
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
