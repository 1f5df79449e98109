//! Key-value persistence for the order list
//!
//! The store only needs string get/set on named keys, the same contract the
//! page had with its browser storage. [`FileStore`] keeps one JSON file per
//! key; [`MemoryStore`] keeps everything in memory and can simulate failures.

use crate::error::{ProcurementError, ProcurementResult};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// String key-value storage port
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> ProcurementResult<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> ProcurementResult<()>;

    /// Delete a key; missing keys are not an error
    fn remove(&self, key: &str) -> ProcurementResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> ProcurementResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> ProcurementResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> ProcurementResult<()> {
        (**self).remove(key)
    }
}

/// File-backed store: `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ProcurementResult<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| ProcurementError::StorageRead {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn set(&self, key: &str, value: &str) -> ProcurementResult<()> {
        let write_err = |e: std::io::Error| ProcurementError::StorageWrite {
            key: key.to_string(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        // Write atomically via temp file
        let path = self.key_path(key);
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(value.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        fs::rename(&temp_path, &path).map_err(write_err)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> ProcurementResult<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| ProcurementError::StorageWrite {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// In-memory store with switchable failures
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing the write counter
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Make every read fail, as an unavailable storage would
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Make every write fail, as an exceeded quota would
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Raw stored value
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ProcurementResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(ProcurementError::StorageRead {
                key: key.to_string(),
                reason: "storage unavailable".to_string(),
            });
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ProcurementResult<()> {
        if self.fail_writes.get() {
            return Err(ProcurementError::StorageWrite {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> ProcurementResult<()> {
        if self.fail_writes.get() {
            return Err(ProcurementError::StorageWrite {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Replace characters that are not safe in file names
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("storage"));

        assert_eq!(store.get("mh_procurement_cart").unwrap(), None);

        store.set("mh_procurement_cart", "[]").unwrap();
        assert_eq!(
            store.get("mh_procurement_cart").unwrap().as_deref(),
            Some("[]")
        );
        assert!(store.key_path("mh_procurement_cart").exists());
        assert!(!store
            .key_path("mh_procurement_cart")
            .with_extension("tmp")
            .exists());
    }

    #[test]
    fn file_store_remove() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());

        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn sanitize_key_replaces_separators() {
        assert_eq!(sanitize_key("a/b:c"), "a_b_c");
        assert_eq!(sanitize_key("mh_procurement_cart"), "mh_procurement_cart");
    }

    #[test]
    fn memory_store_failures() {
        let store = MemoryStore::new().with_entry("k", "v");
        assert_eq!(store.write_count(), 0);

        store.set_fail_reads(true);
        assert!(store.get("k").is_err());
        store.set_fail_reads(false);

        store.set_fail_writes(true);
        assert!(store.set("k", "w").is_err());
        assert_eq!(store.raw("k").as_deref(), Some("v"));

        store.set_fail_writes(false);
        store.set("k", "w").unwrap();
        assert_eq!(store.write_count(), 1);
    }
}
