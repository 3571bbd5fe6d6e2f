//! JSON-file host storage.
//!
//! Keeps the whole host table in memory and writes it through to a single
//! JSON document after every mutation. Writes go to a sibling temp file that
//! is then renamed over the store file, so a crash never leaves a torn file.

use super::{HostRecord, HostStore, HostTable};
use crate::config::Paths;
use crate::error::{StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed `HostStore`.
#[derive(Debug)]
pub struct JsonHostStore {
    path: PathBuf,
    table: HostTable,
}

impl JsonHostStore {
    /// Open the store at the default data location.
    pub fn new() -> StorageResult<Self> {
        let paths = Paths::discover().map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Self::open(paths.hosts_file())
    }

    /// Open (or start) the store at `path`. A missing file is an empty table.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        }

        let table = if path.exists() {
            let content =
                fs::read_to_string(&path).map_err(|e| StorageError::LoadFailed(e.to_string()))?;
            let mut table: HostTable = serde_json::from_str(&content)
                .map_err(|e| StorageError::LoadFailed(format!("{}: {}", path.display(), e)))?;
            table.normalize();
            table
        } else {
            HostTable::new()
        };

        tracing::debug!(path = %path.display(), hosts = table.len(), "host store opened");

        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn save(&self) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(&self.table)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, content).map_err(|e| StorageError::SaveFailed(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Apply `op` to the table and persist it; on a failed save the in-memory
    /// table is rolled back so it never runs ahead of the file.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut HostTable) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let before = self.table.clone();
        let value = op(&mut self.table)?;

        if let Err(e) = self.save() {
            self.table = before;
            return Err(e);
        }

        Ok(value)
    }
}

impl HostStore for JsonHostStore {
    fn get_by_ip(&self, ip: &str) -> StorageResult<HostRecord> {
        self.table.get_by_ip(ip)
    }

    fn create(&mut self, record: HostRecord) -> StorageResult<HostRecord> {
        self.mutate(|table| table.create(record))
    }

    fn update(&mut self, id: i64, record: HostRecord) -> StorageResult<HostRecord> {
        self.mutate(|table| table.update(id, record))
    }

    fn all(&self) -> StorageResult<Vec<HostRecord>> {
        self.table.all()
    }

    fn delete(&mut self, id: i64) -> StorageResult<()> {
        self.mutate(|table| table.delete(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn store_in(dir: &TempDir) -> JsonHostStore {
        assert_ok!(JsonHostStore::open(dir.path().join("hosts.json")))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = store_in(&dir);
            let a = assert_ok!(store.create(HostRecord::new("a.lan", "10.0.0.1", "22")));
            assert_ok!(store.update(a.id, HostRecord::new("a.lan", "10.0.0.1", "22,80")));
            assert_ok!(store.create(HostRecord::new("b.lan", "10.0.0.2", "443")));
        }

        let mut store = store_in(&dir);
        assert_eq!(store.len(), 2);
        let a = assert_ok!(store.get_by_ip("10.0.0.1"));
        assert_eq!(a.id, 1);
        assert_eq!(a.ports_csv, "22,80");

        // The id counter is restored with the records.
        let c = assert_ok!(store.create(HostRecord::new("c.lan", "10.0.0.3", "53")));
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_failed_operation_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert_ok!(store.create(HostRecord::new("a.lan", "10.0.0.1", "22")));
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(store
            .create(HostRecord::new("dup", "10.0.0.1", "80"))
            .unwrap_err()
            .is_duplicate());
        assert!(store.delete(42).is_err());

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_delete_persists() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = store_in(&dir);
            let a = assert_ok!(store.create(HostRecord::new("a.lan", "10.0.0.1", "22")));
            assert_ok!(store.delete(a.id));
        }
        let store = store_in(&dir);
        assert!(store.is_empty());
        assert!(store.get_by_ip("10.0.0.1").unwrap_err().is_not_found());
    }

    #[test]
    fn test_corrupt_file_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(JsonHostStore::open(&path), Err(StorageError::LoadFailed(_))));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("hosts.json");
        let mut store = assert_ok!(JsonHostStore::open(&path));
        assert_ok!(store.create(HostRecord::new("a.lan", "10.0.0.1", "22")));
        assert!(path.exists());
    }
}
