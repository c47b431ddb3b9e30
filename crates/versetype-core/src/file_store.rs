//! JSON file persistence for progress records.
//!
//! Records live in a [`MemoryProgressStore`]; every mutation rewrites the
//! snapshot file `{user_id: {collection: record}}` via temp file and rename,
//! so a crash mid-write never leaves a truncated file behind.

use crate::store::{MemoryProgressStore, ProgressKey, ProgressStore};
use crate::{Result, VersetypeError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};
use versetype_types::ProgressRecord;

type Snapshot = HashMap<String, HashMap<String, ProgressRecord>>;

pub struct FileProgressStore {
    path: PathBuf,
    records: MemoryProgressStore,
    /// Serializes snapshot writes; the record map itself is not behind it.
    write_lock: Mutex<()>,
}

impl FileProgressStore {
    /// Open the store at `path`, loading existing records.
    ///
    /// A missing file starts empty. A corrupt file is moved aside to
    /// `<path>.corrupt` and the store starts empty.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let records = MemoryProgressStore::new();
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Snapshot>(&content) {
                Ok(snapshot) => {
                    for (user_id, collections) in snapshot {
                        for (collection, record) in collections {
                            records.insert(ProgressKey { user_id: user_id.clone(), collection }, record);
                        }
                    }
                    info!(target: "versetype::store", "Loaded {} progress records from {}", records.len(), path.display());
                }
                Err(e) => {
                    let backup = corrupt_backup_path(path);
                    warn!(
                        target: "versetype::store",
                        "Progress file {} is corrupt ({}), moving it to {} and starting empty",
                        path.display(),
                        e,
                        backup.display()
                    );
                    std::fs::rename(path, &backup)?;
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "versetype::store", "No progress file at {}, starting empty", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path: path.to_path_buf(),
            records,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| VersetypeError::Storage("progress file lock poisoned".to_string()))?;

        let json = serde_json::to_string_pretty(&self.records.snapshot())?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

impl ProgressStore for FileProgressStore {
    fn get_or_create(
        &self,
        user_id: &str,
        collection: &str,
        total_count: u32,
    ) -> Result<ProgressRecord> {
        let (record, created) = self
            .records
            .get_or_insert(ProgressKey::new(user_id, collection), total_count);
        if created {
            self.flush()?;
        }
        Ok(record)
    }

    fn update(
        &self,
        user_id: &str,
        collection: &str,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord> {
        let merged = self.records.merge(ProgressKey::new(user_id, collection), record);
        self.flush()?;
        Ok(merged)
    }

    fn list_all(&self, user_id: &str) -> Result<HashMap<String, u32>> {
        self.records.list_all(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");

        {
            let store = FileProgressStore::open(&path).unwrap();
            let record = store.get_or_create("u1", "Genesis", 2).unwrap();
            store
                .update("u1", "Genesis", &ProgressRecord { current_index: 1, correct: 1, ..record })
                .unwrap();
        }

        let store = FileProgressStore::open(&path).unwrap();
        let record = store.get_or_create("u1", "Genesis", 2).unwrap();
        assert_eq!(record.current_index, 1);
        assert_eq!(record.correct, 1);
    }

    #[test]
    fn test_corrupt_file_starts_empty_and_is_kept_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "{ not valid json").unwrap();

        let store = FileProgressStore::open(&path).unwrap();
        assert!(store.list_all("u1").unwrap().is_empty());
        assert!(dir.path().join("progress.json.corrupt").exists());

        store.get_or_create("u1", "Genesis", 2).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Genesis"));
    }

    #[test]
    fn test_missing_parent_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("progress.json");
        let store = FileProgressStore::open(&path).unwrap();
        store.get_or_create("u1", "Exodus", 1).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_update_fails_when_directory_disappears() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        let path = nested.join("progress.json");
        let store = FileProgressStore::open(&path).unwrap();
        let record = store.get_or_create("u1", "Genesis", 2).unwrap();

        std::fs::remove_dir_all(&nested).unwrap();
        let result = store.update("u1", "Genesis", &ProgressRecord { current_index: 1, ..record });
        assert!(result.unwrap_err().is_storage());
    }
}
