//! Progress store contract and the in-memory backend.

use crate::Result;
use dashmap::DashMap;
use std::collections::HashMap;
use versetype_types::ProgressRecord;

/// Durable mapping from (user, collection) to a progress record.
///
/// Implementations serialize writes per key; writes to different keys must
/// not block each other. `update` is a monotonic upsert: the stored record
/// never moves backwards, and the merged result is returned.
pub trait ProgressStore: Send + Sync {
    /// Return the record for this key, creating and persisting a fresh one
    /// with `total_count` passages if none exists.
    fn get_or_create(
        &self,
        user_id: &str,
        collection: &str,
        total_count: u32,
    ) -> Result<ProgressRecord>;

    /// Persist `record`, merged with whatever is stored for the key.
    fn update(
        &self,
        user_id: &str,
        collection: &str,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord>;

    /// Completion percentage of every collection the user has started.
    fn list_all(&self, user_id: &str) -> Result<HashMap<String, u32>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ProgressKey {
    pub user_id: String,
    pub collection: String,
}

impl ProgressKey {
    pub fn new(user_id: &str, collection: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            collection: collection.to_string(),
        }
    }
}

/// In-memory store backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: DashMap<ProgressKey, ProgressRecord>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like `get_or_create`, also reporting whether the record was created.
    pub(crate) fn get_or_insert(&self, key: ProgressKey, total_count: u32) -> (ProgressRecord, bool) {
        let mut created = false;
        let record = *self
            .records
            .entry(key)
            .or_insert_with(|| {
                created = true;
                ProgressRecord::new(total_count)
            })
            .value();
        (record, created)
    }

    pub(crate) fn merge(&self, key: ProgressKey, record: &ProgressRecord) -> ProgressRecord {
        *self
            .records
            .entry(key)
            .and_modify(|stored| *stored = stored.merge_monotonic(record))
            .or_insert(*record)
            .value()
    }

    pub(crate) fn insert(&self, key: ProgressKey, record: ProgressRecord) {
        self.records.insert(key, record);
    }

    /// Copy of every record, grouped by user.
    pub(crate) fn snapshot(&self) -> HashMap<String, HashMap<String, ProgressRecord>> {
        let mut users: HashMap<String, HashMap<String, ProgressRecord>> = HashMap::new();
        for entry in self.records.iter() {
            users
                .entry(entry.key().user_id.clone())
                .or_default()
                .insert(entry.key().collection.clone(), *entry.value());
        }
        users
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get_or_create(
        &self,
        user_id: &str,
        collection: &str,
        total_count: u32,
    ) -> Result<ProgressRecord> {
        Ok(self.get_or_insert(ProgressKey::new(user_id, collection), total_count).0)
    }

    fn update(
        &self,
        user_id: &str,
        collection: &str,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord> {
        Ok(self.merge(ProgressKey::new(user_id, collection), record))
    }

    fn list_all(&self, user_id: &str) -> Result<HashMap<String, u32>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.key().user_id == user_id)
            .map(|entry| (entry.key().collection.clone(), entry.value().percent_complete()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_or_create_returns_existing() {
        let store = MemoryProgressStore::new();
        let mut record = store.get_or_create("u1", "Genesis", 3).unwrap();
        assert_eq!(record, ProgressRecord::new(3));

        record.current_index = 2;
        record.correct = 2;
        store.update("u1", "Genesis", &record).unwrap();

        let again = store.get_or_create("u1", "Genesis", 3).unwrap();
        assert_eq!(again.current_index, 2);
    }

    #[test]
    fn test_concurrent_get_or_create_single_record() {
        let store = Arc::new(MemoryProgressStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || store.get_or_create("u1", "Genesis", 5).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), ProgressRecord::new(5));
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_does_not_lose_progress() {
        let store = MemoryProgressStore::new();
        let base = store.get_or_create("u1", "Genesis", 10).unwrap();

        let ahead = ProgressRecord { current_index: 4, correct: 4, ..base };
        let behind = ProgressRecord { current_index: 2, correct: 2, mistakes: 1, ..base };
        store.update("u1", "Genesis", &ahead).unwrap();
        let merged = store.update("u1", "Genesis", &behind).unwrap();

        assert_eq!(merged.current_index, 4);
        assert_eq!(merged.correct, 4);
        assert_eq!(merged.mistakes, 1);
    }

    #[test]
    fn test_list_all_only_includes_user() {
        let store = MemoryProgressStore::new();
        let record = store.get_or_create("u1", "Genesis", 4).unwrap();
        store
            .update("u1", "Genesis", &ProgressRecord { current_index: 1, ..record })
            .unwrap();
        store.get_or_create("u2", "Exodus", 4).unwrap();

        let percents = store.list_all("u1").unwrap();
        assert_eq!(percents.len(), 1);
        assert_eq!(percents["Genesis"], 25);
    }
}
