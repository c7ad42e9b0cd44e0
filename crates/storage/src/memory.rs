//! In-memory storage backend.
//!
//! Holds the serialized record in memory so the full JSON path is still
//! exercised. Clones share the same record.

use std::sync::Arc;
use coursetrack_core::ProgressSnapshot;
use super::{SnapshotStorage, StorageError, Result};
use tokio::sync::Mutex;

/// In-memory snapshot storage.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    record: Arc<Mutex<Option<String>>>,
    fail_writes: bool,
}

impl MemoryStorage {
    /// Empty storage, nothing persisted yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a raw record, valid JSON or not.
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(json.into()))),
            fail_writes: false,
        }
    }

    /// Storage pre-seeded with a snapshot.
    pub fn with_snapshot(snapshot: &ProgressSnapshot) -> Result<Self> {
        Ok(Self::with_raw(serde_json::to_string(snapshot)?))
    }

    /// Make every subsequent save fail.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// The raw record, if any.
    pub async fn raw(&self) -> Option<String> {
        self.record.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl SnapshotStorage for MemoryStorage {
    async fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<()> {
        if self.fail_writes {
            return Err(StorageError::Other("write rejected".to_string()));
        }
        let json = serde_json::to_string(snapshot)?;
        *self.record.lock().await = Some(json);
        Ok(())
    }

    async fn load(&self) -> Result<Option<ProgressSnapshot>> {
        match self.record.lock().await.as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_record() {
        let reader = MemoryStorage::new();
        let mut writer = reader.clone();

        let mut snapshot = ProgressSnapshot::default();
        snapshot.streak_days = 7;
        writer.save(&snapshot).await.unwrap();

        assert_eq!(reader.load().await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let mut storage = MemoryStorage::new().failing_writes();
        assert!(storage.save(&ProgressSnapshot::default()).await.is_err());
        assert!(storage.raw().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_raw_record() {
        let storage = MemoryStorage::with_raw("{\"lectures\": 42}");
        assert!(matches!(storage.load().await, Err(StorageError::Json(_))));
    }
}
