//! JSON file storage implementation.
//!
//! Keeps the snapshot as a single named JSON record under a data directory,
//! plus a small meta marker (version + updated_at) bumped on every save.

use std::path::{Path, PathBuf};
use coursetrack_core::ProgressSnapshot;
use super::{SnapshotStorage, Result};
use tokio::fs;
use tracing::{debug, warn};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    record_name: String,
}

impl JsonStorage {
    /// Create storage for the default record name.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_record_name(root, crate::DEFAULT_RECORD_NAME).await
    }

    /// Create storage for a named record. Creates the data and meta
    /// directories if needed.
    pub async fn with_record_name(root: impl AsRef<Path>, record_name: impl Into<String>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join("meta")).await?;

        Ok(Self {
            root,
            record_name: record_name.into(),
        })
    }

    /// Path of the snapshot record.
    pub fn record_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.record_name))
    }

    fn meta_path(&self) -> PathBuf {
        self.root.join("meta").join(format!("{}.meta.json", self.record_name))
    }

    /// Persisted record version, 0 if never saved.
    pub async fn version(&self) -> Result<u64> {
        Ok(read_version(&self.meta_path()).await)
    }

    /// Read and increment the record version, return the new version.
    async fn bump_version(&self) -> Result<u64> {
        let path = self.meta_path();
        let version = read_version(&path).await + 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }
}

#[async_trait::async_trait]
impl SnapshotStorage for JsonStorage {
    async fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<()> {
        let path = self.record_path();
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json.as_bytes()).await?;

        // the record is already on disk, a stale marker is not a failed save
        match self.bump_version().await {
            Ok(version) => debug!("Saved {} (version {})", path.display(), version),
            Err(e) => warn!(error = %e, "Saved {} but failed to update meta", path.display()),
        }
        Ok(())
    }

    async fn load(&self) -> Result<Option<ProgressSnapshot>> {
        read_json(&self.record_path()).await
    }
}

async fn read_version(path: &Path) -> u64 {
    match fs::read_to_string(path).await {
        Ok(s) => serde_json::from_str::<serde_json::Value>(&s)
            .ok()
            .and_then(|json| json.get("version").and_then(|v| v.as_u64()))
            .unwrap_or(0),
        // missing meta means never saved
        Err(_) => 0,
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;
    use chrono::Utc;

    #[tokio::test]
    async fn test_load_missing_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();

        assert!(storage.load().await.unwrap().is_none());
        assert_eq!(storage.version().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let mut snapshot = ProgressSnapshot::default();
        snapshot.toggle(&"linear-algebra".into(), &"vectors".into(), Utc::now());
        snapshot.achievements.insert("first-lecture".to_string());

        storage.save(&snapshot).await.unwrap();
        storage.save(&snapshot).await.unwrap();

        assert_eq!(storage.load().await.unwrap(), Some(snapshot));
        assert_eq!(storage.version().await.unwrap(), 2);
        assert!(dir.path().join("ai-expert-progress.json").exists());
    }

    #[tokio::test]
    async fn test_record_name_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::with_record_name(dir.path(), "other").await.unwrap();
        storage.save(&ProgressSnapshot::default()).await.unwrap();

        assert!(dir.path().join("other.json").exists());
        assert!(dir.path().join("meta").join("other.meta.json").exists());
    }

    #[tokio::test]
    async fn test_meta_failure_does_not_fail_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        // a directory where the meta file should go makes the marker unwritable
        fs::create_dir_all(dir.path().join("meta").join("ai-expert-progress.meta.json"))
            .await
            .unwrap();

        let mut snapshot = ProgressSnapshot::default();
        snapshot.streak_days = 3;
        storage.save(&snapshot).await.unwrap();

        assert_eq!(storage.load().await.unwrap(), Some(snapshot));
        assert_eq!(storage.version().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        fs::write(storage.record_path(), b"{ not json").await.unwrap();

        let err = storage.load().await.unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }
}
