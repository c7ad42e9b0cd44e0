//! Storage trait abstraction.

use async_trait::async_trait;
use coursetrack_core::ProgressSnapshot;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Durable home of a single progress snapshot.
///
/// The progress store is handed one of these and never touches files or
/// other storage mechanics itself.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Persist the whole snapshot, replacing any previous record.
    async fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<()>;

    /// Load the persisted snapshot, `None` if nothing was saved yet.
    ///
    /// A record that exists but cannot be decoded is an error.
    async fn load(&self) -> Result<Option<ProgressSnapshot>>;
}
