//! Snapshot persistence for coursetrack.
//!
//! This crate provides a trait-based `save`/`load` interface for the progress
//! snapshot with a JSON file backend and an in-memory backend for tests.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{SnapshotStorage, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;

/// Record name used when none is configured.
pub const DEFAULT_RECORD_NAME: &str = "ai-expert-progress";
