//! Durable Storage Slot
//!
//! Information Hiding:
//! - File paths and quota detection hidden from the conversation store
//! - The slot holds one opaque string; layout belongs to the store
//! - Allows swapping between file and memory backends without API changes

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

/// Failure writing or reading the slot.
#[derive(Debug, Error)]
pub enum SlotError {
    /// The backing storage is out of room. Recoverable by shrinking the payload.
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("slot I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// The single durable key-value slot holding the serialized conversation
/// collection.
#[async_trait]
pub trait StorageSlot: Send + Sync {
    /// Read the slot contents; `None` when nothing has been written yet.
    async fn read(&self) -> Result<Option<String>, SlotError>;

    /// Overwrite the slot contents.
    async fn write(&self, payload: &str) -> Result<(), SlotError>;
}

/// File-backed slot - the whole collection lives in one JSON file.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub async fn new(path: PathBuf) -> Result<Self, SlotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl StorageSlot for FileSlot {
    async fn read(&self) -> Result<Option<String>, SlotError> {
        match fs::read_to_string(&self.path).await {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, payload: &str) -> Result<(), SlotError> {
        fs::write(&self.path, payload).await.map_err(|e| match e.kind() {
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => SlotError::QuotaExceeded,
            _ => SlotError::Io(e),
        })
    }
}

/// In-memory slot with an optional byte quota.
/// Data is lost when the process terminates.
pub struct MemorySlot {
    contents: Arc<RwLock<Option<String>>>,
    quota_bytes: Option<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self {
            contents: Arc::new(RwLock::new(None)),
            quota_bytes: None,
        }
    }

    /// Reject writes larger than `quota_bytes`, mimicking an exhausted
    /// backing store.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            contents: Arc::new(RwLock::new(None)),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl Default for MemorySlot {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageSlot for MemorySlot {
    async fn read(&self) -> Result<Option<String>, SlotError> {
        Ok(self.contents.read().await.clone())
    }

    async fn write(&self, payload: &str) -> Result<(), SlotError> {
        if let Some(quota) = self.quota_bytes {
            if payload.len() > quota {
                return Err(SlotError::QuotaExceeded);
            }
        }
        *self.contents.write().await = Some(payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_slot_read_before_write() {
        let temp_dir = TempDir::new().unwrap();
        let slot = FileSlot::new(temp_dir.path().join("history.json"))
            .await
            .unwrap();

        assert!(slot.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_slot_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let slot = FileSlot::new(temp_dir.path().join("history.json"))
            .await
            .unwrap();

        slot.write("[]").await.unwrap();
        assert_eq!(slot.read().await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_file_slot_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("history.json");
        let slot = FileSlot::new(nested.clone()).await.unwrap();

        slot.write("payload").await.unwrap();
        assert!(nested.exists());
    }

    #[tokio::test]
    async fn test_memory_slot_round_trip() {
        let slot = MemorySlot::new();
        assert!(slot.read().await.unwrap().is_none());

        slot.write("payload").await.unwrap();
        assert_eq!(slot.read().await.unwrap().as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn test_memory_slot_quota() {
        let slot = MemorySlot::with_quota(4);

        assert!(matches!(
            slot.write("too large").await,
            Err(SlotError::QuotaExceeded)
        ));
        slot.write("ok").await.unwrap();
        assert_eq!(slot.read().await.unwrap().as_deref(), Some("ok"));
    }
}
