//! Object storage seam for resumes and logos.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;

use jobboard_storage::{R2Client, StorageError, StorageResult};

#[axum::async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;
    /// Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;
    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String>;
    async fn ping(&self) -> StorageResult<()>;
}

#[axum::async_trait]
impl BlobStore for R2Client {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.upload_bytes(data, key, content_type).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.delete_object(key).await
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        R2Client::presign_get(self, key, expires_in).await
    }

    async fn ping(&self) -> StorageResult<()> {
        self.check_connectivity().await
    }
}

/// Objects held in memory, with fake presigned URLs.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[axum::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        if !self.contains(key).await {
            return Err(StorageError::not_found(key));
        }
        Ok(format!("memory://{}?expires_in={}", key, expires_in.as_secs()))
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}
