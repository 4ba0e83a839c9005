//! In-memory blob store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use campusboard_core::storage::{BlobStore, Result};

/// A stored object: bytes plus content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Blob store that keeps objects in a map. Lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let mut objects = self.objects.write().await;
        objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_delete_object() {
        let blobs = InMemoryBlobStore::new();
        blobs
            .put_object("attachments/p1/f1-a.txt", b"hello".to_vec(), "text/plain")
            .await
            .unwrap();
        let stored = blobs.object("attachments/p1/f1-a.txt").await.unwrap();
        assert_eq!(stored.bytes, b"hello");
        assert_eq!(stored.content_type, "text/plain");

        blobs.delete_object("attachments/p1/f1-a.txt").await.unwrap();
        blobs.delete_object("attachments/p1/f1-a.txt").await.unwrap();
        assert!(blobs.object("attachments/p1/f1-a.txt").await.is_none());
    }
}
