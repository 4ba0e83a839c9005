//! Store wrappers that inject failures into otherwise healthy backends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campusboard_core::storage::{
    BlobStore, Cursor, Item, ItemKey, ItemStore, Page, PutCondition, RepositoryError, Result,
};

use crate::storage::{InMemoryBlobStore, InMemoryStore};

fn unavailable() -> RepositoryError {
    RepositoryError::StoreUnavailable("injected failure".to_string())
}

/// Delegates to an [`InMemoryStore`] but fails counter updates while
/// `fail_counters` is set.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    fail_counters: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            fail_counters: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_counters(&self, fail: bool) {
        self.fail_counters.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ItemStore for FlakyStore {
    async fn put(&self, item: Item, condition: PutCondition) -> Result<()> {
        self.inner.put(item, condition).await
    }

    async fn get(&self, key: &ItemKey) -> Result<Option<Item>> {
        self.inner.get(key).await
    }

    async fn update(&self, key: &ItemKey, fields: Item) -> Result<Item> {
        self.inner.update(key, fields).await
    }

    async fn delete(&self, key: &ItemKey) -> Result<Option<Item>> {
        self.inner.delete(key).await
    }

    async fn query(&self, pk: &str, sk_prefix: &str, cursor: Option<Cursor>) -> Result<Page> {
        self.inner.query(pk, sk_prefix, cursor).await
    }

    async fn scan(&self, sort_key_equals: Option<&str>, cursor: Option<Cursor>) -> Result<Page> {
        self.inner.scan(sort_key_equals, cursor).await
    }

    async fn atomic_add(
        &self,
        key: &ItemKey,
        attribute: &str,
        delta: i64,
        touched_at: DateTime<Utc>,
    ) -> Result<i64> {
        if self.fail_counters.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.atomic_add(key, attribute, delta, touched_at).await
    }
}

/// Delegates to an [`InMemoryStore`], but writes a queued item just before
/// the next conditional put, as if another request had landed between the
/// caller's read and its write.
#[derive(Clone, Default)]
pub struct RacingStore {
    pub inner: InMemoryStore,
    queued: Arc<Mutex<Option<Item>>>,
}

impl RacingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            queued: Arc::default(),
        }
    }

    pub fn interleave(&self, item: Item) {
        *self.queued.lock().unwrap() = Some(item);
    }
}

#[async_trait]
impl ItemStore for RacingStore {
    async fn put(&self, item: Item, condition: PutCondition) -> Result<()> {
        if !matches!(condition, PutCondition::Always) {
            let queued = self.queued.lock().unwrap().take();
            if let Some(other) = queued {
                self.inner.put(other, PutCondition::Always).await?;
            }
        }
        self.inner.put(item, condition).await
    }

    async fn get(&self, key: &ItemKey) -> Result<Option<Item>> {
        self.inner.get(key).await
    }

    async fn update(&self, key: &ItemKey, fields: Item) -> Result<Item> {
        self.inner.update(key, fields).await
    }

    async fn delete(&self, key: &ItemKey) -> Result<Option<Item>> {
        self.inner.delete(key).await
    }

    async fn query(&self, pk: &str, sk_prefix: &str, cursor: Option<Cursor>) -> Result<Page> {
        self.inner.query(pk, sk_prefix, cursor).await
    }

    async fn scan(&self, sort_key_equals: Option<&str>, cursor: Option<Cursor>) -> Result<Page> {
        self.inner.scan(sort_key_equals, cursor).await
    }

    async fn atomic_add(
        &self,
        key: &ItemKey,
        attribute: &str,
        delta: i64,
        touched_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.inner.atomic_add(key, attribute, delta, touched_at).await
    }
}

/// Blob store whose deletes always fail.
#[derive(Clone, Default)]
pub struct StickyBlobStore {
    pub inner: InMemoryBlobStore,
}

#[async_trait]
impl BlobStore for StickyBlobStore {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.inner.put_object(key, bytes, content_type).await
    }

    async fn delete_object(&self, _key: &str) -> Result<()> {
        Err(unavailable())
    }
}
