use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::keys::ItemKey;
use super::types::{Cursor, Item, Page, PutCondition};
use super::Result;

/// The raw single-table store.
///
/// Implementations guarantee per-key atomicity only; nothing here spans two
/// keys. Store transport failures and timeouts surface as
/// [`RepositoryError::StoreUnavailable`](super::RepositoryError::StoreUnavailable)
/// and are never retried by the implementation.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Writes a whole item. The item must carry its `PK` and `SK` attributes.
    ///
    /// Returns `ConditionFailed` when `condition` does not hold.
    async fn put(&self, item: Item, condition: PutCondition) -> Result<()>;

    /// Reads one item by exact key.
    async fn get(&self, key: &ItemKey) -> Result<Option<Item>>;

    /// Merges `fields` into an existing item and returns the new image.
    ///
    /// Fails with `NotFound` if the item does not exist and with
    /// `InvalidData` if `fields` is empty or touches a key attribute.
    async fn update(&self, key: &ItemKey, fields: Item) -> Result<Item>;

    /// Removes an item, returning the old image if there was one.
    async fn delete(&self, key: &ItemKey) -> Result<Option<Item>>;

    /// One page of the items in partition `pk` whose sort key starts with
    /// `sk_prefix`, ordered by sort key.
    async fn query(&self, pk: &str, sk_prefix: &str, cursor: Option<Cursor>) -> Result<Page>;

    /// One page of a full-table scan, optionally keeping only items whose sort
    /// key equals `sort_key_equals`. Scan order is unspecified.
    async fn scan(&self, sort_key_equals: Option<&str>, cursor: Option<Cursor>) -> Result<Page>;

    /// Atomically adds `delta` to the numeric attribute `attribute` and sets
    /// `updated_at` to `touched_at`. Returns the attribute's new value.
    ///
    /// Fails with `NotFound` instead of creating the item.
    async fn atomic_add(
        &self,
        key: &ItemKey,
        attribute: &str,
        delta: i64,
        touched_at: DateTime<Utc>,
    ) -> Result<i64>;
}

/// External storage for attachment bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Deleting a missing object is not an error.
    async fn delete_object(&self, key: &str) -> Result<()>;
}
