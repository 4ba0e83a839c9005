//! In-memory item store.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use campusboard_core::storage::conversions::{item_key, timestamp, ATTR_PK, ATTR_SK, ATTR_UPDATED_AT};
use campusboard_core::storage::{
    AttrValue, Cursor, Item, ItemKey, ItemStore, Page, PutCondition, RepositoryError, Result,
};

/// Default number of items returned per `query`/`scan` page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

type TableKey = (String, String);

/// In-memory single-table store.
///
/// Items are kept in a `BTreeMap` ordered by `(PK, SK)` behind an
/// `Arc<RwLock<_>>`, which gives the same per-key atomicity and sort-key
/// ordering a real table offers. Reads are paged by `page_size` so callers
/// exercise their cursor loops.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    items: Arc<RwLock<BTreeMap<TableKey, Item>>>,
    page_size: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new empty store with the default page size.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Creates a new empty store returning at most `page_size` items per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: page_size.max(1),
        }
    }

    /// Number of stored items.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    fn table_key(key: &ItemKey) -> TableKey {
        (key.pk.clone(), key.sk.clone())
    }

    fn paginate<'a>(&self, matching: impl Iterator<Item = (&'a TableKey, &'a Item)>) -> Page {
        let mut items = Vec::new();
        let mut last = None;
        let mut more = false;
        for (key, item) in matching {
            if items.len() == self.page_size {
                more = true;
                break;
            }
            items.push(item.clone());
            last = Some(key.clone());
        }
        let cursor = if more {
            last.map(|(pk, sk)| ItemKey::new(pk, sk))
        } else {
            None
        };
        Page { items, cursor }
    }
}

fn start_bound(cursor: Option<Cursor>) -> Bound<TableKey> {
    match cursor {
        Some(cursor) => Bound::Excluded((cursor.pk, cursor.sk)),
        None => Bound::Unbounded,
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn put(&self, item: Item, condition: PutCondition) -> Result<()> {
        let key = item_key(&item).map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        let mut items = self.items.write().await;
        let table_key = Self::table_key(&key);
        if !condition.holds(items.get(&table_key)) {
            return Err(RepositoryError::ConditionFailed(key.to_string()));
        }
        items.insert(table_key, item);
        Ok(())
    }

    async fn get(&self, key: &ItemKey) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(&Self::table_key(key)).cloned())
    }

    async fn update(&self, key: &ItemKey, fields: Item) -> Result<Item> {
        if fields.is_empty() {
            return Err(RepositoryError::InvalidData(
                "update requires at least one field".to_string(),
            ));
        }
        if fields.contains_key(ATTR_PK) || fields.contains_key(ATTR_SK) {
            return Err(RepositoryError::InvalidData(
                "key attributes cannot be updated".to_string(),
            ));
        }

        let mut items = self.items.write().await;
        let item = items
            .get_mut(&Self::table_key(key))
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "Item",
                id: key.to_string(),
            })?;
        item.extend(fields);
        Ok(item.clone())
    }

    async fn delete(&self, key: &ItemKey) -> Result<Option<Item>> {
        let mut items = self.items.write().await;
        Ok(items.remove(&Self::table_key(key)))
    }

    async fn query(&self, pk: &str, sk_prefix: &str, cursor: Option<Cursor>) -> Result<Page> {
        let items = self.items.read().await;
        let start = match cursor {
            Some(cursor) => Bound::Excluded((cursor.pk, cursor.sk)),
            None => Bound::Included((pk.to_string(), sk_prefix.to_string())),
        };
        let matching = items
            .range((start, Bound::Unbounded))
            .take_while(|((item_pk, item_sk), _)| item_pk == pk && item_sk.starts_with(sk_prefix));
        Ok(self.paginate(matching))
    }

    async fn scan(&self, sort_key_equals: Option<&str>, cursor: Option<Cursor>) -> Result<Page> {
        let items = self.items.read().await;
        let matching = items
            .range((start_bound(cursor), Bound::Unbounded))
            .filter(|((_, sk), _)| sort_key_equals.is_none_or(|wanted| sk == wanted));
        Ok(self.paginate(matching))
    }

    async fn atomic_add(
        &self,
        key: &ItemKey,
        attribute: &str,
        delta: i64,
        touched_at: DateTime<Utc>,
    ) -> Result<i64> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(&Self::table_key(key))
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "Item",
                id: key.to_string(),
            })?;
        let current = match item.get(attribute) {
            None => 0,
            Some(AttrValue::N(n)) => *n,
            Some(other) => {
                return Err(RepositoryError::InvalidData(format!(
                    "attribute {attribute} is not numeric: {other:?}"
                )))
            }
        };
        let next = current + delta;
        item.insert(attribute.to_string(), AttrValue::N(next));
        item.insert(ATTR_UPDATED_AT.to_string(), timestamp(touched_at));
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pk: &str, sk: &str) -> Item {
        let mut item = Item::new();
        item.insert(ATTR_PK.to_string(), pk.into());
        item.insert(ATTR_SK.to_string(), sk.into());
        item
    }

    async fn query_all(store: &InMemoryStore, pk: &str, prefix: &str) -> Vec<String> {
        let mut sks = Vec::new();
        let mut cursor = None;
        loop {
            let page = store.query(pk, prefix, cursor).await.unwrap();
            assert!(page.items.len() <= 2);
            sks.extend(
                page.items
                    .iter()
                    .map(|i| i[ATTR_SK].as_str().unwrap().to_string()),
            );
            cursor = page.cursor;
            if cursor.is_none() {
                break;
            }
        }
        sks
    }

    #[tokio::test]
    async fn test_put_if_absent_rejects_existing() {
        let store = InMemoryStore::new();
        store
            .put(item("POST#p1", "METADATA"), PutCondition::IfAbsent)
            .await
            .unwrap();
        let result = store
            .put(item("POST#p1", "METADATA"), PutCondition::IfAbsent)
            .await;
        assert!(matches!(result, Err(RepositoryError::ConditionFailed(_))));
    }

    #[tokio::test]
    async fn test_put_requires_key_attributes() {
        let store = InMemoryStore::new();
        let result = store.put(Item::new(), PutCondition::Always).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_query_pages_through_prefix_only() {
        let store = InMemoryStore::with_page_size(2);
        for sk in ["COMMENT#a", "COMMENT#b", "COMMENT#c", "FILE#x", "METADATA"] {
            store
                .put(item("POST#p1", sk), PutCondition::Always)
                .await
                .unwrap();
        }
        store
            .put(item("POST#p2", "COMMENT#z"), PutCondition::Always)
            .await
            .unwrap();

        assert_eq!(
            query_all(&store, "POST#p1", "COMMENT#").await,
            vec!["COMMENT#a", "COMMENT#b", "COMMENT#c"]
        );
        assert_eq!(query_all(&store, "POST#p1", "FILE#").await, vec!["FILE#x"]);
        assert!(query_all(&store, "POST#p3", "").await.is_empty());
    }

    #[tokio::test]
    async fn test_scan_filters_on_sort_key() {
        let store = InMemoryStore::with_page_size(1);
        store
            .put(item("POST#p1", "METADATA"), PutCondition::Always)
            .await
            .unwrap();
        store
            .put(item("POST#p1", "COMMENT#c"), PutCondition::Always)
            .await
            .unwrap();
        store
            .put(item("POST#p2", "METADATA"), PutCondition::Always)
            .await
            .unwrap();

        let mut found = 0;
        let mut cursor = None;
        loop {
            let page = store.scan(Some("METADATA"), cursor).await.unwrap();
            found += page.items.len();
            cursor = page.cursor;
            if cursor.is_none() {
                break;
            }
        }
        assert_eq!(found, 2);
    }

    #[tokio::test]
    async fn test_update_merges_and_requires_existing() {
        let store = InMemoryStore::new();
        let key = ItemKey::new("POST#p1", "METADATA");
        let mut fields = Item::new();
        fields.insert("title".to_string(), "new".into());
        assert!(matches!(
            store.update(&key, fields.clone()).await,
            Err(RepositoryError::NotFound { .. })
        ));

        let mut original = item("POST#p1", "METADATA");
        original.insert("content".to_string(), "body".into());
        store.put(original, PutCondition::Always).await.unwrap();

        let updated = store.update(&key, fields).await.unwrap();
        assert_eq!(updated["title"], AttrValue::from("new"));
        assert_eq!(updated["content"], AttrValue::from("body"));
    }

    #[tokio::test]
    async fn test_atomic_add_never_creates() {
        let store = InMemoryStore::new();
        let key = ItemKey::new("POST#p1", "METADATA");
        let result = store.atomic_add(&key, "upvotes", 1, Utc::now()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        assert_eq!(store.len().await, 0);

        store
            .put(item("POST#p1", "METADATA"), PutCondition::Always)
            .await
            .unwrap();
        assert_eq!(store.atomic_add(&key, "upvotes", 1, Utc::now()).await.unwrap(), 1);
        assert_eq!(store.atomic_add(&key, "upvotes", 2, Utc::now()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let store = InMemoryStore::new();
        store
            .put(item("POST#p1", "METADATA"), PutCondition::Always)
            .await
            .unwrap();
        let key = ItemKey::new("POST#p1", "METADATA");

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                let key = key.clone();
                tokio::spawn(async move { store.atomic_add(&key, "upvotes", 1, Utc::now()).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.get(&key).await.unwrap().unwrap();
        assert_eq!(stored["upvotes"], AttrValue::N(50));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryStore::new();
        let key = ItemKey::new("POST#p1", "METADATA");
        store
            .put(item("POST#p1", "METADATA"), PutCondition::Always)
            .await
            .unwrap();
        assert!(store.delete(&key).await.unwrap().is_some());
        assert!(store.delete(&key).await.unwrap().is_none());
    }
}
