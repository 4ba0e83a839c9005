//! Typed CRUD over the single-table store.

use std::fmt::Display;
use std::sync::Arc;

use chrono::Utc;

use campusboard_core::forum::{
    Comment, CommentPatch, CreateCommentRequest, CreatePostRequest, CreateProfileRequest, Post,
    PostPatch, ProfilePatch, ReplaceCommentRequest, ReplacePostRequest, UserProfile, Vote,
    VoteTarget,
};
use campusboard_core::storage::conversions::{
    comment_to_item, item_key, post_to_item, profile_to_item, timestamp, ATTR_UPDATED_AT,
};
use campusboard_core::storage::keys::{self, METADATA_SK};
use campusboard_core::storage::{
    classify_sort_key, decode_record, Id, Item, ItemKey, ItemStore, PutCondition, Record,
    RecordKind, RepositoryError, Result,
};

fn not_found(kind: RecordKind, id: impl Display) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: kind.entity_name(),
        id: id.to_string(),
    }
}

fn unexpected(kind: RecordKind, key: &ItemKey) -> RepositoryError {
    RepositoryError::Serialization(format!(
        "record at {key} is not a {}",
        kind.entity_name()
    ))
}

/// Typed CRUD for every entity kind, built on [`ItemStore`] and the key codec.
///
/// Reads decode through [`decode_record`] immediately, so callers only ever
/// see typed records.
#[derive(Clone)]
pub struct EntityRepository {
    store: Arc<dyn ItemStore>,
}

impl EntityRepository {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    // ========================================================================
    // Generic operations
    // ========================================================================

    /// Writes a new record; fails with `AlreadyExists` if the key is taken.
    pub async fn create(&self, item: Item) -> Result<Record> {
        let record = decode_record(&item)?;
        let key = item_key(&item)?;
        match self.store.put(item, PutCondition::IfAbsent).await {
            Ok(()) => Ok(record),
            Err(RepositoryError::ConditionFailed(_)) => Err(RepositoryError::AlreadyExists {
                entity_type: record.kind().entity_name(),
                id: key.to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    /// Reads one record. Absence is `Ok(None)`, never an error.
    pub async fn get(&self, key: &ItemKey) -> Result<Option<Record>> {
        self.store
            .get(key)
            .await?
            .as_ref()
            .map(decode_record)
            .transpose()
    }

    /// Merges `fields` into an existing record and refreshes `updated_at`.
    pub async fn update(&self, key: &ItemKey, mut fields: Item) -> Result<Record> {
        if fields.is_empty() {
            return Err(RepositoryError::InvalidData(
                "update requires at least one field".to_string(),
            ));
        }
        fields.insert(ATTR_UPDATED_AT.to_string(), timestamp(Utc::now()));

        match self.store.update(key, fields).await {
            Ok(item) => decode_record(&item),
            Err(RepositoryError::NotFound { .. }) => {
                let kind = classify_sort_key(&key.sk).unwrap_or(RecordKind::Post);
                Err(not_found(kind, key))
            }
            Err(err) => Err(err),
        }
    }

    /// Removes a record. Deleting a missing key is not an error.
    pub async fn delete(&self, key: &ItemKey) -> Result<Option<Record>> {
        let Some(old) = self.store.delete(key).await? else {
            return Ok(None);
        };
        match decode_record(&old) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "Deleted record could not be decoded");
                Ok(None)
            }
        }
    }

    /// Raw items of one partition under a sort-key prefix, following the
    /// cursor until the store reports no more pages.
    async fn query_items(&self, pk: &str, sort_prefix: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut cursor = None;
        loop {
            let page = self.store.query(pk, sort_prefix, cursor).await?;
            items.extend(page.items);
            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(items)
    }

    /// Records in partition `pk` whose sort key starts with `sort_prefix`,
    /// ordered by sort key.
    ///
    /// Only records of the kind the prefix denotes are returned, so comment
    /// votes (which share the `COMMENT#` prefix) never show up as comments.
    pub async fn query_children(&self, pk: &str, sort_prefix: &str) -> Result<Vec<Record>> {
        let wanted = classify_sort_key(sort_prefix);
        self.query_items(pk, sort_prefix)
            .await?
            .iter()
            .map(decode_record)
            .filter(|record| match (record, wanted) {
                (Ok(record), Some(kind)) => record.kind() == kind,
                _ => true,
            })
            .collect()
    }

    /// Every record of one kind across the table.
    pub async fn scan_kind(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let sort_key = kind.fixed_sort_key();
        let mut records = Vec::new();
        let mut cursor = None;
        loop {
            let page = self.store.scan(sort_key, cursor).await?;
            for item in &page.items {
                let record = decode_record(item)?;
                if record.kind() == kind {
                    records.push(record);
                }
            }
            match page.cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(records)
    }

    // ========================================================================
    // Posts
    // ========================================================================

    pub async fn create_post(&self, request: CreatePostRequest) -> Result<Post> {
        let post = request.into_post(Id::generate(), Utc::now())?;
        self.create(post_to_item(&post)).await?;
        tracing::debug!(post_id = %post.post_id, "Post stored");
        Ok(post)
    }

    /// Like [`get_post`](Self::get_post) but absence is `Ok(None)`.
    pub async fn find_post(&self, post_id: &Id) -> Result<Option<Post>> {
        let key = keys::post_key(post_id);
        match self.get(&key).await? {
            None => Ok(None),
            Some(record) => record
                .into_post()
                .map(Some)
                .ok_or_else(|| unexpected(RecordKind::Post, &key)),
        }
    }

    pub async fn get_post(&self, post_id: &Id) -> Result<Post> {
        self.find_post(post_id)
            .await?
            .ok_or_else(|| not_found(RecordKind::Post, post_id))
    }

    /// All posts in no particular order.
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self
            .scan_kind(RecordKind::Post)
            .await?
            .into_iter()
            .filter_map(Record::into_post)
            .collect())
    }

    async fn update_post(&self, post_id: &Id, fields: Item) -> Result<Post> {
        let key = keys::post_key(post_id);
        match self.update(&key, fields).await {
            Ok(record) => record
                .into_post()
                .ok_or_else(|| unexpected(RecordKind::Post, &key)),
            Err(RepositoryError::NotFound { .. }) => Err(not_found(RecordKind::Post, post_id)),
            Err(err) => Err(err),
        }
    }

    pub async fn replace_post(&self, post_id: &Id, request: ReplacePostRequest) -> Result<Post> {
        self.update_post(post_id, request.into_fields()?).await
    }

    pub async fn patch_post(&self, post_id: &Id, patch: PostPatch) -> Result<Post> {
        self.update_post(post_id, patch.into_fields()?).await
    }

    /// Deletes the post's metadata record only. Comments, votes and
    /// attachments stay reachable under the post's partition.
    pub async fn delete_post(&self, post_id: &Id) -> Result<()> {
        self.delete(&keys::post_key(post_id)).await?;
        Ok(())
    }

    /// Deletes the post and every record in its partition. Returns how many
    /// records were removed.
    ///
    /// Not atomic: a failure part-way leaves the remaining children in place,
    /// and calling again finishes the job.
    pub async fn delete_post_cascade(&self, post_id: &Id) -> Result<usize> {
        let pk = keys::post_pk(post_id);
        let mut items = self.query_items(&pk, "").await?;
        // Metadata goes last.
        items.sort_by_key(|item| item_key(item).map(|key| key.sk == METADATA_SK).unwrap_or(false));

        let mut removed = 0;
        for item in &items {
            let key = item_key(item)?;
            if self.store.delete(&key).await?.is_some() {
                removed += 1;
            }
        }
        tracing::debug!(post_id = %post_id, removed, "Post partition deleted");
        Ok(removed)
    }

    // ========================================================================
    // Comments
    // ========================================================================

    pub async fn create_comment(
        &self,
        post_id: &Id,
        request: CreateCommentRequest,
    ) -> Result<Comment> {
        self.get_post(post_id).await?;
        if let Some(parent_id) = &request.parent_comment_id {
            self.get_comment(post_id, parent_id).await?;
        }
        let comment = request.into_comment(post_id.clone(), Id::generate(), Utc::now())?;
        self.create(comment_to_item(&comment)).await?;
        tracing::debug!(post_id = %post_id, comment_id = %comment.comment_id, "Comment stored");
        Ok(comment)
    }

    pub async fn get_comment(&self, post_id: &Id, comment_id: &Id) -> Result<Comment> {
        let key = keys::comment_key(post_id, comment_id);
        self.get(&key)
            .await?
            .ok_or_else(|| not_found(RecordKind::Comment, comment_id))?
            .into_comment()
            .ok_or_else(|| unexpected(RecordKind::Comment, &key))
    }

    /// Comments of a post in sort-key order. Does not require the post to
    /// still exist.
    pub async fn list_comments(&self, post_id: &Id) -> Result<Vec<Comment>> {
        Ok(self
            .query_children(&keys::post_pk(post_id), keys::COMMENT_PREFIX)
            .await?
            .into_iter()
            .filter_map(Record::into_comment)
            .collect())
    }

    async fn update_comment(&self, post_id: &Id, comment_id: &Id, fields: Item) -> Result<Comment> {
        let key = keys::comment_key(post_id, comment_id);
        match self.update(&key, fields).await {
            Ok(record) => record
                .into_comment()
                .ok_or_else(|| unexpected(RecordKind::Comment, &key)),
            Err(RepositoryError::NotFound { .. }) => {
                Err(not_found(RecordKind::Comment, comment_id))
            }
            Err(err) => Err(err),
        }
    }

    pub async fn replace_comment(
        &self,
        post_id: &Id,
        comment_id: &Id,
        request: ReplaceCommentRequest,
    ) -> Result<Comment> {
        self.update_comment(post_id, comment_id, request.into_fields()?)
            .await
    }

    pub async fn patch_comment(
        &self,
        post_id: &Id,
        comment_id: &Id,
        patch: CommentPatch,
    ) -> Result<Comment> {
        self.update_comment(post_id, comment_id, patch.into_fields()?)
            .await
    }

    pub async fn delete_comment(&self, post_id: &Id, comment_id: &Id) -> Result<()> {
        self.delete(&keys::comment_key(post_id, comment_id)).await?;
        Ok(())
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    /// Registers a profile; fails with `AlreadyExists` for a known user id.
    pub async fn put_profile(&self, request: CreateProfileRequest) -> Result<UserProfile> {
        let profile = request.into_profile(Utc::now())?;
        match self.create(profile_to_item(&profile)).await {
            Ok(_) => Ok(profile),
            Err(RepositoryError::AlreadyExists { entity_type, .. }) => {
                Err(RepositoryError::AlreadyExists {
                    entity_type,
                    id: profile.user_id.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    pub async fn get_profile(&self, user_id: &Id) -> Result<UserProfile> {
        let key = keys::user_key(user_id);
        self.get(&key)
            .await?
            .ok_or_else(|| not_found(RecordKind::User, user_id))?
            .into_profile()
            .ok_or_else(|| unexpected(RecordKind::User, &key))
    }

    pub async fn patch_profile(&self, user_id: &Id, patch: ProfilePatch) -> Result<UserProfile> {
        let key = keys::user_key(user_id);
        match self.update(&key, patch.into_fields()?).await {
            Ok(record) => record
                .into_profile()
                .ok_or_else(|| unexpected(RecordKind::User, &key)),
            Err(RepositoryError::NotFound { .. }) => Err(not_found(RecordKind::User, user_id)),
            Err(err) => Err(err),
        }
    }

    // ========================================================================
    // Votes
    // ========================================================================

    pub async fn get_vote(&self, target: &VoteTarget, voter: &Id) -> Result<Option<Vote>> {
        Ok(self
            .get(&target.vote_key(voter))
            .await?
            .and_then(Record::into_vote))
    }

    /// Every live vote on one target.
    pub async fn list_votes(&self, target: &VoteTarget) -> Result<Vec<Vote>> {
        Ok(self
            .query_children(&keys::post_pk(target.post_id()), &target.votes_prefix())
            .await?
            .into_iter()
            .filter_map(Record::into_vote)
            .collect())
    }
}
