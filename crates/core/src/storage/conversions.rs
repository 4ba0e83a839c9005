//! Attribute conversion functions.
//!
//! Pure functions for converting between stored [`Item`]s and domain types.
//! Every item carries its key attributes, an `entity_type` tag and the two
//! timestamps, alongside the entity's own fields.

use chrono::{DateTime, Utc};

use crate::forum::{Attachment, Comment, Post, UserProfile, UserRole, Vote, VoteType};

use super::error::RepositoryError;
use super::keys::{self, Id, ItemKey, RecordKind};
use super::types::{AttrValue, Item};

// ============================================================================
// Attribute names
// ============================================================================

pub const ATTR_PK: &str = "PK";
pub const ATTR_SK: &str = "SK";
pub const ATTR_ENTITY_TYPE: &str = "entity_type";
pub const ATTR_CREATED_AT: &str = "created_at";
pub const ATTR_UPDATED_AT: &str = "updated_at";
pub const ATTR_VOTE_TYPE: &str = "vote_type";

/// Formats a timestamp the way every record stores it.
pub fn timestamp(at: DateTime<Utc>) -> AttrValue {
    AttrValue::S(at.to_rfc3339())
}

/// Reads the key attributes of an item.
pub fn item_key(item: &Item) -> Result<ItemKey, RepositoryError> {
    Ok(ItemKey::new(
        get_string(item, ATTR_PK)?,
        get_string(item, ATTR_SK)?,
    ))
}

fn base_item(
    key: ItemKey,
    kind: RecordKind,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Item {
    let mut item = Item::new();
    item.insert(ATTR_PK.to_string(), AttrValue::S(key.pk));
    item.insert(ATTR_SK.to_string(), AttrValue::S(key.sk));
    item.insert(ATTR_ENTITY_TYPE.to_string(), kind.as_str().into());
    item.insert(ATTR_CREATED_AT.to_string(), timestamp(created_at));
    item.insert(ATTR_UPDATED_AT.to_string(), timestamp(updated_at));
    item
}

// ============================================================================
// Profile conversions
// ============================================================================

pub fn profile_to_item(profile: &UserProfile) -> Item {
    let mut item = base_item(
        keys::user_key(&profile.user_id),
        RecordKind::User,
        profile.created_at,
        profile.updated_at,
    );
    item.insert("user_id".to_string(), profile.user_id.as_str().into());
    item.insert("username".to_string(), profile.username.as_str().into());
    item.insert("email".to_string(), profile.email.as_str().into());
    item.insert("role".to_string(), profile.role.as_str().into());
    if let Some(student_id) = &profile.student_id {
        item.insert("student_id".to_string(), student_id.as_str().into());
    }
    item.insert("is_verified".to_string(), profile.is_verified.into());
    item
}

pub fn item_to_profile(item: &Item) -> Result<UserProfile, RepositoryError> {
    let role = get_string(item, "role")?;
    Ok(UserProfile {
        user_id: get_id(item, "user_id")?,
        username: get_string(item, "username")?,
        email: get_string(item, "email")?,
        role: UserRole::parse(&role)
            .ok_or_else(|| RepositoryError::Serialization(format!("Unknown role: {role}")))?,
        student_id: get_optional_string(item, "student_id"),
        is_verified: get_bool(item, "is_verified")?,
        created_at: get_datetime(item, ATTR_CREATED_AT)?,
        updated_at: get_datetime(item, ATTR_UPDATED_AT)?,
    })
}

// ============================================================================
// Post conversions
// ============================================================================

pub fn post_to_item(post: &Post) -> Item {
    let mut item = base_item(
        keys::post_key(&post.post_id),
        RecordKind::Post,
        post.created_at,
        post.updated_at,
    );
    item.insert("post_id".to_string(), post.post_id.as_str().into());
    item.insert("author_id".to_string(), post.author_id.as_str().into());
    item.insert("title".to_string(), post.title.as_str().into());
    item.insert("content".to_string(), post.content.as_str().into());
    item.insert("tags".to_string(), post.tags.clone().into());
    item.insert("attachments".to_string(), post.attachments.clone().into());
    item.insert("is_anonymous".to_string(), post.is_anonymous.into());
    item.insert("upvotes".to_string(), post.upvotes.into());
    item.insert("downvotes".to_string(), post.downvotes.into());
    item
}

pub fn item_to_post(item: &Item) -> Result<Post, RepositoryError> {
    Ok(Post {
        post_id: get_id(item, "post_id")?,
        author_id: get_id(item, "author_id")?,
        title: get_string(item, "title")?,
        content: get_string(item, "content")?,
        tags: get_str_list(item, "tags"),
        attachments: get_str_list(item, "attachments"),
        is_anonymous: get_bool(item, "is_anonymous")?,
        upvotes: get_counter(item, "upvotes"),
        downvotes: get_counter(item, "downvotes"),
        created_at: get_datetime(item, ATTR_CREATED_AT)?,
        updated_at: get_datetime(item, ATTR_UPDATED_AT)?,
    })
}

// ============================================================================
// Comment conversions
// ============================================================================

pub fn comment_to_item(comment: &Comment) -> Item {
    let mut item = base_item(
        keys::comment_key(&comment.post_id, &comment.comment_id),
        RecordKind::Comment,
        comment.created_at,
        comment.updated_at,
    );
    item.insert("comment_id".to_string(), comment.comment_id.as_str().into());
    item.insert("post_id".to_string(), comment.post_id.as_str().into());
    item.insert("author_id".to_string(), comment.author_id.as_str().into());
    item.insert("content".to_string(), comment.content.as_str().into());
    item.insert("is_anonymous".to_string(), comment.is_anonymous.into());
    if let Some(parent) = &comment.parent_comment_id {
        item.insert("parent_comment_id".to_string(), parent.as_str().into());
    }
    item.insert("upvotes".to_string(), comment.upvotes.into());
    item.insert("downvotes".to_string(), comment.downvotes.into());
    item
}

pub fn item_to_comment(item: &Item) -> Result<Comment, RepositoryError> {
    Ok(Comment {
        comment_id: get_id(item, "comment_id")?,
        post_id: get_id(item, "post_id")?,
        author_id: get_id(item, "author_id")?,
        content: get_string(item, "content")?,
        is_anonymous: get_bool(item, "is_anonymous")?,
        parent_comment_id: get_optional_id(item, "parent_comment_id")?,
        upvotes: get_counter(item, "upvotes"),
        downvotes: get_counter(item, "downvotes"),
        created_at: get_datetime(item, ATTR_CREATED_AT)?,
        updated_at: get_datetime(item, ATTR_UPDATED_AT)?,
    })
}

// ============================================================================
// Vote conversions
// ============================================================================

pub fn vote_to_item(vote: &Vote) -> Item {
    let target = vote.target();
    let kind = match &vote.comment_id {
        None => RecordKind::PostVote,
        Some(_) => RecordKind::CommentVote,
    };
    let mut item = base_item(
        target.vote_key(&vote.user_id),
        kind,
        vote.created_at,
        vote.updated_at,
    );
    item.insert("post_id".to_string(), vote.post_id.as_str().into());
    if let Some(comment_id) = &vote.comment_id {
        item.insert("comment_id".to_string(), comment_id.as_str().into());
    }
    item.insert("user_id".to_string(), vote.user_id.as_str().into());
    item.insert(ATTR_VOTE_TYPE.to_string(), vote.vote_type.as_str().into());
    item
}

pub fn item_to_vote(item: &Item) -> Result<Vote, RepositoryError> {
    Ok(Vote {
        post_id: get_id(item, "post_id")?,
        comment_id: get_optional_id(item, "comment_id")?,
        user_id: get_id(item, "user_id")?,
        vote_type: get_vote_type(item)?,
        created_at: get_datetime(item, ATTR_CREATED_AT)?,
        updated_at: get_datetime(item, ATTR_UPDATED_AT)?,
    })
}

/// Reads the `vote_type` attribute of a vote item.
pub fn get_vote_type(item: &Item) -> Result<VoteType, RepositoryError> {
    let raw = get_string(item, ATTR_VOTE_TYPE)?;
    VoteType::parse(&raw)
        .ok_or_else(|| RepositoryError::Serialization(format!("Unknown vote type: {raw}")))
}

// ============================================================================
// Attachment conversions
// ============================================================================

pub fn attachment_to_item(attachment: &Attachment) -> Item {
    let mut item = base_item(
        keys::attachment_key(&attachment.post_id, &attachment.file_id),
        RecordKind::Attachment,
        attachment.created_at,
        attachment.updated_at,
    );
    item.insert("file_id".to_string(), attachment.file_id.as_str().into());
    item.insert("post_id".to_string(), attachment.post_id.as_str().into());
    item.insert("filename".to_string(), attachment.filename.as_str().into());
    item.insert("blob_key".to_string(), attachment.blob_key.as_str().into());
    item.insert(
        "content_type".to_string(),
        attachment.content_type.as_str().into(),
    );
    item.insert(
        "size".to_string(),
        AttrValue::N(i64::try_from(attachment.size).unwrap_or(i64::MAX)),
    );
    item.insert(
        "uploaded_by".to_string(),
        attachment.uploaded_by.as_str().into(),
    );
    item
}

pub fn item_to_attachment(item: &Item) -> Result<Attachment, RepositoryError> {
    let size = get_i64(item, "size")?;
    Ok(Attachment {
        file_id: get_id(item, "file_id")?,
        post_id: get_id(item, "post_id")?,
        filename: get_string(item, "filename")?,
        blob_key: get_string(item, "blob_key")?,
        content_type: get_string(item, "content_type")?,
        size: u64::try_from(size)
            .map_err(|_| RepositoryError::Serialization(format!("Negative size: {size}")))?,
        uploaded_by: get_id(item, "uploaded_by")?,
        created_at: get_datetime(item, ATTR_CREATED_AT)?,
        updated_at: get_datetime(item, ATTR_UPDATED_AT)?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn missing(key: &str) -> RepositoryError {
    RepositoryError::Serialization(format!("Missing or invalid field: {key}"))
}

/// Get a required string attribute.
pub fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(AttrValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(key))
}

/// Get an optional string attribute.
fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key).and_then(AttrValue::as_str).map(str::to_string)
}

fn get_id(item: &Item, key: &str) -> Result<Id, RepositoryError> {
    let raw = get_string(item, key)?;
    Id::parse(raw).map_err(|e| RepositoryError::Serialization(format!("Invalid id {key}: {e}")))
}

fn get_optional_id(item: &Item, key: &str) -> Result<Option<Id>, RepositoryError> {
    get_optional_string(item, key)
        .map(|raw| {
            Id::parse(raw)
                .map_err(|e| RepositoryError::Serialization(format!("Invalid id {key}: {e}")))
        })
        .transpose()
}

fn get_i64(item: &Item, key: &str) -> Result<i64, RepositoryError> {
    item.get(key)
        .and_then(AttrValue::as_i64)
        .ok_or_else(|| missing(key))
}

/// Counters that were never touched read as zero.
pub fn get_counter(item: &Item, key: &str) -> i64 {
    item.get(key).and_then(AttrValue::as_i64).unwrap_or(0)
}

fn get_bool(item: &Item, key: &str) -> Result<bool, RepositoryError> {
    item.get(key)
        .and_then(AttrValue::as_bool)
        .ok_or_else(|| missing(key))
}

fn get_str_list(item: &Item, key: &str) -> Vec<String> {
    item.get(key)
        .and_then(AttrValue::as_str_list)
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Serialization(format!("Invalid datetime {key}: {e}")))
}
