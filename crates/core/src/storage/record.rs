//! Typed decode of polymorphic table records.
//!
//! Every read path decodes through [`decode_record`] right after the store
//! returns, so nothing downstream handles an untyped [`Item`].

use serde::Serialize;

use crate::forum::{Attachment, Comment, Post, UserProfile, Vote};

use super::conversions::{
    get_string, item_to_attachment, item_to_comment, item_to_post, item_to_profile, item_to_vote,
    ATTR_SK,
};
use super::error::RepositoryError;
use super::keys::{classify_sort_key, RecordKind};
use super::types::Item;

/// One decoded record of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Record {
    User(UserProfile),
    Post(Post),
    Comment(Comment),
    PostVote(Vote),
    CommentVote(Vote),
    Attachment(Attachment),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::User(_) => RecordKind::User,
            Record::Post(_) => RecordKind::Post,
            Record::Comment(_) => RecordKind::Comment,
            Record::PostVote(_) => RecordKind::PostVote,
            Record::CommentVote(_) => RecordKind::CommentVote,
            Record::Attachment(_) => RecordKind::Attachment,
        }
    }

    pub fn into_profile(self) -> Option<UserProfile> {
        match self {
            Record::User(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn into_post(self) -> Option<Post> {
        match self {
            Record::Post(post) => Some(post),
            _ => None,
        }
    }

    pub fn into_comment(self) -> Option<Comment> {
        match self {
            Record::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn into_vote(self) -> Option<Vote> {
        match self {
            Record::PostVote(vote) | Record::CommentVote(vote) => Some(vote),
            _ => None,
        }
    }

    pub fn into_attachment(self) -> Option<Attachment> {
        match self {
            Record::Attachment(attachment) => Some(attachment),
            _ => None,
        }
    }
}

/// Decodes an item by dispatching on its sort key.
pub fn decode_record(item: &Item) -> Result<Record, RepositoryError> {
    let sk = get_string(item, ATTR_SK)?;
    let kind = classify_sort_key(&sk)
        .ok_or_else(|| RepositoryError::Serialization(format!("Unrecognized sort key: {sk}")))?;

    let record = match kind {
        RecordKind::User => Record::User(item_to_profile(item)?),
        RecordKind::Post => Record::Post(item_to_post(item)?),
        RecordKind::Comment => Record::Comment(item_to_comment(item)?),
        RecordKind::PostVote => Record::PostVote(item_to_vote(item)?),
        RecordKind::CommentVote => Record::CommentVote(item_to_vote(item)?),
        RecordKind::Attachment => Record::Attachment(item_to_attachment(item)?),
    };
    Ok(record)
}
