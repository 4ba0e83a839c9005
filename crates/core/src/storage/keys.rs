//! Single-table key codec.
//!
//! Pure functions mapping logical entity references onto the `(PK, SK)` pair
//! used by the store, and back again. Every child of a post (comments, votes,
//! attachments) lives under the post's partition so that "all children of a
//! post" is one prefix range query.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Key prefixes
// ============================================================================

pub const USER_PREFIX: &str = "USER#";
pub const POST_PREFIX: &str = "POST#";
pub const COMMENT_PREFIX: &str = "COMMENT#";
pub const VOTE_PREFIX: &str = "VOTE#USER#";
pub const FILE_PREFIX: &str = "FILE#";

/// Sort key of the single profile record in a user partition.
pub const PROFILE_SK: &str = "PROFILE";

/// Sort key of the metadata record in a post partition.
pub const METADATA_SK: &str = "METADATA";

/// Separator between a comment id and its vote suffix.
const COMMENT_VOTE_INFIX: &str = "#VOTE#USER#";

pub const KEY_DELIMITER: char = '#';

/// Longest identifier accepted by [`Id::parse`], in bytes.
pub const MAX_ID_LEN: usize = 128;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("malformed id: {0:?}")]
    MalformedId(String),
    #[error("unrecognized key: PK={pk:?} SK={sk:?}")]
    UnrecognizedKey { pk: String, sk: String },
}

// ============================================================================
// Identifiers
// ============================================================================

/// A validated entity identifier.
///
/// Ids never contain the key delimiter, which is what makes every encoded key
/// decodable and keeps distinct entities on distinct key pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Id(String);

impl Id {
    pub fn parse(raw: impl Into<String>) -> Result<Self, KeyError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw.len() <= MAX_ID_LEN
            && !raw.contains(KEY_DELIMITER)
            && raw.trim() == raw;
        if valid {
            Ok(Self(raw))
        } else {
            Err(KeyError::MalformedId(raw))
        }
    }

    /// Generates a fresh random (UUID v4) identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Id {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl FromStr for Id {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Item keys
// ============================================================================

/// The `(PK, SK)` pair identifying one record in the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.pk, self.sk)
    }
}

/// Pattern: `USER#<user_id>`
pub fn user_pk(user_id: &Id) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// Pattern: `USER#<user_id>` / `PROFILE`
pub fn user_key(user_id: &Id) -> ItemKey {
    ItemKey::new(user_pk(user_id), PROFILE_SK)
}

/// Pattern: `POST#<post_id>`
pub fn post_pk(post_id: &Id) -> String {
    format!("{POST_PREFIX}{post_id}")
}

/// Pattern: `POST#<post_id>` / `METADATA`
pub fn post_key(post_id: &Id) -> ItemKey {
    ItemKey::new(post_pk(post_id), METADATA_SK)
}

/// Pattern: `COMMENT#<comment_id>`
pub fn comment_sk(comment_id: &Id) -> String {
    format!("{COMMENT_PREFIX}{comment_id}")
}

pub fn comment_key(post_id: &Id, comment_id: &Id) -> ItemKey {
    ItemKey::new(post_pk(post_id), comment_sk(comment_id))
}

/// Pattern: `VOTE#USER#<user_id>`
pub fn post_vote_sk(user_id: &Id) -> String {
    format!("{VOTE_PREFIX}{user_id}")
}

pub fn post_vote_key(post_id: &Id, user_id: &Id) -> ItemKey {
    ItemKey::new(post_pk(post_id), post_vote_sk(user_id))
}

/// Pattern: `COMMENT#<comment_id>#VOTE#USER#<user_id>`
pub fn comment_vote_sk(comment_id: &Id, user_id: &Id) -> String {
    format!("{}{user_id}", comment_votes_prefix(comment_id))
}

pub fn comment_vote_key(post_id: &Id, comment_id: &Id, user_id: &Id) -> ItemKey {
    ItemKey::new(post_pk(post_id), comment_vote_sk(comment_id, user_id))
}

/// Sort-key prefix shared by every vote cast on one comment.
///
/// Pattern: `COMMENT#<comment_id>#VOTE#USER#`
pub fn comment_votes_prefix(comment_id: &Id) -> String {
    format!("{COMMENT_PREFIX}{comment_id}{COMMENT_VOTE_INFIX}")
}

/// Pattern: `FILE#<file_id>`
pub fn attachment_sk(file_id: &Id) -> String {
    format!("{FILE_PREFIX}{file_id}")
}

pub fn attachment_key(post_id: &Id, file_id: &Id) -> ItemKey {
    ItemKey::new(post_pk(post_id), attachment_sk(file_id))
}

// ============================================================================
// Classification
// ============================================================================

/// The entity kind a record (or a sort-key prefix) denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Post,
    Comment,
    PostVote,
    CommentVote,
    Attachment,
}

impl RecordKind {
    /// Value stored in the `entity_type` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Post => "POST",
            Self::Comment => "COMMENT",
            Self::PostVote => "POST_VOTE",
            Self::CommentVote => "COMMENT_VOTE",
            Self::Attachment => "ATTACHMENT",
        }
    }

    /// Human-readable name used in error messages.
    pub fn entity_name(self) -> &'static str {
        match self {
            Self::User => "UserProfile",
            Self::Post => "Post",
            Self::Comment => "Comment",
            Self::PostVote | Self::CommentVote => "Vote",
            Self::Attachment => "Attachment",
        }
    }

    /// The singleton sort key for kinds that have one.
    pub fn fixed_sort_key(self) -> Option<&'static str> {
        match self {
            Self::User => Some(PROFILE_SK),
            Self::Post => Some(METADATA_SK),
            _ => None,
        }
    }
}

/// Classifies a sort key, or a sort-key prefix, by the entity kind it denotes.
///
/// Comment votes are checked before plain comments since both start with
/// `COMMENT#`.
pub fn classify_sort_key(sk: &str) -> Option<RecordKind> {
    if sk == PROFILE_SK {
        return Some(RecordKind::User);
    }
    if sk == METADATA_SK {
        return Some(RecordKind::Post);
    }
    if sk.starts_with(VOTE_PREFIX) {
        return Some(RecordKind::PostVote);
    }
    if sk.starts_with(FILE_PREFIX) {
        return Some(RecordKind::Attachment);
    }
    let rest = sk.strip_prefix(COMMENT_PREFIX)?;
    if rest.contains(COMMENT_VOTE_INFIX) {
        Some(RecordKind::CommentVote)
    } else {
        Some(RecordKind::Comment)
    }
}

// ============================================================================
// Logical references
// ============================================================================

/// A logical reference to one record in the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    User {
        user_id: Id,
    },
    Post {
        post_id: Id,
    },
    Comment {
        post_id: Id,
        comment_id: Id,
    },
    PostVote {
        post_id: Id,
        user_id: Id,
    },
    CommentVote {
        post_id: Id,
        comment_id: Id,
        user_id: Id,
    },
    Attachment {
        post_id: Id,
        file_id: Id,
    },
}

impl EntityRef {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::User { .. } => RecordKind::User,
            Self::Post { .. } => RecordKind::Post,
            Self::Comment { .. } => RecordKind::Comment,
            Self::PostVote { .. } => RecordKind::PostVote,
            Self::CommentVote { .. } => RecordKind::CommentVote,
            Self::Attachment { .. } => RecordKind::Attachment,
        }
    }
}

pub fn encode_key(entity: &EntityRef) -> ItemKey {
    match entity {
        EntityRef::User { user_id } => user_key(user_id),
        EntityRef::Post { post_id } => post_key(post_id),
        EntityRef::Comment {
            post_id,
            comment_id,
        } => comment_key(post_id, comment_id),
        EntityRef::PostVote { post_id, user_id } => post_vote_key(post_id, user_id),
        EntityRef::CommentVote {
            post_id,
            comment_id,
            user_id,
        } => comment_vote_key(post_id, comment_id, user_id),
        EntityRef::Attachment { post_id, file_id } => attachment_key(post_id, file_id),
    }
}

/// Inverse of [`encode_key`].
pub fn decode_key(pk: &str, sk: &str) -> Result<EntityRef, KeyError> {
    let unrecognized = || KeyError::UnrecognizedKey {
        pk: pk.to_string(),
        sk: sk.to_string(),
    };

    if let Some(user_id) = pk.strip_prefix(USER_PREFIX) {
        if sk != PROFILE_SK {
            return Err(unrecognized());
        }
        return Ok(EntityRef::User {
            user_id: Id::parse(user_id)?,
        });
    }

    let post_id = Id::parse(pk.strip_prefix(POST_PREFIX).ok_or_else(unrecognized)?)?;

    if sk == METADATA_SK {
        return Ok(EntityRef::Post { post_id });
    }
    if let Some(user_id) = sk.strip_prefix(VOTE_PREFIX) {
        return Ok(EntityRef::PostVote {
            post_id,
            user_id: Id::parse(user_id)?,
        });
    }
    if let Some(file_id) = sk.strip_prefix(FILE_PREFIX) {
        return Ok(EntityRef::Attachment {
            post_id,
            file_id: Id::parse(file_id)?,
        });
    }
    if let Some(rest) = sk.strip_prefix(COMMENT_PREFIX) {
        return match rest.split_once(COMMENT_VOTE_INFIX) {
            Some((comment_id, user_id)) => Ok(EntityRef::CommentVote {
                post_id,
                comment_id: Id::parse(comment_id)?,
                user_id: Id::parse(user_id)?,
            }),
            None => Ok(EntityRef::Comment {
                post_id,
                comment_id: Id::parse(rest)?,
            }),
        };
    }

    Err(unrecognized())
}
