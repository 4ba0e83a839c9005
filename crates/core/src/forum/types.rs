use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::keys::{self, Id, ItemKey};

/// Role a forum member holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Faculty,
    Moderator,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Faculty => "faculty",
            UserRole::Moderator => "moderator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "student" => Some(UserRole::Student),
            "faculty" => Some(UserRole::Faculty),
            "moderator" => Some(UserRole::Moderator),
            _ => None,
        }
    }
}

/// A member's profile. Identity itself is owned by the external auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Id,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub student_id: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A forum post. `upvotes` and `downvotes` are derived counters kept by the vote ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: Id,
    pub author_id: Id,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// File ids the author referenced when writing the post.
    pub attachments: Vec<String>,
    pub is_anonymous: bool,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Total number of votes, the trending sort key.
    pub fn activity(&self) -> i64 {
        self.upvotes + self.downvotes
    }
}

/// A comment, stored in its post's partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: Id,
    pub post_id: Id,
    pub author_id: Id,
    pub content: String,
    pub is_anonymous: bool,
    pub parent_comment_id: Option<Id>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteType::Up => "up",
            VoteType::Down => "down",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(VoteType::Up),
            "down" => Some(VoteType::Down),
            _ => None,
        }
    }

    /// Name of the counter attribute this vote type drives.
    pub fn counter_attribute(self) -> &'static str {
        match self {
            VoteType::Up => "upvotes",
            VoteType::Down => "downvotes",
        }
    }
}

/// What a vote is cast on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VoteTarget {
    Post { post_id: Id },
    Comment { post_id: Id, comment_id: Id },
}

impl VoteTarget {
    pub fn post_id(&self) -> &Id {
        match self {
            VoteTarget::Post { post_id } | VoteTarget::Comment { post_id, .. } => post_id,
        }
    }

    pub fn comment_id(&self) -> Option<&Id> {
        match self {
            VoteTarget::Post { .. } => None,
            VoteTarget::Comment { comment_id, .. } => Some(comment_id),
        }
    }

    /// Key of the record holding this target's counters.
    pub fn counter_key(&self) -> ItemKey {
        match self {
            VoteTarget::Post { post_id } => keys::post_key(post_id),
            VoteTarget::Comment {
                post_id,
                comment_id,
            } => keys::comment_key(post_id, comment_id),
        }
    }

    /// Key of the vote record `voter` holds on this target.
    pub fn vote_key(&self, voter: &Id) -> ItemKey {
        match self {
            VoteTarget::Post { post_id } => keys::post_vote_key(post_id, voter),
            VoteTarget::Comment {
                post_id,
                comment_id,
            } => keys::comment_vote_key(post_id, comment_id, voter),
        }
    }

    /// Sort-key prefix under which every vote on this target lives.
    pub fn votes_prefix(&self) -> String {
        match self {
            VoteTarget::Post { .. } => keys::VOTE_PREFIX.to_string(),
            VoteTarget::Comment { comment_id, .. } => keys::comment_votes_prefix(comment_id),
        }
    }

    pub fn entity_name(&self) -> &'static str {
        match self {
            VoteTarget::Post { .. } => "Post",
            VoteTarget::Comment { .. } => "Comment",
        }
    }
}

impl std::fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteTarget::Post { post_id } => write!(f, "post {post_id}"),
            VoteTarget::Comment {
                post_id,
                comment_id,
            } => write!(f, "comment {comment_id} on post {post_id}"),
        }
    }
}

/// One voter's vote on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub post_id: Id,
    pub comment_id: Option<Id>,
    pub user_id: Id,
    pub vote_type: VoteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vote {
    pub fn target(&self) -> VoteTarget {
        match &self.comment_id {
            None => VoteTarget::Post {
                post_id: self.post_id.clone(),
            },
            Some(comment_id) => VoteTarget::Comment {
                post_id: self.post_id.clone(),
                comment_id: comment_id.clone(),
            },
        }
    }
}

/// Metadata for a file bound to a post. The bytes live in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_id: Id,
    pub post_id: Id,
    pub filename: String,
    pub blob_key: String,
    pub content_type: String,
    pub size: u64,
    pub uploaded_by: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> Id {
        Id::parse(raw).unwrap()
    }

    #[test]
    fn test_vote_target_keys() {
        let post = VoteTarget::Post { post_id: id("p1") };
        assert_eq!(post.counter_key(), ItemKey::new("POST#p1", "METADATA"));
        assert_eq!(post.vote_key(&id("u1")), ItemKey::new("POST#p1", "VOTE#USER#u1"));
        assert_eq!(post.votes_prefix(), "VOTE#USER#");

        let comment = VoteTarget::Comment {
            post_id: id("p1"),
            comment_id: id("c1"),
        };
        assert_eq!(comment.counter_key(), ItemKey::new("POST#p1", "COMMENT#c1"));
        assert_eq!(
            comment.vote_key(&id("u1")),
            ItemKey::new("POST#p1", "COMMENT#c1#VOTE#USER#u1")
        );
        assert_eq!(comment.votes_prefix(), "COMMENT#c1#VOTE#USER#");
    }

    #[test]
    fn test_vote_type_serde() {
        assert_eq!(serde_json::to_string(&VoteType::Up).unwrap(), "\"up\"");
        let parsed: VoteType = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(parsed, VoteType::Down);
        assert_eq!(VoteType::parse("sideways"), None);
    }

    #[test]
    fn test_user_role_parse() {
        assert_eq!(UserRole::parse("Faculty"), Some(UserRole::Faculty));
        assert_eq!(UserRole::parse("admin"), None);
        assert_eq!(UserRole::default(), UserRole::Student);
    }
}
