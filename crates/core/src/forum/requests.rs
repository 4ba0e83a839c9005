use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{AttrValue, Id, Item};

use super::error::ValidationError;
use super::operations::{validate_content, validate_filename, validate_title, validate_username};
use super::types::{Comment, Post, UserProfile, UserRole, VoteType};

// ============================================================================
// Profiles
// ============================================================================

/// Request payload for registering a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub user_id: Id,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

impl CreateProfileRequest {
    pub fn into_profile(self, now: DateTime<Utc>) -> Result<UserProfile, ValidationError> {
        validate_username(&self.username)?;
        if self.email.trim().is_empty() {
            return Err(ValidationError::Empty("email"));
        }
        Ok(UserProfile {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            role: self.role,
            student_id: self.student_id,
            is_verified: self.is_verified,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

impl ProfilePatch {
    /// Validates the patch and turns it into the attribute map to merge.
    pub fn into_fields(self) -> Result<Item, ValidationError> {
        let mut fields = Item::new();
        if let Some(username) = self.username {
            validate_username(&username)?;
            fields.insert("username".to_string(), username.into());
        }
        if let Some(email) = self.email {
            if email.trim().is_empty() {
                return Err(ValidationError::Empty("email"));
            }
            fields.insert("email".to_string(), email.into());
        }
        if let Some(role) = self.role {
            fields.insert("role".to_string(), role.as_str().into());
        }
        if let Some(student_id) = self.student_id {
            fields.insert("student_id".to_string(), student_id.into());
        }
        if let Some(is_verified) = self.is_verified {
            fields.insert("is_verified".to_string(), is_verified.into());
        }
        non_empty(fields)
    }
}

// ============================================================================
// Posts
// ============================================================================

/// Request payload for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub author_id: Id,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl CreatePostRequest {
    pub fn new(author_id: Id, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author_id,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            attachments: Vec::new(),
            is_anonymous: false,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Builds the post with zeroed counters.
    pub fn into_post(self, post_id: Id, now: DateTime<Utc>) -> Result<Post, ValidationError> {
        validate_title(&self.title)?;
        validate_content(&self.content)?;
        Ok(Post {
            post_id,
            author_id: self.author_id,
            title: self.title,
            content: self.content,
            tags: self.tags,
            attachments: self.attachments,
            is_anonymous: self.is_anonymous,
            upvotes: 0,
            downvotes: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Full replacement of a post's editable fields (PUT).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplacePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl ReplacePostRequest {
    pub fn into_fields(self) -> Result<Item, ValidationError> {
        validate_title(&self.title)?;
        validate_content(&self.content)?;
        let mut fields = Item::new();
        fields.insert("title".to_string(), self.title.into());
        fields.insert("content".to_string(), self.content.into());
        fields.insert("tags".to_string(), self.tags.into());
        fields.insert("attachments".to_string(), self.attachments.into());
        Ok(fields)
    }
}

/// Partial post update (PATCH).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<bool>,
}

impl PostPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn into_fields(self) -> Result<Item, ValidationError> {
        let mut fields = Item::new();
        if let Some(title) = self.title {
            validate_title(&title)?;
            fields.insert("title".to_string(), title.into());
        }
        if let Some(content) = self.content {
            validate_content(&content)?;
            fields.insert("content".to_string(), content.into());
        }
        if let Some(tags) = self.tags {
            fields.insert("tags".to_string(), tags.into());
        }
        if let Some(attachments) = self.attachments {
            fields.insert("attachments".to_string(), attachments.into());
        }
        if let Some(is_anonymous) = self.is_anonymous {
            fields.insert("is_anonymous".to_string(), is_anonymous.into());
        }
        non_empty(fields)
    }
}

// ============================================================================
// Comments
// ============================================================================

/// Request payload for commenting on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub author_id: Id,
    pub content: String,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<Id>,
}

impl CreateCommentRequest {
    pub fn new(author_id: Id, content: impl Into<String>) -> Self {
        Self {
            author_id,
            content: content.into(),
            is_anonymous: false,
            parent_comment_id: None,
        }
    }

    pub fn into_comment(
        self,
        post_id: Id,
        comment_id: Id,
        now: DateTime<Utc>,
    ) -> Result<Comment, ValidationError> {
        validate_content(&self.content)?;
        Ok(Comment {
            comment_id,
            post_id,
            author_id: self.author_id,
            content: self.content,
            is_anonymous: self.is_anonymous,
            parent_comment_id: self.parent_comment_id,
            upvotes: 0,
            downvotes: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Full replacement of a comment's editable fields (PUT).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceCommentRequest {
    pub content: String,
}

impl ReplaceCommentRequest {
    pub fn into_fields(self) -> Result<Item, ValidationError> {
        validate_content(&self.content)?;
        let mut fields = Item::new();
        fields.insert("content".to_string(), self.content.into());
        Ok(fields)
    }
}

/// Partial comment update (PATCH).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<bool>,
}

impl CommentPatch {
    pub fn into_fields(self) -> Result<Item, ValidationError> {
        let mut fields = Item::new();
        if let Some(content) = self.content {
            validate_content(&content)?;
            fields.insert("content".to_string(), content.into());
        }
        if let Some(is_anonymous) = self.is_anonymous {
            fields.insert("is_anonymous".to_string(), AttrValue::Bool(is_anonymous));
        }
        non_empty(fields)
    }
}

// ============================================================================
// Votes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub user_id: Id,
    pub vote_type: VoteType,
}

/// Retracting takes the type as a hint only; the stored vote decides the counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetractVoteRequest {
    pub user_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_type: Option<VoteType>,
}

// ============================================================================
// Attachments
// ============================================================================

/// Caller-supplied description of a file being bound to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentMetadata {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub size: u64,
    pub uploaded_by: Id,
    /// Where the bytes live; derived from the ids and filename when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_key: Option<String>,
}

impl AttachmentMetadata {
    pub fn new(filename: impl Into<String>, size: u64, uploaded_by: Id) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            size,
            uploaded_by,
            blob_key: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_filename(&self.filename)
    }
}

/// A file upload: metadata plus the bytes to put in the blob store.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub uploaded_by: Id,
}

fn non_empty(fields: Item) -> Result<Item, ValidationError> {
    if fields.is_empty() {
        Err(ValidationError::EmptyPatch)
    } else {
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> Id {
        Id::parse(raw).unwrap()
    }

    #[test]
    fn test_create_post_starts_with_zero_counters() {
        let now = Utc::now();
        let post = CreatePostRequest::new(id("u1"), "Exam schedule", "Finals start May 2")
            .with_tags(vec!["exams".to_string()])
            .into_post(id("p1"), now)
            .unwrap();
        assert_eq!(post.upvotes, 0);
        assert_eq!(post.downvotes, 0);
        assert_eq!(post.created_at, post.updated_at);
        assert_eq!(post.tags, vec!["exams".to_string()]);
    }

    #[test]
    fn test_create_post_rejects_blank_title() {
        let result = CreatePostRequest::new(id("u1"), " ", "body").into_post(id("p1"), Utc::now());
        assert_eq!(result, Err(ValidationError::Empty("title")));
    }

    #[test]
    fn test_post_patch_only_carries_set_fields() {
        let fields = PostPatch::new().with_title("New title").into_fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["title"], AttrValue::from("New title"));
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        assert_eq!(
            PostPatch::new().into_fields(),
            Err(ValidationError::EmptyPatch)
        );
        assert_eq!(
            CommentPatch::default().into_fields(),
            Err(ValidationError::EmptyPatch)
        );
        assert_eq!(
            ProfilePatch::default().into_fields(),
            Err(ValidationError::EmptyPatch)
        );
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result: Result<PostPatch, _> = serde_json::from_str(r#"{"upvotes": 100}"#);
        assert!(result.is_err());
        let result: Result<CommentPatch, _> = serde_json::from_str(r#"{"post_id": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_post_sets_every_editable_field() {
        let fields = ReplacePostRequest {
            title: "t".to_string(),
            content: "c".to_string(),
            tags: vec![],
            attachments: vec![],
        }
        .into_fields()
        .unwrap();
        let names: Vec<_> = fields.keys().cloned().collect();
        assert_eq!(names, vec!["attachments", "content", "tags", "title"]);
    }

    #[test]
    fn test_profile_patch_role_is_stored_lowercase() {
        let fields = ProfilePatch {
            role: Some(UserRole::Moderator),
            ..Default::default()
        }
        .into_fields()
        .unwrap();
        assert_eq!(fields["role"], AttrValue::from("moderator"));
    }
}
