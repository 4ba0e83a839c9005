mod error;
pub mod feeds;
pub mod ledger;
mod operations;
mod requests;
mod types;

pub use error::ValidationError;
pub use ledger::{
    drift, plan_cast, plan_retract, tally, CounterDeltas, Expect, VotePlan, VoteState, VoteTally,
    VoteWrite,
};
pub use operations::{
    attachment_blob_key, matches_search, resolve_content_type, validate_content,
    validate_filename, validate_title, validate_username, DEFAULT_CONTENT_TYPE,
};
pub use requests::{
    AttachmentMetadata, AttachmentUpload, CommentPatch, CreateCommentRequest, CreatePostRequest,
    CreateProfileRequest, PostPatch, ProfilePatch, ReplaceCommentRequest, ReplacePostRequest,
    RetractVoteRequest, VoteRequest,
};
pub use types::{
    Attachment, Comment, Post, UserProfile, UserRole, Vote, VoteTarget, VoteType,
};
