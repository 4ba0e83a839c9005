pub mod attachments;
pub mod comments;
pub mod error;
pub mod feeds;
pub mod health;
pub mod posts;
pub mod users;
pub mod votes;

pub use error::AppError;
