//! Storage backend implementations.
//!
//! This module provides concrete implementations of the store traits defined
//! in `campusboard_core::storage`. The backend is selected at compile time via
//! feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): maps behind `tokio::sync::RwLock`, nothing persisted
//! - `dynamodb`: AWS DynamoDB for records plus S3 for attachment bytes
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time.
//!
//! # Examples
//!
//! Build with the in-memory store (default):
//! ```bash
//! cargo build -p campusboard
//! ```
//!
//! Build with DynamoDB:
//! ```bash
//! cargo build -p campusboard --no-default-features --features dynamodb
//! ```

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "inmemory", feature = "dynamodb"))]
compile_error!(
    "Features 'inmemory' and 'dynamodb' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "dynamodb")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'dynamodb' feature. \
    Example: cargo build -p campusboard --features dynamodb"
);

#[cfg(any(test, feature = "inmemory"))]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "dynamodb")]
pub mod s3;

#[cfg(any(test, feature = "inmemory"))]
pub use inmemory::{InMemoryBlobStore, InMemoryStore};

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;

#[cfg(feature = "dynamodb")]
pub use s3::S3BlobStore;
