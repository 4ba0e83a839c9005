//! Application state.
//!
//! This module defines the shared handle passed to every request handler. It
//! owns the forum services and the configuration they were built from; the
//! storage backend behind them is chosen at compile time via feature flags.

use std::sync::Arc;

use campusboard_core::storage::{BlobStore, ItemStore};

use crate::config::Config;
use crate::forum::Forum;

/// Shared application state.
///
/// Cloned for each request handler. Every field is an `Arc` or a handle of
/// `Arc`s, so clones share the same store clients.
#[derive(Clone)]
pub struct AppState {
    pub forum: Forum,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates an AppState over the given stores and configuration.
    pub fn build(store: Arc<dyn ItemStore>, blobs: Arc<dyn BlobStore>, config: Config) -> Self {
        Self {
            forum: Forum::new(store, blobs, &config),
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Backend-specific constructors
// ============================================================================

#[cfg(feature = "inmemory")]
mod inmemory_backend {
    use super::*;
    use crate::storage::{InMemoryBlobStore, InMemoryStore};

    impl AppState {
        /// Creates AppState with in-memory storage.
        /// Nothing survives a restart; useful for development and tests.
        pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
            tracing::info!("Using in-memory storage");
            Ok(Self::build(
                Arc::new(InMemoryStore::new()),
                Arc::new(InMemoryBlobStore::new()),
                config,
            ))
        }
    }
}

#[cfg(feature = "dynamodb")]
mod dynamodb_backend {
    use super::*;
    use crate::storage::{DynamoDbStore, S3BlobStore};

    impl AppState {
        /// Creates AppState with DynamoDB records and S3 attachment bytes.
        pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(endpoint) = &config.aws_endpoint_url {
                loader = loader.endpoint_url(endpoint);
            }
            let aws_config = loader.load().await;

            let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws_config);
            let store = DynamoDbStore::new(dynamodb_client, config.table_name.clone());

            // Local emulators serve buckets by path rather than virtual host.
            let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(config.aws_endpoint_url.is_some())
                .build();
            let blobs = S3BlobStore::new(
                aws_sdk_s3::Client::from_conf(s3_config),
                config.s3_bucket.clone(),
            );

            tracing::info!(
                table = store.table_name(),
                bucket = blobs.bucket(),
                endpoint = config.aws_endpoint_url.as_deref().unwrap_or("aws"),
                "Using DynamoDB storage"
            );

            Ok(Self::build(Arc::new(store), Arc::new(blobs), config))
        }
    }
}

// ============================================================================
// Test support
// ============================================================================

#[cfg(test)]
mod test_support {
    use super::*;
    use crate::storage::{InMemoryBlobStore, InMemoryStore};

    impl AppState {
        /// In-memory state with a small page size, regardless of the backend
        /// feature the binary was built with.
        pub fn for_tests(config: Config) -> Self {
            Self::build(
                Arc::new(InMemoryStore::with_page_size(3)),
                Arc::new(InMemoryBlobStore::new()),
                config,
            )
        }
    }

    impl Default for AppState {
        fn default() -> Self {
            Self::for_tests(Config::default())
        }
    }
}
