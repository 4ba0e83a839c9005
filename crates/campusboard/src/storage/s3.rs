//! S3 blob store for attachment bytes.

use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use campusboard_core::storage::{BlobStore, RepositoryError, Result};

/// Attachment bytes stored as objects in one S3 bucket.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Map an SDK error, treating throttling, 5xx, timeouts and connection
/// failures as a temporarily unavailable store.
fn map_s3_error<E: Debug>(err: SdkError<E>, key: &str) -> RepositoryError {
    match &err {
        SdkError::ServiceError(service_err) => match service_err.raw().status().as_u16() {
            429 | 500 | 502 | 503 | 504 => RepositoryError::StoreUnavailable(format!(
                "S3 unavailable for key '{key}'"
            )),
            status => RepositoryError::QueryFailed(format!(
                "S3 error for key '{key}' (HTTP {status}): {err:?}"
            )),
        },
        SdkError::TimeoutError(_) => {
            RepositoryError::StoreUnavailable(format!("S3 timeout for key '{key}'"))
        }
        SdkError::DispatchFailure(_) => {
            RepositoryError::StoreUnavailable(format!("S3 connection error for key '{key}'"))
        }
        _ => RepositoryError::QueryFailed(format!("S3 error for key '{key}': {err:?}")),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put_object(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| map_s3_error(e, key))?;

        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_s3_error(e, key))?;

        Ok(())
    }
}
