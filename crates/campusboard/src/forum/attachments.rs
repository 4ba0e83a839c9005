//! Attachment metadata records bound to posts, with the bytes held in a
//! [`BlobStore`].

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use campusboard_core::forum::{
    attachment_blob_key, resolve_content_type, validate_filename, Attachment,
    AttachmentMetadata, AttachmentUpload,
};
use campusboard_core::storage::conversions::attachment_to_item;
use campusboard_core::storage::keys::{self, FILE_PREFIX};
use campusboard_core::storage::{BlobStore, Id, Record, RecordKind, RepositoryError, Result};

use super::repository::EntityRepository;

/// Result of removing an attachment.
#[derive(Debug, Clone, Serialize)]
pub struct UnbindOutcome {
    /// The metadata record that was deleted, if there was one.
    pub removed: Option<Attachment>,
    /// True when the record is gone but its blob could not be deleted.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_error: Option<String>,
}

#[derive(Clone)]
pub struct AttachmentBinding {
    repository: EntityRepository,
    blobs: Arc<dyn BlobStore>,
    max_bytes: u64,
}

impl AttachmentBinding {
    pub fn new(repository: EntityRepository, blobs: Arc<dyn BlobStore>, max_bytes: u64) -> Self {
        Self {
            repository,
            blobs,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_bytes {
            return Err(RepositoryError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Records that `file_id` belongs to `post_id`.
    ///
    /// The bytes are assumed to be in the blob store already, under
    /// `metadata.blob_key` or the default key derived from the ids.
    pub async fn bind(
        &self,
        post_id: &Id,
        file_id: &Id,
        metadata: AttachmentMetadata,
    ) -> Result<Attachment> {
        metadata.validate()?;
        self.check_size(metadata.size)?;
        self.repository.get_post(post_id).await?;

        let now = Utc::now();
        let attachment = Attachment {
            file_id: file_id.clone(),
            post_id: post_id.clone(),
            blob_key: metadata.blob_key.unwrap_or_else(|| {
                attachment_blob_key(post_id.as_str(), file_id.as_str(), &metadata.filename)
            }),
            content_type: resolve_content_type(metadata.content_type.as_deref()),
            filename: metadata.filename,
            size: metadata.size,
            uploaded_by: metadata.uploaded_by,
            created_at: now,
            updated_at: now,
        };

        match self.repository.create(attachment_to_item(&attachment)).await {
            Ok(_) => {}
            Err(RepositoryError::AlreadyExists { entity_type, .. }) => {
                return Err(RepositoryError::AlreadyExists {
                    entity_type,
                    id: file_id.to_string(),
                })
            }
            Err(err) => return Err(err),
        }

        tracing::debug!(post_id = %post_id, file_id = %file_id, size = attachment.size, "Attachment bound");
        Ok(attachment)
    }

    /// Stores the bytes, then binds them to the post under a fresh file id.
    ///
    /// If binding fails the blob is removed again; a failure of that cleanup
    /// is logged and the binding error is returned.
    pub async fn upload(&self, post_id: &Id, upload: AttachmentUpload) -> Result<Attachment> {
        validate_filename(&upload.filename)?;
        let size = upload.bytes.len() as u64;
        self.check_size(size)?;
        self.repository.get_post(post_id).await?;

        let file_id = Id::generate();
        let blob_key = attachment_blob_key(post_id.as_str(), file_id.as_str(), &upload.filename);
        let content_type = resolve_content_type(upload.content_type.as_deref());
        self.blobs
            .put_object(&blob_key, upload.bytes, &content_type)
            .await?;

        let metadata = AttachmentMetadata {
            filename: upload.filename,
            content_type: Some(content_type),
            size,
            uploaded_by: upload.uploaded_by,
            blob_key: Some(blob_key.clone()),
        };
        match self.bind(post_id, &file_id, metadata).await {
            Ok(attachment) => Ok(attachment),
            Err(err) => {
                if let Err(cleanup) = self.blobs.delete_object(&blob_key).await {
                    tracing::warn!(
                        blob_key = %blob_key,
                        error = %cleanup,
                        "Could not remove blob after failed bind"
                    );
                }
                Err(err)
            }
        }
    }

    /// Attachments of a post in file-id order.
    pub async fn list(&self, post_id: &Id) -> Result<Vec<Attachment>> {
        Ok(self
            .repository
            .query_children(&keys::post_pk(post_id), FILE_PREFIX)
            .await?
            .into_iter()
            .filter_map(Record::into_attachment)
            .collect())
    }

    pub async fn get(&self, post_id: &Id, file_id: &Id) -> Result<Attachment> {
        self.repository
            .get(&keys::attachment_key(post_id, file_id))
            .await?
            .and_then(Record::into_attachment)
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: RecordKind::Attachment.entity_name(),
                id: file_id.to_string(),
            })
    }

    /// Deletes the metadata record, then the blob it points to.
    pub async fn unbind(&self, post_id: &Id, file_id: &Id) -> Result<UnbindOutcome> {
        let removed = self
            .repository
            .delete(&keys::attachment_key(post_id, file_id))
            .await?
            .and_then(Record::into_attachment);

        let blob_error = match &removed {
            None => None,
            Some(attachment) => match self.blobs.delete_object(&attachment.blob_key).await {
                Ok(()) => None,
                Err(err) => {
                    tracing::warn!(
                        post_id = %post_id,
                        file_id = %file_id,
                        blob_key = %attachment.blob_key,
                        error = %err,
                        "Attachment record removed but blob delete failed"
                    );
                    Some(err.to_string())
                }
            },
        };

        Ok(UnbindOutcome {
            removed,
            degraded: blob_error.is_some(),
            blob_error,
        })
    }
}
