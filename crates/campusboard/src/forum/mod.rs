//! Forum services over the single-table store.
//!
//! [`EntityRepository`] owns typed CRUD; [`VoteLedger`], [`FeedViews`] and
//! [`AttachmentBinding`] build on it. All four are cheap to clone and share
//! the same `Arc`'d store.

mod attachments;
mod ledger;
mod repository;
#[cfg(test)]
pub(crate) mod test_support;
mod views;

use std::sync::Arc;

use campusboard_core::storage::{BlobStore, ItemStore};

use crate::config::Config;

pub use attachments::{AttachmentBinding, UnbindOutcome};
pub use ledger::{ReconcileReport, VoteLedger, VoteOutcome};
pub use repository::EntityRepository;
pub use views::FeedViews;

/// Every forum service, wired to one store and one blob store.
#[derive(Clone)]
pub struct Forum {
    pub repository: EntityRepository,
    pub votes: VoteLedger,
    pub feeds: FeedViews,
    pub attachments: AttachmentBinding,
}

impl Forum {
    pub fn new(store: Arc<dyn ItemStore>, blobs: Arc<dyn BlobStore>, config: &Config) -> Self {
        let repository = EntityRepository::new(store);
        Self {
            votes: VoteLedger::new(repository.clone()),
            feeds: FeedViews::new(
                repository.clone(),
                config.feed_default_limit,
                config.feed_max_limit,
            ),
            attachments: AttachmentBinding::new(
                repository.clone(),
                blobs,
                config.max_attachment_bytes,
            ),
            repository,
        }
    }
}
