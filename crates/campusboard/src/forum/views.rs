//! Read-only list views over all posts.
//!
//! Every view scans the post metadata records and orders them in memory, so
//! each call costs one full-table scan. There is no secondary index.

use campusboard_core::forum::{feeds, Post};
use campusboard_core::storage::Result;

use super::repository::EntityRepository;

#[derive(Clone)]
pub struct FeedViews {
    repository: EntityRepository,
    default_limit: usize,
    max_limit: usize,
}

impl FeedViews {
    pub fn new(repository: EntityRepository, default_limit: usize, max_limit: usize) -> Self {
        Self {
            repository,
            default_limit,
            max_limit: max_limit.max(1),
        }
    }

    fn limit(&self, requested: Option<usize>) -> usize {
        feeds::clamp_limit(requested, self.default_limit, self.max_limit)
    }

    /// Newest posts first.
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<Post>> {
        let posts = self.repository.list_posts().await?;
        Ok(feeds::recent(posts, self.limit(limit)))
    }

    /// Posts with the most votes (either direction) first.
    pub async fn trending(&self, limit: Option<usize>) -> Result<Vec<Post>> {
        let posts = self.repository.list_posts().await?;
        Ok(feeds::trending(posts, self.limit(limit)))
    }

    /// Posts whose title or content contains `query`, newest first.
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<Post>> {
        let limit = self.limit(limit);
        let posts = self.repository.list_posts().await?;
        Ok(feeds::search(posts, query, limit)?)
    }
}
