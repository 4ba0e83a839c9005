use std::cmp::Ordering;

use super::error::ValidationError;
use super::operations::matches_search;
use super::types::Post;

/// Caps a requested feed size at `max`, using `default` when none was given.
/// A limit of zero yields an empty feed.
pub fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).min(max)
}

fn by_recency(a: &Post, b: &Post) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.post_id.cmp(&b.post_id))
}

fn by_activity(a: &Post, b: &Post) -> Ordering {
    b.activity()
        .cmp(&a.activity())
        .then_with(|| by_recency(a, b))
}

/// Newest first; equal timestamps fall back to post id.
pub fn recent(mut posts: Vec<Post>, limit: usize) -> Vec<Post> {
    posts.sort_by(by_recency);
    posts.truncate(limit);
    posts
}

/// Most votes (up plus down) first; ties go to the newer post.
pub fn trending(mut posts: Vec<Post>, limit: usize) -> Vec<Post> {
    posts.sort_by(by_activity);
    posts.truncate(limit);
    posts
}

/// Case-sensitive substring search over title and content, newest first.
pub fn search(posts: Vec<Post>, query: &str, limit: usize) -> Result<Vec<Post>, ValidationError> {
    if query.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    let matching = posts
        .into_iter()
        .filter(|post| matches_search(&post.title, &post.content, query))
        .collect();
    Ok(recent(matching, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Id;
    use chrono::{Duration, TimeZone, Utc};

    fn post(id: &str, minutes: i64, up: i64, down: i64, title: &str) -> Post {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        Post {
            post_id: Id::parse(id).unwrap(),
            author_id: Id::parse("author").unwrap(),
            title: title.to_string(),
            content: format!("body of {title}"),
            tags: vec![],
            attachments: vec![],
            is_anonymous: false,
            upvotes: up,
            downvotes: down,
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.post_id.as_str()).collect()
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 10, 50), 10);
        assert_eq!(clamp_limit(Some(0), 10, 50), 0);
        assert_eq!(clamp_limit(Some(500), 10, 50), 50);
        assert_eq!(clamp_limit(Some(7), 10, 50), 7);
    }

    #[test]
    fn test_recent_orders_by_created_at_desc() {
        let posts = vec![
            post("a", 0, 0, 0, "old"),
            post("b", 20, 0, 0, "newest"),
            post("c", 10, 0, 0, "middle"),
        ];
        assert_eq!(ids(&recent(posts, 10)), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_recent_tie_breaks_on_post_id() {
        let posts = vec![post("z", 5, 0, 0, "z"), post("m", 5, 0, 0, "m")];
        assert_eq!(ids(&recent(posts, 10)), vec!["m", "z"]);
    }

    #[test]
    fn test_trending_counts_up_and_down() {
        let posts = vec![
            post("quiet", 30, 1, 0, "q"),
            post("controversial", 0, 3, 4, "c"),
            post("liked", 10, 5, 0, "l"),
        ];
        assert_eq!(
            ids(&trending(posts, 10)),
            vec!["controversial", "liked", "quiet"]
        );
    }

    #[test]
    fn test_trending_tie_prefers_newer() {
        let posts = vec![post("older", 0, 2, 0, "o"), post("newer", 9, 1, 1, "n")];
        assert_eq!(ids(&trending(posts, 10)), vec!["newer", "older"]);
    }

    #[test]
    fn test_feeds_never_exceed_limit() {
        let posts: Vec<_> = (0..8)
            .map(|i| post(&format!("p{i}"), i, i, 0, "t"))
            .collect();
        assert_eq!(recent(posts.clone(), 3).len(), 3);
        assert_eq!(trending(posts.clone(), 3).len(), 3);
        assert_eq!(search(posts, "t", 3).unwrap().len(), 3);
    }

    #[test]
    fn test_feeds_tolerate_empty_input() {
        assert!(recent(vec![], 5).is_empty());
        assert!(trending(vec![], 5).is_empty());
        assert!(search(vec![], "exam", 5).unwrap().is_empty());
    }

    #[test]
    fn test_search_is_case_sensitive_substring() {
        let posts = vec![
            post("a", 0, 0, 0, "Exam schedule"),
            post("b", 1, 0, 0, "exam tips"),
            post("c", 2, 0, 0, "Lunch"),
        ];
        assert_eq!(ids(&search(posts, "Exam", 10).unwrap()), vec!["a"]);
    }

    #[test]
    fn test_search_rejects_empty_query() {
        assert_eq!(search(vec![], "", 5), Err(ValidationError::EmptyQuery));
    }

    #[test]
    fn test_search_accepts_whitespace_query() {
        let posts = vec![
            post("a", 0, 0, 0, "Exam schedule"),
            post("b", 1, 0, 0, "Lunch"),
        ];
        // Every generated content is "body of <title>", so a single space matches all.
        assert_eq!(ids(&search(posts, " ", 10).unwrap()), vec!["b", "a"]);
    }

    #[test]
    fn test_zero_limit_yields_empty_feeds() {
        let posts = vec![post("a", 0, 1, 0, "Exam"), post("b", 1, 0, 0, "Exam")];
        let limit = clamp_limit(Some(0), 10, 50);
        assert!(recent(posts.clone(), limit).is_empty());
        assert!(trending(posts.clone(), limit).is_empty());
        assert!(search(posts, "Exam", limit).unwrap().is_empty());
    }
}
