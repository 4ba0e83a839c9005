use campusboard_core::forum::{
    CreateCommentRequest, CreatePostRequest, CreateProfileRequest, UserRole, VoteTarget, VoteType,
};
use campusboard_core::storage::{Id, RepositoryError};

use crate::forum::Forum;

/// Demo members: (user id, username, role).
const MEMBERS: [(&str, &str, UserRole); 3] = [
    ("demo-ada", "ada", UserRole::Faculty),
    ("demo-grace", "grace", UserRole::Student),
    ("demo-linus", "linus", UserRole::Moderator),
];

/// Demo posts: (author index, title, content, tags, upvoters, downvoters).
const POSTS: [(usize, &str, &str, &[&str], &[usize], &[usize]); 4] = [
    (
        0,
        "Office hours moved to Thursday",
        "This week only, office hours are Thursday 2-4pm in room 204.",
        &["announcements", "cs101"],
        &[0, 1, 2],
        &[],
    ),
    (
        1,
        "Study group for the midterm?",
        "Anyone up for a study group in the library on Sunday?",
        &["study-group"],
        &[0],
        &[],
    ),
    (
        2,
        "Reminder: keep threads on topic",
        "Off-topic threads will be moved to the lounge board.",
        &["meta"],
        &[0],
        &[1],
    ),
    (
        1,
        "Lost calculator",
        "Left a TI-84 in the lecture hall, has a sticker on the back.",
        &["lost-and-found"],
        &[],
        &[],
    ),
];

fn demo_id(raw: &str) -> Result<Id, RepositoryError> {
    Ok(Id::parse(raw)?)
}

/// Seeds demo profiles, posts, a comment and some votes. Profiles that already
/// exist are left alone. Returns the number of posts created.
pub async fn seed(forum: &Forum) -> Result<usize, RepositoryError> {
    let mut members = Vec::with_capacity(MEMBERS.len());
    for (user_id, username, role) in MEMBERS {
        let user_id = demo_id(user_id)?;
        let request = CreateProfileRequest {
            user_id: user_id.clone(),
            username: username.to_string(),
            email: format!("{username}@campus.example"),
            role,
            student_id: None,
            is_verified: true,
        };
        match forum.repository.put_profile(request).await {
            Ok(_) | Err(RepositoryError::AlreadyExists { .. }) => {}
            Err(err) => return Err(err),
        }
        members.push(user_id);
    }

    let mut created = 0;
    for (author, title, content, tags, upvoters, downvoters) in POSTS {
        let request = CreatePostRequest::new(members[author].clone(), title, content)
            .with_tags(tags.iter().map(|t| t.to_string()).collect());
        let post = forum.repository.create_post(request).await?;
        created += 1;

        let target = VoteTarget::Post {
            post_id: post.post_id.clone(),
        };
        for &voter in upvoters {
            forum
                .votes
                .cast(&target, &members[voter], VoteType::Up)
                .await?;
        }
        for &voter in downvoters {
            forum
                .votes
                .cast(&target, &members[voter], VoteType::Down)
                .await?;
        }

        if created == 2 {
            forum
                .repository
                .create_comment(
                    &post.post_id,
                    CreateCommentRequest::new(members[0].clone(), "Count me in."),
                )
                .await?;
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn test_seed_populates_feeds() {
        let state = AppState::default();
        let created = seed(&state.forum).await.unwrap();
        assert_eq!(created, POSTS.len());

        let trending = state.forum.feeds.trending(Some(1)).await.unwrap();
        assert_eq!(trending[0].title, "Office hours moved to Thursday");
        assert_eq!(trending[0].upvotes, 3);

        // Profiles are kept on a second run.
        seed(&state.forum).await.unwrap();
        let ada = state
            .forum
            .repository
            .get_profile(&Id::parse("demo-ada").unwrap())
            .await
            .unwrap();
        assert_eq!(ada.role, UserRole::Faculty);
    }
}
