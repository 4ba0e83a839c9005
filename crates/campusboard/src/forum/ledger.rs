//! Vote ledger: one vote per user per target, mirrored into the target's
//! `upvotes`/`downvotes` counters.
//!
//! A cast or retract is two independent steps: a conditional write of the
//! vote record, then one atomic add per counter that moves. There is no
//! transaction spanning them. If the counter step fails after the vote write
//! succeeded, the outcome says so and the drift stays until
//! [`VoteLedger::reconcile`] recounts the target.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use campusboard_core::forum::ledger::{
    drift, plan_cast, plan_retract, tally, CounterDeltas, Expect, VoteState, VoteTally,
    VoteWrite,
};
use campusboard_core::forum::{Vote, VoteTarget, VoteType};
use campusboard_core::storage::conversions::{
    get_counter, get_vote_type, vote_to_item, ATTR_VOTE_TYPE,
};
use campusboard_core::storage::{Id, ItemStore, PutCondition, RepositoryError, Result};

use super::repository::EntityRepository;

/// Result of a cast or retract.
#[derive(Debug, Clone, Serialize)]
pub struct VoteOutcome {
    pub target: VoteTarget,
    pub user_id: Id,
    /// Where the voter stands after the operation.
    pub state: VoteState,
    /// False when the call was a no-op (re-cast of the same vote, or retract
    /// with nothing on record).
    pub changed: bool,
    /// Counter values after the operation, if they could be read back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tally: Option<VoteTally>,
    /// True when the vote record changed but a counter update failed.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_failure: Option<String>,
}

impl VoteOutcome {
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Result of recounting one target.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub target: VoteTarget,
    /// Counters as they were stored before the recount.
    pub recorded: VoteTally,
    /// Counters derived from the live vote records.
    pub actual: VoteTally,
    /// Adjustments that were applied.
    pub corrected: CounterDeltas,
}

#[derive(Clone)]
pub struct VoteLedger {
    repository: EntityRepository,
    store: Arc<dyn ItemStore>,
}

impl VoteLedger {
    pub fn new(repository: EntityRepository) -> Self {
        let store = repository.store().clone();
        Self { repository, store }
    }

    async fn ensure_target(&self, target: &VoteTarget) -> Result<()> {
        match target {
            VoteTarget::Post { post_id } => self.repository.get_post(post_id).await.map(|_| ()),
            VoteTarget::Comment {
                post_id,
                comment_id,
            } => self
                .repository
                .get_comment(post_id, comment_id)
                .await
                .map(|_| ()),
        }
    }

    /// Reads the target's stored counters.
    async fn recorded_tally(&self, target: &VoteTarget) -> Result<VoteTally> {
        let item = self
            .store
            .get(&target.counter_key())
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: target.entity_name(),
                id: target
                    .comment_id()
                    .unwrap_or_else(|| target.post_id())
                    .to_string(),
            })?;
        Ok(VoteTally {
            upvotes: get_counter(&item, VoteType::Up.counter_attribute()),
            downvotes: get_counter(&item, VoteType::Down.counter_attribute()),
        })
    }

    /// Applies each non-zero delta with its own atomic add. Every delta is
    /// attempted; failures are collected rather than returned.
    async fn apply_deltas(&self, target: &VoteTarget, deltas: CounterDeltas) -> Option<String> {
        let key = target.counter_key();
        let now = Utc::now();
        let mut failures = Vec::new();
        for (vote_type, delta) in deltas.non_zero() {
            let attribute = vote_type.counter_attribute();
            if let Err(err) = self.store.atomic_add(&key, attribute, delta, now).await {
                tracing::warn!(
                    target_ref = %target,
                    counter = attribute,
                    delta,
                    error = %err,
                    "Counter update failed after vote write; counters have drifted"
                );
                failures.push(format!("{attribute} {delta:+}: {err}"));
            }
        }
        if failures.is_empty() {
            None
        } else {
            Some(failures.join("; "))
        }
    }

    async fn outcome(
        &self,
        target: VoteTarget,
        user_id: Id,
        state: VoteState,
        changed: bool,
        partial_failure: Option<String>,
    ) -> VoteOutcome {
        let tally = match self.recorded_tally(&target).await {
            Ok(tally) => Some(tally),
            Err(err) => {
                tracing::debug!(target_ref = %target, error = %err, "Could not read counters back");
                None
            }
        };
        VoteOutcome {
            target,
            user_id,
            state,
            changed,
            tally,
            degraded: partial_failure.is_some(),
            partial_failure,
        }
    }

    /// Records `voter`'s vote on `target`.
    ///
    /// Re-casting the same vote changes nothing. Switching moves one unit from
    /// the old counter to the new one. Fails with `NotFound` when the target
    /// does not exist and with `Conflict` when another request changed this
    /// voter's vote between the read and the write.
    pub async fn cast(
        &self,
        target: &VoteTarget,
        voter: &Id,
        vote_type: VoteType,
    ) -> Result<VoteOutcome> {
        self.ensure_target(target).await?;

        let prior_vote = self.repository.get_vote(target, voter).await?;
        let prior = VoteState::from_vote(prior_vote.as_ref().map(|v| v.vote_type));
        let plan = plan_cast(prior, vote_type);

        let VoteWrite::Put { vote_type, expect } = plan.write else {
            tracing::debug!(target_ref = %target, user_id = %voter, "Vote unchanged");
            return Ok(self
                .outcome(target.clone(), voter.clone(), plan.next, false, None)
                .await);
        };

        let now = Utc::now();
        let vote = Vote {
            post_id: target.post_id().clone(),
            comment_id: target.comment_id().cloned(),
            user_id: voter.clone(),
            vote_type,
            created_at: prior_vote.map(|v| v.created_at).unwrap_or(now),
            updated_at: now,
        };
        let condition = match expect {
            Expect::Absent => PutCondition::IfAbsent,
            Expect::Recorded(previous) => PutCondition::IfAttributeEquals {
                name: ATTR_VOTE_TYPE.to_string(),
                value: previous.as_str().into(),
            },
        };

        match self.store.put(vote_to_item(&vote), condition).await {
            Ok(()) => {}
            Err(RepositoryError::ConditionFailed(_)) => {
                return Err(RepositoryError::Conflict(format!(
                    "vote by {voter} on {target} changed concurrently"
                )));
            }
            Err(err) => return Err(err),
        }

        let partial_failure = self.apply_deltas(target, plan.deltas).await;
        tracing::debug!(
            target_ref = %target,
            user_id = %voter,
            prior = ?plan.prior,
            next = ?plan.next,
            "Vote recorded"
        );
        Ok(self
            .outcome(target.clone(), voter.clone(), plan.next, true, partial_failure)
            .await)
    }

    /// Removes `voter`'s vote on `target`, if any.
    ///
    /// The type stored on the deleted record decides which counter goes down.
    /// `hint` is only compared against it and logged when they disagree.
    /// Retracting works even after the target was deleted; the counter step
    /// then reports a partial failure.
    pub async fn retract(
        &self,
        target: &VoteTarget,
        voter: &Id,
        hint: Option<VoteType>,
    ) -> Result<VoteOutcome> {
        let old = self.store.delete(&target.vote_key(voter)).await?;
        let recorded = old.as_ref().map(get_vote_type).transpose()?;

        if let (Some(hint), Some(recorded)) = (hint, recorded) {
            if hint != recorded {
                tracing::warn!(
                    target_ref = %target,
                    user_id = %voter,
                    hint = hint.as_str(),
                    recorded = recorded.as_str(),
                    "Retract hint disagrees with recorded vote; using recorded"
                );
            }
        }

        let plan = plan_retract(VoteState::from_vote(recorded));
        if plan.is_noop() {
            return Ok(self
                .outcome(target.clone(), voter.clone(), plan.next, false, None)
                .await);
        }

        let partial_failure = self.apply_deltas(target, plan.deltas).await;
        tracing::debug!(target_ref = %target, user_id = %voter, prior = ?plan.prior, "Vote retracted");
        Ok(self
            .outcome(target.clone(), voter.clone(), plan.next, true, partial_failure)
            .await)
    }

    /// Where `voter` currently stands on `target`.
    pub async fn state(&self, target: &VoteTarget, voter: &Id) -> Result<VoteState> {
        let vote = self.repository.get_vote(target, voter).await?;
        Ok(VoteState::from_vote(vote.map(|v| v.vote_type)))
    }

    /// Recounts the live votes on `target` and corrects its counters.
    ///
    /// Casts that land while the recount runs can be over- or under-corrected;
    /// running it again settles them.
    pub async fn reconcile(&self, target: &VoteTarget) -> Result<ReconcileReport> {
        let recorded = self.recorded_tally(target).await?;
        let votes = self.repository.list_votes(target).await?;
        let actual = tally(votes.iter().map(|v| v.vote_type));
        let corrected = drift(recorded, actual);

        if !corrected.is_zero() {
            if let Some(failure) = self.apply_deltas(target, corrected).await {
                return Err(RepositoryError::StoreUnavailable(failure));
            }
            tracing::info!(
                target_ref = %target,
                upvotes = corrected.upvotes,
                downvotes = corrected.downvotes,
                "Vote counters corrected"
            );
        }

        Ok(ReconcileReport {
            target: target.clone(),
            recorded,
            actual,
            corrected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusboard_core::forum::{CreateCommentRequest, CreatePostRequest, Post};

    use crate::forum::test_support::{FlakyStore, RacingStore};
    use crate::storage::InMemoryStore;

    fn id(raw: &str) -> Id {
        Id::parse(raw).unwrap()
    }

    fn ledger_over(store: Arc<dyn ItemStore>) -> (EntityRepository, VoteLedger) {
        let repository = EntityRepository::new(store);
        let ledger = VoteLedger::new(repository.clone());
        (repository, ledger)
    }

    fn ledger() -> (EntityRepository, VoteLedger) {
        ledger_over(Arc::new(InMemoryStore::with_page_size(2)))
    }

    async fn seed_post(repository: &EntityRepository) -> Post {
        repository
            .create_post(CreatePostRequest::new(id("author"), "Lab hours", "Tuesdays"))
            .await
            .unwrap()
    }

    fn on(post: &Post) -> VoteTarget {
        VoteTarget::Post {
            post_id: post.post_id.clone(),
        }
    }

    #[tokio::test]
    async fn test_recasting_same_vote_does_not_double_count() {
        let (repository, ledger) = ledger();
        let post = seed_post(&repository).await;
        let target = on(&post);

        let first = ledger.cast(&target, &id("u1"), VoteType::Up).await.unwrap();
        assert!(first.changed);
        let second = ledger.cast(&target, &id("u1"), VoteType::Up).await.unwrap();
        assert!(!second.changed);
        assert_eq!(second.state, VoteState::VotedUp);

        let post = repository.get_post(&post.post_id).await.unwrap();
        assert_eq!((post.upvotes, post.downvotes), (1, 0));
        assert_eq!(repository.list_votes(&target).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_switch_moves_one_unit() {
        let (repository, ledger) = ledger();
        let post = seed_post(&repository).await;
        let target = on(&post);

        ledger.cast(&target, &id("u1"), VoteType::Up).await.unwrap();
        let outcome = ledger.cast(&target, &id("u1"), VoteType::Down).await.unwrap();
        assert_eq!(outcome.state, VoteState::VotedDown);
        assert_eq!(
            outcome.tally,
            Some(VoteTally {
                upvotes: 0,
                downvotes: 1
            })
        );

        let votes = repository.list_votes(&target).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].vote_type, VoteType::Down);
    }

    #[tokio::test]
    async fn test_cast_then_retract_restores_counters() {
        let (repository, ledger) = ledger();
        let post = seed_post(&repository).await;
        let target = on(&post);

        ledger.cast(&target, &id("u1"), VoteType::Down).await.unwrap();
        let outcome = ledger.retract(&target, &id("u1"), None).await.unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.state, VoteState::NoVote);

        let after = repository.get_post(&post.post_id).await.unwrap();
        assert_eq!((after.upvotes, after.downvotes), (0, 0));
        assert!(repository.list_votes(&target).await.unwrap().is_empty());

        let again = ledger.retract(&target, &id("u1"), None).await.unwrap();
        assert!(!again.changed);
    }

    #[tokio::test]
    async fn test_retract_uses_recorded_type_over_hint() {
        let (repository, ledger) = ledger();
        let post = seed_post(&repository).await;
        let target = on(&post);

        ledger.cast(&target, &id("u1"), VoteType::Up).await.unwrap();
        ledger
            .retract(&target, &id("u1"), Some(VoteType::Down))
            .await
            .unwrap();

        let after = repository.get_post(&post.post_id).await.unwrap();
        assert_eq!((after.upvotes, after.downvotes), (0, 0));
    }

    #[tokio::test]
    async fn test_counters_match_votes_after_mixed_sequence() {
        let (repository, ledger) = ledger();
        let post = seed_post(&repository).await;
        let target = on(&post);

        let steps = [
            ("a", Some(VoteType::Up)),
            ("b", Some(VoteType::Up)),
            ("c", Some(VoteType::Down)),
            ("a", Some(VoteType::Down)),
            ("b", None),
            ("d", Some(VoteType::Up)),
            ("c", Some(VoteType::Down)),
            ("d", None),
            ("e", Some(VoteType::Up)),
        ];
        for (voter, vote) in steps {
            match vote {
                Some(vote_type) => {
                    ledger.cast(&target, &id(voter), vote_type).await.unwrap();
                }
                None => {
                    ledger.retract(&target, &id(voter), None).await.unwrap();
                }
            }
        }

        let post = repository.get_post(&post.post_id).await.unwrap();
        let votes = repository.list_votes(&target).await.unwrap();
        let live = tally(votes.iter().map(|v| v.vote_type));
        assert_eq!(post.upvotes, live.upvotes);
        assert_eq!(post.downvotes, live.downvotes);
        assert_eq!((post.upvotes, post.downvotes), (1, 2));
    }

    #[tokio::test]
    async fn test_comment_votes_are_separate_from_post_votes() {
        let (repository, ledger) = ledger();
        let post = seed_post(&repository).await;
        let comment = repository
            .create_comment(&post.post_id, CreateCommentRequest::new(id("u2"), "same"))
            .await
            .unwrap();
        let comment_target = VoteTarget::Comment {
            post_id: post.post_id.clone(),
            comment_id: comment.comment_id.clone(),
        };

        ledger
            .cast(&comment_target, &id("u1"), VoteType::Up)
            .await
            .unwrap();

        let comment = repository
            .get_comment(&post.post_id, &comment.comment_id)
            .await
            .unwrap();
        assert_eq!(comment.upvotes, 1);
        let post = repository.get_post(&post.post_id).await.unwrap();
        assert_eq!(post.upvotes, 0);
        assert!(repository.list_votes(&on(&post)).await.unwrap().is_empty());
        assert_eq!(repository.list_comments(&post.post_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cast_on_missing_target_is_not_found() {
        let (_, ledger) = ledger();
        let target = VoteTarget::Post {
            post_id: id("ghost"),
        };
        let result = ledger.cast(&target, &id("u1"), VoteType::Up).await;
        assert!(matches!(
            result,
            Err(RepositoryError::NotFound {
                entity_type: "Post",
                ..
            })
        ));
    }

    fn vote_by(post: &Post, voter: &str, vote_type: VoteType) -> Vote {
        let now = Utc::now();
        Vote {
            post_id: post.post_id.clone(),
            comment_id: None,
            user_id: id(voter),
            vote_type,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_switch_racing_another_switch_is_conflict() {
        let racing = RacingStore::new(InMemoryStore::with_page_size(2));
        let (repository, ledger) = ledger_over(Arc::new(racing.clone()));
        let post = seed_post(&repository).await;
        let target = on(&post);
        ledger.cast(&target, &id("u1"), VoteType::Up).await.unwrap();

        // A concurrent request flips the stored vote after this cast read "up".
        racing.interleave(vote_to_item(&vote_by(&post, "u1", VoteType::Down)));
        let result = ledger.cast(&target, &id("u1"), VoteType::Down).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        let post = repository.get_post(&post.post_id).await.unwrap();
        assert_eq!((post.upvotes, post.downvotes), (1, 0));
    }

    #[tokio::test]
    async fn test_first_vote_racing_another_first_vote_is_conflict() {
        let racing = RacingStore::new(InMemoryStore::with_page_size(2));
        let (repository, ledger) = ledger_over(Arc::new(racing.clone()));
        let post = seed_post(&repository).await;
        let target = on(&post);

        racing.interleave(vote_to_item(&vote_by(&post, "u1", VoteType::Up)));
        let result = ledger.cast(&target, &id("u1"), VoteType::Up).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        let post = repository.get_post(&post.post_id).await.unwrap();
        assert_eq!((post.upvotes, post.downvotes), (0, 0));
    }

    #[tokio::test]
    async fn test_concurrent_first_votes_count_once_each() {
        let (repository, ledger) = ledger();
        let post = seed_post(&repository).await;
        let target = on(&post);

        let mut handles = Vec::new();
        for i in 0..20 {
            let ledger = ledger.clone();
            let target = target.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .cast(&target, &id(&format!("voter-{i}")), VoteType::Up)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let post = repository.get_post(&post.post_id).await.unwrap();
        assert_eq!(post.upvotes, 20);
    }

    #[tokio::test]
    async fn test_counter_failure_is_reported_and_reconciled() {
        let flaky = FlakyStore::new(InMemoryStore::with_page_size(2));
        let (repository, ledger) = ledger_over(Arc::new(flaky.clone()));
        let post = seed_post(&repository).await;
        let target = on(&post);

        ledger.cast(&target, &id("u1"), VoteType::Up).await.unwrap();
        flaky.fail_counters(true);
        let outcome = ledger.cast(&target, &id("u2"), VoteType::Up).await.unwrap();
        assert!(outcome.changed);
        assert!(outcome.is_degraded());
        flaky.fail_counters(false);

        let drifted = repository.get_post(&post.post_id).await.unwrap();
        assert_eq!(drifted.upvotes, 1);
        assert_eq!(repository.list_votes(&target).await.unwrap().len(), 2);

        let report = ledger.reconcile(&target).await.unwrap();
        assert_eq!(report.recorded.upvotes, 1);
        assert_eq!(report.actual.upvotes, 2);
        assert_eq!(report.corrected.upvotes, 1);

        let fixed = repository.get_post(&post.post_id).await.unwrap();
        assert_eq!(fixed.upvotes, 2);

        let clean = ledger.reconcile(&target).await.unwrap();
        assert!(clean.corrected.is_zero());
    }
}
