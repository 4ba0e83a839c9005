//! Pure vote state machine.
//!
//! Each `(target, voter)` pair is in one of three states. Planning a cast or a
//! retract from the prior state yields the vote-record write to perform and the
//! counter deltas to apply with atomic adds. Keeping this pure means the shell
//! only has to read the prior state, perform the plan, and report.

use serde::{Deserialize, Serialize};

use super::types::VoteType;

/// Where one voter stands on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    NoVote,
    VotedUp,
    VotedDown,
}

impl VoteState {
    pub fn from_vote(vote_type: Option<VoteType>) -> Self {
        match vote_type {
            None => VoteState::NoVote,
            Some(VoteType::Up) => VoteState::VotedUp,
            Some(VoteType::Down) => VoteState::VotedDown,
        }
    }

    pub fn vote_type(self) -> Option<VoteType> {
        match self {
            VoteState::NoVote => None,
            VoteState::VotedUp => Some(VoteType::Up),
            VoteState::VotedDown => Some(VoteType::Down),
        }
    }
}

/// Signed adjustments to a target's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDeltas {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl CounterDeltas {
    pub fn is_zero(&self) -> bool {
        self.upvotes == 0 && self.downvotes == 0
    }

    fn bump(&mut self, vote_type: VoteType, delta: i64) {
        match vote_type {
            VoteType::Up => self.upvotes += delta,
            VoteType::Down => self.downvotes += delta,
        }
    }

    /// Non-zero deltas as `(vote type, delta)` pairs, one per counter to touch.
    pub fn non_zero(&self) -> Vec<(VoteType, i64)> {
        [(VoteType::Up, self.upvotes), (VoteType::Down, self.downvotes)]
            .into_iter()
            .filter(|(_, delta)| *delta != 0)
            .collect()
    }
}

/// What the vote record must look like for a planned write to go ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Absent,
    Recorded(VoteType),
}

/// The single vote-record mutation a plan performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteWrite {
    Nothing,
    Put { vote_type: VoteType, expect: Expect },
    Delete { expect: VoteType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotePlan {
    pub prior: VoteState,
    pub next: VoteState,
    pub write: VoteWrite,
    pub deltas: CounterDeltas,
}

impl VotePlan {
    fn unchanged(prior: VoteState) -> Self {
        Self {
            prior,
            next: prior,
            write: VoteWrite::Nothing,
            deltas: CounterDeltas::default(),
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self.write, VoteWrite::Nothing)
    }
}

/// Plans a cast. Re-casting the current vote is a no-op, so counters never
/// double count; switching moves one unit from the old counter to the new one.
pub fn plan_cast(prior: VoteState, vote_type: VoteType) -> VotePlan {
    let next = VoteState::from_vote(Some(vote_type));
    if prior == next {
        return VotePlan::unchanged(prior);
    }

    let mut deltas = CounterDeltas::default();
    deltas.bump(vote_type, 1);
    let expect = match prior.vote_type() {
        None => Expect::Absent,
        Some(previous) => {
            deltas.bump(previous, -1);
            Expect::Recorded(previous)
        }
    };

    VotePlan {
        prior,
        next,
        write: VoteWrite::Put { vote_type, expect },
        deltas,
    }
}

/// Plans a retract. Retracting with no vote on record is a no-op.
pub fn plan_retract(prior: VoteState) -> VotePlan {
    let Some(previous) = prior.vote_type() else {
        return VotePlan::unchanged(prior);
    };

    let mut deltas = CounterDeltas::default();
    deltas.bump(previous, -1);
    VotePlan {
        prior,
        next: VoteState::NoVote,
        write: VoteWrite::Delete { expect: previous },
        deltas,
    }
}

/// Counter values of one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
}

/// Counts live votes by type.
pub fn tally<I>(votes: I) -> VoteTally
where
    I: IntoIterator<Item = VoteType>,
{
    votes
        .into_iter()
        .fold(VoteTally::default(), |mut acc, vote_type| {
            match vote_type {
                VoteType::Up => acc.upvotes += 1,
                VoteType::Down => acc.downvotes += 1,
            }
            acc
        })
}

/// The deltas that bring `recorded` counters back in line with `actual` votes.
pub fn drift(recorded: VoteTally, actual: VoteTally) -> CounterDeltas {
    CounterDeltas {
        upvotes: actual.upvotes - recorded.upvotes,
        downvotes: actual.downvotes - recorded.downvotes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cast_increments_one_counter() {
        let plan = plan_cast(VoteState::NoVote, VoteType::Up);
        assert_eq!(plan.next, VoteState::VotedUp);
        assert_eq!(
            plan.write,
            VoteWrite::Put {
                vote_type: VoteType::Up,
                expect: Expect::Absent
            }
        );
        assert_eq!(
            plan.deltas,
            CounterDeltas {
                upvotes: 1,
                downvotes: 0
            }
        );
    }

    #[test]
    fn test_repeated_cast_is_noop() {
        let plan = plan_cast(VoteState::VotedDown, VoteType::Down);
        assert!(plan.is_noop());
        assert!(plan.deltas.is_zero());
        assert_eq!(plan.next, VoteState::VotedDown);
    }

    #[test]
    fn test_switch_moves_one_unit() {
        let plan = plan_cast(VoteState::VotedUp, VoteType::Down);
        assert_eq!(plan.next, VoteState::VotedDown);
        assert_eq!(
            plan.write,
            VoteWrite::Put {
                vote_type: VoteType::Down,
                expect: Expect::Recorded(VoteType::Up)
            }
        );
        assert_eq!(
            plan.deltas,
            CounterDeltas {
                upvotes: -1,
                downvotes: 1
            }
        );
        assert_eq!(plan.deltas.non_zero().len(), 2);
    }

    #[test]
    fn test_retract_undoes_cast() {
        let cast = plan_cast(VoteState::NoVote, VoteType::Up);
        let retract = plan_retract(cast.next);
        assert_eq!(retract.next, VoteState::NoVote);
        assert_eq!(cast.deltas.upvotes + retract.deltas.upvotes, 0);
        assert_eq!(cast.deltas.downvotes + retract.deltas.downvotes, 0);
        assert_eq!(
            retract.write,
            VoteWrite::Delete {
                expect: VoteType::Up
            }
        );
    }

    #[test]
    fn test_retract_without_vote_is_noop() {
        assert!(plan_retract(VoteState::NoVote).is_noop());
    }

    #[test]
    fn test_tally_and_drift() {
        let actual = tally([VoteType::Up, VoteType::Up, VoteType::Down]);
        assert_eq!(
            actual,
            VoteTally {
                upvotes: 2,
                downvotes: 1
            }
        );
        let recorded = VoteTally {
            upvotes: 3,
            downvotes: 1,
        };
        let correction = drift(recorded, actual);
        assert_eq!(correction.non_zero(), vec![(VoteType::Up, -1)]);
        assert!(drift(actual, actual).is_zero());
    }
}
