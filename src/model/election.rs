use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::candidate::{CandidateId, CandidateTally};
use crate::model::id::Identity;

/// Stages in the election lifecycle.
///
/// The lifecycle is strictly linear: `Created` → `Voting` → `Closed`, one
/// step at a time, never backwards, and `Closed` is terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionStage {
    /// Accepting candidate applications and registrations.
    Created,
    /// Accepting votes.
    Voting,
    /// Finished; winners computed. Terminal.
    Closed,
}

impl ElectionStage {
    /// The only stage legally reachable from this one.
    pub fn successor(self) -> Option<ElectionStage> {
        match self {
            ElectionStage::Created => Some(ElectionStage::Voting),
            ElectionStage::Voting => Some(ElectionStage::Closed),
            ElectionStage::Closed => None,
        }
    }
}

impl Display for ElectionStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElectionStage::Created => "Created",
            ElectionStage::Voting => "Voting",
            ElectionStage::Closed => "Closed",
        };
        write!(f, "{name}")
    }
}

/// The root election record: lifecycle stage, aggregate counters, and the
/// winner set once the election has closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    /// Identity that created the election; only it may change stages.
    pub initiator: Identity,
    /// How many winners to select at close. At least 1.
    pub winners_count: u8,
    /// How many candidate ids have been minted so far. Only ever increases.
    pub candidate_count: u64,
    /// Current lifecycle stage.
    pub stage: ElectionStage,
    /// Winning candidate ids, best first. Empty until closed, then written
    /// exactly once.
    pub winner_ids: Vec<CandidateId>,
    /// Final vote totals parallel to `winner_ids`. Empty until closed.
    pub winner_votes: Vec<u64>,
}

impl Election {
    pub fn new(initiator: Identity, winners_count: u8) -> Self {
        Self {
            initiator,
            winners_count,
            candidate_count: 0,
            stage: ElectionStage::Created,
            winner_ids: Vec::new(),
            winner_votes: Vec::new(),
        }
    }

    /// Move to `target`, enforcing the linear lifecycle. Anything other
    /// than the single-step forward transition is rejected, including a
    /// no-op change to the current stage.
    pub fn advance(&mut self, target: ElectionStage) -> Result<()> {
        if self.stage.successor() != Some(target) {
            return Err(Error::InvalidTransition {
                from: self.stage,
                to: target,
            });
        }
        self.stage = target;
        Ok(())
    }

    /// Require the election to be at `expected` before an operation runs.
    pub fn expect_stage(&self, expected: ElectionStage) -> Result<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(Error::InvalidStage {
                expected,
                actual: self.stage,
            })
        }
    }

    /// Compute and record the winner set from the final tallies.
    ///
    /// Candidates are ranked by vote count descending; a tie breaks towards
    /// the lower candidate id, i.e. the earlier applicant. The list is cut
    /// to `winners_count`, so it holds `min(winners_count, tallies.len())`
    /// entries.
    pub fn select_winners(&mut self, tallies: &[CandidateTally]) {
        let mut ranked: Vec<(CandidateId, u64)> =
            tallies.iter().map(|tally| (tally.id, tally.votes)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(self.winners_count as usize);

        self.winner_ids = ranked.iter().map(|&(id, _)| id).collect();
        self.winner_votes = ranked.iter().map(|&(_, votes)| votes).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election(winners_count: u8) -> Election {
        Election::new(Identity::random(rand::thread_rng()), winners_count)
    }

    fn tally(id: CandidateId, votes: u64) -> CandidateTally {
        CandidateTally {
            id,
            identity: Identity::random(rand::thread_rng()),
            votes,
        }
    }

    #[test]
    fn lifecycle_is_linear() {
        assert_eq!(
            ElectionStage::Created.successor(),
            Some(ElectionStage::Voting)
        );
        assert_eq!(
            ElectionStage::Voting.successor(),
            Some(ElectionStage::Closed)
        );
        assert_eq!(ElectionStage::Closed.successor(), None);
    }

    #[test]
    fn advance_rejects_skipping() {
        let mut election = election(1);
        let err = election.advance(ElectionStage::Closed).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: ElectionStage::Created,
                to: ElectionStage::Closed,
            }
        ));
        assert_eq!(election.stage, ElectionStage::Created);
    }

    #[test]
    fn advance_rejects_same_stage() {
        let mut election = election(1);
        let err = election.advance(ElectionStage::Created).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }

    #[test]
    fn advance_rejects_backwards() {
        let mut election = election(1);
        election.advance(ElectionStage::Voting).unwrap();
        let err = election.advance(ElectionStage::Created).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(election.stage, ElectionStage::Voting);
    }

    #[test]
    fn winners_ranked_by_votes_descending() {
        let mut election = election(3);
        election.select_winners(&[tally(1, 2), tally(2, 5), tally(3, 3)]);
        assert_eq!(election.winner_ids, vec![2, 3, 1]);
        assert_eq!(election.winner_votes, vec![5, 3, 2]);
    }

    #[test]
    fn winners_tie_breaks_to_lower_id() {
        let mut election = election(2);
        election.select_winners(&[tally(3, 4), tally(1, 4), tally(2, 4)]);
        assert_eq!(election.winner_ids, vec![1, 2]);
    }

    #[test]
    fn winners_truncated_to_winners_count() {
        let mut election = election(1);
        election.select_winners(&[tally(1, 1), tally(2, 2)]);
        assert_eq!(election.winner_ids, vec![2]);
        assert_eq!(election.winner_votes, vec![2]);
    }

    #[test]
    fn winners_shorter_than_count_when_few_candidates() {
        let mut election = election(5);
        election.select_winners(&[tally(1, 0)]);
        assert_eq!(election.winner_ids, vec![1]);
    }
}
