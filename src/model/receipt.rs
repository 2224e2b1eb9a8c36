use serde::{Deserialize, Serialize};

use crate::model::candidate::CandidateId;

/// Proof that a voter has cast their vote in an election.
///
/// The receipt lives at a key derived from (voter identity, election id), so
/// its existence is the sole and sufficient evidence that the voter already
/// voted; a second vote fails on the attempt to create it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    /// The candidate the vote went to.
    pub candidate_id: CandidateId,
}
