use serde::{Deserialize, Serialize};

use crate::model::id::Identity;

/// Sequential 1-based candidate identifier. Minted only by `apply`, in
/// application order, with no gaps and no reuse.
pub type CandidateId = u64;

/// Written once when an applicant applies. Owns the minted candidate id and
/// binds it to the applicant's identity; its derived key is what makes a
/// second application by the same identity impossible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateApplication {
    pub id: CandidateId,
    pub identity: Identity,
}

/// Per-candidate vote counter, created once at registration from an existing
/// application and incremented by votes thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub id: CandidateId,
    /// Copied from the application at registration time.
    pub identity: Identity,
    pub votes: u64,
}

impl CandidateTally {
    /// A zero tally for a registered application.
    pub fn new(application: &CandidateApplication) -> Self {
        Self {
            id: application.id,
            identity: application.identity,
            votes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tally_copies_application_and_starts_at_zero() {
        let application = CandidateApplication {
            id: 3,
            identity: Identity::random(rand::thread_rng()),
        };
        let tally = CandidateTally::new(&application);
        assert_eq!(tally.id, application.id);
        assert_eq!(tally.identity, application.identity);
        assert_eq!(tally.votes, 0);
    }
}
