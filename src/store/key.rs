use std::fmt::{self, Debug, Display, Formatter};

use data_encoding::HEXLOWER;
use sha2::{Digest, Sha256};

use crate::model::candidate::CandidateId;
use crate::model::id::{ElectionId, Identity};

/// Seed tags namespacing the per-participant record kinds.
const ELECTION_TAG: &[u8] = b"election";
const CANDIDATE_TAG: &[u8] = b"candidate";
const VOTER_TAG: &[u8] = b"voter";

/// A deterministic storage key: SHA-256 over a length-prefixed seed tuple.
///
/// Keys are pure functions of their semantic inputs, never random, so
/// "a record already exists at this key" is itself the uniqueness check
/// for the tuple. Each record kind has exactly one derivation below.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey([u8; 32]);

impl RecordKey {
    /// Derive a key from a seed tuple. Each seed is length-prefixed, so
    /// distinct tuples cannot collide by re-slicing the concatenation.
    fn derive(seeds: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for seed in seeds {
            hasher.update((seed.len() as u64).to_be_bytes());
            hasher.update(seed);
        }
        Self(hasher.finalize().into())
    }

    /// The key of the root election record.
    pub fn election(election_id: ElectionId) -> Self {
        Self::derive(&[ELECTION_TAG, election_id.as_bytes()])
    }

    /// The key of an applicant's candidate application. One per
    /// (identity, election).
    pub fn application(identity: Identity, election_id: ElectionId) -> Self {
        Self::derive(&[CANDIDATE_TAG, identity.as_bytes(), election_id.as_bytes()])
    }

    /// The key of a candidate's tally. One per (candidate id, election).
    pub fn tally(candidate_id: CandidateId, election_id: ElectionId) -> Self {
        Self::derive(&[&candidate_id.to_be_bytes(), election_id.as_bytes()])
    }

    /// The key of a voter's receipt. One per (identity, election).
    pub fn receipt(identity: Identity, election_id: ElectionId) -> Self {
        Self::derive(&[VOTER_TAG, identity.as_bytes(), election_id.as_bytes()])
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", HEXLOWER.encode(&self.0))
    }
}

impl Debug for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RecordKey({self})")
    }
}
