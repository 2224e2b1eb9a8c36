pub use candidate::{CandidateApplication, CandidateId, CandidateTally};
pub use election::{Election, ElectionStage};
pub use id::{ElectionId, Identity};
pub use receipt::VoteReceipt;

pub mod candidate;
pub mod election;
pub mod id;
pub mod receipt;
