//! A deterministic election ledger: candidate registration, one-voter-one-vote
//! enforcement, and winner computation, all over records addressed by derived
//! keys.
//!
//! [`ElectionLedger`] is the operation surface. Callers submit operations
//! together with the identity performing them; each operation either commits
//! in full or leaves the record set exactly as it was. Transport, caller
//! authentication, and durable persistence belong to the surrounding host,
//! not to this crate.

pub mod error;
pub mod ledger;
pub mod model;
pub mod store;

pub use error::{Error, Result};
pub use ledger::ElectionLedger;
