use log::{debug, info};

use crate::error::{Error, Result};
use crate::model::candidate::{CandidateApplication, CandidateId, CandidateTally};
use crate::model::election::{Election, ElectionStage};
use crate::model::id::{ElectionId, Identity};
use crate::model::receipt::VoteReceipt;
use crate::store::{RecordKey, RecordStore, Transaction};

/// The operation surface of the election ledger.
///
/// Every method takes the identity performing the action and the id of the
/// election it acts on, and runs as one atomic transaction: it either
/// commits in full or leaves the record set exactly as it was. Distinct
/// ledgers share nothing; within one ledger, distinct elections share no
/// records.
#[derive(Debug, Default)]
pub struct ElectionLedger {
    store: RecordStore,
}

impl ElectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new election under the caller-supplied id. The caller
    /// becomes the initiator and is the only identity allowed to move the
    /// election through its stages.
    pub fn create_election(
        &self,
        caller: Identity,
        election_id: ElectionId,
        winners_count: u8,
    ) -> Result<Election> {
        if winners_count < 1 {
            return Err(Error::InvalidArgument(format!(
                "winners_count must be at least 1, got {winners_count}"
            )));
        }
        self.store.transact(|txn| {
            let election = Election::new(caller, winners_count);
            txn.insert_new(RecordKey::election(election_id), &election)?;
            info!("election {election_id} created by {caller}, {winners_count} winner(s)");
            Ok(election)
        })
    }

    /// Apply as a candidate. Mints the next sequential candidate id and
    /// binds it to the caller; one application per identity per election.
    pub fn apply(&self, caller: Identity, election_id: ElectionId) -> Result<CandidateApplication> {
        self.store.transact(|txn| {
            let mut election = require_election(txn, election_id)?;
            election.expect_stage(ElectionStage::Created)?;

            // The id mint and the application write commit together, so a
            // failed attempt never consumes an id and the sequence stays
            // dense.
            let application = CandidateApplication {
                id: election.candidate_count + 1,
                identity: caller,
            };
            txn.insert_new(RecordKey::application(caller, election_id), &application)?;
            election.candidate_count += 1;
            txn.put(RecordKey::election(election_id), &election)?;

            debug!(
                "candidate {} applied to election {election_id} as {caller}",
                application.id
            );
            Ok(application)
        })
    }

    /// Register a previously filed application, creating the candidate's
    /// zero tally. `application_ref` is the derived key returned by
    /// [`ElectionLedger::application_ref`]; the application it resolves to
    /// must belong to the caller.
    pub fn register(
        &self,
        caller: Identity,
        election_id: ElectionId,
        application_ref: RecordKey,
    ) -> Result<CandidateTally> {
        self.store.transact(|txn| {
            let election = require_election(txn, election_id)?;
            election.expect_stage(ElectionStage::Created)?;

            let application: CandidateApplication =
                txn.get(application_ref)?.ok_or_else(|| {
                    Error::NotFound(format!("no candidate application at {application_ref}"))
                })?;
            if application.identity != caller {
                return Err(Error::Unauthorized(format!(
                    "application {application_ref} does not belong to {caller}"
                )));
            }

            let tally = CandidateTally::new(&application);
            txn.insert_new(RecordKey::tally(tally.id, election_id), &tally)?;

            debug!("candidate {} registered in election {election_id}", tally.id);
            Ok(tally)
        })
    }

    /// Cast the caller's vote for a registered candidate. One vote per
    /// identity per election, enforced by the receipt's derived key.
    pub fn vote(
        &self,
        caller: Identity,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<VoteReceipt> {
        self.store.transact(|txn| {
            let election = require_election(txn, election_id)?;
            election.expect_stage(ElectionStage::Voting)?;

            let tally_key = RecordKey::tally(candidate_id, election_id);
            let mut tally: CandidateTally = txn.get(tally_key)?.ok_or_else(|| {
                Error::NotFound(format!(
                    "no candidate {candidate_id} in election {election_id}"
                ))
            })?;

            // Receipt creation and tally increment are one transaction: a
            // repeat voter fails on the receipt and no tally is touched.
            let receipt = VoteReceipt { candidate_id };
            txn.insert_new(RecordKey::receipt(caller, election_id), &receipt)?;
            tally.votes += 1;
            txn.put(tally_key, &tally)?;

            debug!("vote cast for candidate {candidate_id} in election {election_id}");
            Ok(receipt)
        })
    }

    /// Move the election to `target`. Only the initiator may do this, and
    /// only one stage forward at a time. Moving into `Closed` computes the
    /// winner set in the same transaction, so the stage change and the
    /// winners become visible together.
    pub fn change_stage(
        &self,
        caller: Identity,
        election_id: ElectionId,
        target: ElectionStage,
    ) -> Result<Election> {
        self.store.transact(|txn| {
            let mut election = require_election(txn, election_id)?;
            if election.initiator != caller {
                return Err(Error::Unauthorized(format!(
                    "only the initiator may change the stage of election {election_id}"
                )));
            }
            election.advance(target)?;

            if election.stage == ElectionStage::Closed {
                let tallies = final_tallies(txn, &election, election_id)?;
                election.select_winners(&tallies);
                info!(
                    "election {election_id} closed, winners {:?}",
                    election.winner_ids
                );
            } else {
                info!("election {election_id} moved to stage {target}");
            }

            txn.put(RecordKey::election(election_id), &election)?;
            Ok(election)
        })
    }

    /// The derived key of an identity's application in an election; this is
    /// the reference callers pass to [`ElectionLedger::register`].
    pub fn application_ref(identity: Identity, election_id: ElectionId) -> RecordKey {
        RecordKey::application(identity, election_id)
    }

    /// Look up the election record.
    pub fn election(&self, election_id: ElectionId) -> Result<Election> {
        self.store
            .transact(|txn| require_election(txn, election_id))
    }

    /// Look up an identity's candidate application.
    pub fn application(
        &self,
        identity: Identity,
        election_id: ElectionId,
    ) -> Result<CandidateApplication> {
        self.store.transact(|txn| {
            txn.get(RecordKey::application(identity, election_id))?
                .ok_or_else(|| {
                    Error::NotFound(format!(
                        "no application by {identity} in election {election_id}"
                    ))
                })
        })
    }

    /// Look up a candidate's tally.
    pub fn tally(&self, candidate_id: CandidateId, election_id: ElectionId) -> Result<CandidateTally> {
        self.store.transact(|txn| {
            txn.get(RecordKey::tally(candidate_id, election_id))?
                .ok_or_else(|| {
                    Error::NotFound(format!(
                        "no candidate {candidate_id} in election {election_id}"
                    ))
                })
        })
    }

    /// Look up an identity's vote receipt.
    pub fn receipt(&self, identity: Identity, election_id: ElectionId) -> Result<VoteReceipt> {
        self.store.transact(|txn| {
            txn.get(RecordKey::receipt(identity, election_id))?
                .ok_or_else(|| {
                    Error::NotFound(format!(
                        "no vote receipt for {identity} in election {election_id}"
                    ))
                })
        })
    }
}

fn require_election(txn: &Transaction<'_>, election_id: ElectionId) -> Result<Election> {
    txn.get(RecordKey::election(election_id))?
        .ok_or_else(|| Error::NotFound(format!("no election with id {election_id}")))
}

/// Read the tallies of every registered candidate, in id order. Applicants
/// that never registered have no tally and are skipped.
fn final_tallies(
    txn: &Transaction<'_>,
    election: &Election,
    election_id: ElectionId,
) -> Result<Vec<CandidateTally>> {
    let mut tallies = Vec::with_capacity(election.candidate_count as usize);
    for candidate_id in 1..=election.candidate_count {
        if let Some(tally) = txn.get::<CandidateTally>(RecordKey::tally(candidate_id, election_id))? {
            tallies.push(tally);
        }
    }
    Ok(tallies)
}
