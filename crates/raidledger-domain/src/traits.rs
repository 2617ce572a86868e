//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Stores live in `raidledger-store`; fight and roster
//! collaborators are supplied by the caller.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fmt;

use crate::{
    Clear, ClearOrderBucket, ClearRate, Encounter, EncounterId, FightData, FightRef, Job,
    LeaderboardEntry, LedgerRecord, Member, MemberId, QueueEntry, Submission, SubmissionId, TierId,
};

/// Store errors that callers need to tell apart
pub trait StoreFailure: fmt::Display {
    /// A conditional write lost a race with another writer
    fn is_conflict(&self) -> bool;

    /// The addressed record or encounter does not exist
    fn is_not_found(&self) -> bool {
        false
    }

    /// The caller supplied data the store cannot accept
    fn is_invalid(&self) -> bool {
        false
    }
}

/// Trait for storing clear facts and answering clear-history questions
///
/// Implemented by the infrastructure layer (raidledger-store)
pub trait ClearHistoryStore {
    /// Error type for store operations
    type Error: StoreFailure;

    /// Upsert the encounter catalog
    fn register_encounters(&mut self, encounters: &[Encounter]) -> Result<(), Self::Error>;

    /// Replace the roster snapshot used as the clear-rate denominator
    fn replace_roster(&mut self, members: &[Member]) -> Result<(), Self::Error>;

    /// Current roster snapshot ordered by rank, then name
    fn roster(&self) -> Result<Vec<Member>, Self::Error>;

    /// Idempotent bulk insert; returns how many clears were new
    ///
    /// A batch naming an unregistered encounter is rejected whole.
    fn record_clears(&mut self, clears: &[Clear]) -> Result<usize, Self::Error>;

    /// Distinct clearers of an encounter name versus roster size
    fn clear_rate(&self, encounter_name: &str, include_echo: bool) -> Result<ClearRate, Self::Error>;

    /// Clear rate of every registered encounter name
    fn clear_rates(&self, include_echo: bool) -> Result<BTreeMap<String, ClearRate>, Self::Error>;

    /// Date-bucketed first-clear timeline of every encounter name
    fn clear_order(
        &self,
        include_echo: bool,
    ) -> Result<BTreeMap<String, Vec<ClearOrderBucket>>, Self::Error>;

    /// Date-bucketed first-clear timeline of one encounter name
    fn clear_order_for(
        &self,
        encounter_name: &str,
        include_echo: bool,
    ) -> Result<Vec<ClearOrderBucket>, Self::Error> {
        Ok(self
            .clear_order(include_echo)?
            .remove(encounter_name)
            .unwrap_or_default())
    }

    /// Clears by any of `member_ids` of any of `encounter_ids`, strictly before `before`
    fn prior_clears(
        &self,
        member_ids: &[MemberId],
        encounter_ids: &[EncounterId],
        before: DateTime<Utc>,
    ) -> Result<Vec<Clear>, Self::Error>;

    /// Roster members with at least one clear of an encounter name
    fn cleared_members(
        &self,
        encounter_name: &str,
        include_echo: bool,
    ) -> Result<BTreeSet<MemberId>, Self::Error>;

    /// Roster members without a clear of an encounter name
    fn uncleared_members(
        &self,
        encounter_name: &str,
        include_echo: bool,
    ) -> Result<Vec<Member>, Self::Error>;

    /// Distinct (roster member, job) pairs that cleared each encounter name
    fn cleared_jobs(
        &self,
        include_echo: bool,
    ) -> Result<BTreeMap<String, BTreeSet<(MemberId, Job)>>, Self::Error>;
}

/// Trait for per (member, tier) ledger records
pub trait LedgerStore {
    /// Error type for store operations
    type Error: StoreFailure;

    /// Load a record, if one has been committed
    fn get_ledger(&self, member_id: MemberId, tier: &TierId) -> Result<Option<LedgerRecord>, Self::Error>;

    /// Write a record if its `version` still matches the stored one
    ///
    /// Version 0 means "must not exist yet". Returns the new version.
    fn put_ledger(&mut self, record: &LedgerRecord) -> Result<u64, Self::Error>;

    /// Totals for a tier, highest first
    fn leaderboard(&self, tier: &TierId) -> Result<Vec<LeaderboardEntry>, Self::Error>;
}

/// Trait for submissions and the pending-review queue
pub trait SubmissionStore {
    /// Error type for store operations
    type Error: StoreFailure;

    /// Persist a new submission together with its queue entry
    fn create_submission(&mut self, submission: &Submission) -> Result<(), Self::Error>;

    /// Load a submission (open or retired)
    fn get_submission(&self, id: SubmissionId) -> Result<Option<Submission>, Self::Error>;

    /// Queue entries ordered by submission time
    fn pending_submissions(&self) -> Result<Vec<QueueEntry>, Self::Error>;

    /// Apply a review atomically
    ///
    /// Writes every ledger record (conditionally on its version), then the
    /// submission, then removes the queue entry when the submission is
    /// closed. Any failure leaves the store as it was.
    fn commit_review(
        &mut self,
        ledgers: &[LedgerRecord],
        submission: &Submission,
    ) -> Result<(), Self::Error>;
}

/// Resolves fight references against the raid-log provider
pub trait FightResolver {
    /// Error type for upstream failures
    type Error: fmt::Display;

    /// Resolve a fight; `None` when the provider does not know it
    fn resolve(&self, fight: &FightRef) -> Result<Option<FightData>, Self::Error>;
}

/// Supplies the current guild roster
pub trait RosterProvider {
    /// Error type for upstream failures
    type Error: fmt::Display;

    /// Fetch the roster snapshot
    fn current(&self) -> Result<Vec<Member>, Self::Error>;
}

impl RosterProvider for Vec<Member> {
    type Error = Infallible;

    fn current(&self) -> Result<Vec<Member>, Self::Error> {
        Ok(self.clone())
    }
}
