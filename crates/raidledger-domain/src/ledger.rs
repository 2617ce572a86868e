//! Ledger records - per (member, tier) points accounting
//!
//! Invariant after every commit or removal:
//! `total_points == sum(one_time points) + sum(events points)`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{EventId, MemberId, PointsCategory, PointsEvent, PointsEventStatus, TierId};

/// A member's points for one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Owner
    pub member_id: MemberId,

    /// Scope
    pub tier: TierId,

    /// Running total
    pub total_points: i64,

    /// Awarded one-time categories
    pub one_time: BTreeMap<PointsCategory, PointsEvent>,

    /// Repeatable awards in commit order
    pub events: Vec<PointsEvent>,

    /// Optimistic-concurrency counter, bumped by the store on every write
    #[serde(default)]
    pub version: u64,
}

impl LedgerRecord {
    /// Create an empty record (not yet persisted, version 0)
    pub fn new(member_id: MemberId, tier: TierId) -> Self {
        Self {
            member_id,
            tier,
            total_points: 0,
            one_time: BTreeMap::new(),
            events: Vec::new(),
            version: 0,
        }
    }

    /// Whether a one-time category has been awarded
    pub fn has_one_time(&self, category: PointsCategory) -> bool {
        self.one_time.contains_key(&category)
    }

    /// Apply one approved event and report its resulting status
    ///
    /// A one-time category already present yields
    /// [`PointsEventStatus::AlreadyAwarded`] and leaves the total untouched.
    pub fn commit(&mut self, event: &PointsEvent) -> PointsEventStatus {
        let mut stored = event.clone();
        stored.status = PointsEventStatus::Approved;

        if event.category.is_one_time() {
            if self.has_one_time(event.category) {
                return PointsEventStatus::AlreadyAwarded;
            }
            self.one_time.insert(event.category, stored);
        } else {
            self.events.push(stored);
        }

        self.total_points += event.points;
        PointsEventStatus::Approved
    }

    /// Remove events by id from both collections, returning what was removed
    ///
    /// Ids that are not present are skipped.
    pub fn remove_events(&mut self, ids: &[EventId]) -> Vec<PointsEvent> {
        let mut removed = Vec::new();

        let one_time_hits: Vec<PointsCategory> = self
            .one_time
            .iter()
            .filter(|(_, e)| ids.contains(&e.id))
            .map(|(c, _)| *c)
            .collect();
        for category in one_time_hits {
            if let Some(event) = self.one_time.remove(&category) {
                removed.push(event);
            }
        }

        let (hits, kept): (Vec<PointsEvent>, Vec<PointsEvent>) =
            std::mem::take(&mut self.events).into_iter().partition(|e| ids.contains(&e.id));
        self.events = kept;
        removed.extend(hits);

        for event in &removed {
            self.total_points -= event.points;
        }
        removed
    }

    /// Total derived from the stored events
    pub fn recomputed_total(&self) -> i64 {
        self.one_time.values().map(|e| e.points).sum::<i64>()
            + self.events.iter().map(|e| e.points).sum::<i64>()
    }

    /// Whether the running total agrees with the stored events
    pub fn is_consistent(&self) -> bool {
        self.total_points == self.recomputed_total()
    }
}

/// One row of a tier leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Member
    pub member_id: MemberId,

    /// Tier
    pub tier: TierId,

    /// Total points in that tier
    pub total_points: i64,
}
