//! Clear facts and clear-rate arithmetic

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{EncounterId, MemberId};

/// Three-letter job code a clear was made on (e.g. `WHM`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Job(pub String);

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recorded successful completion of an encounter by a member
///
/// Clears are append-only facts. Re-ingesting the same report fight yields
/// the same [`ClearKey`] and is ignored by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clear {
    /// Member who cleared
    pub member_id: MemberId,

    /// Encounter variant that was cleared
    pub encounter_id: EncounterId,

    /// Kill start time
    pub start_time: DateTime<Utc>,

    /// Raid-log report code
    pub report_id: String,

    /// Fight index within the report
    pub report_fight_id: u32,

    /// Job the member played
    pub job: Job,

    /// Whether the member was already locked out for the week
    #[serde(default)]
    pub locked_in: bool,
}

/// Uniqueness key of a clear
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClearKey {
    /// Member
    pub member_id: MemberId,
    /// Encounter variant
    pub encounter_id: EncounterId,
    /// Report code
    pub report_id: String,
    /// Fight index
    pub report_fight_id: u32,
}

impl Clear {
    /// Uniqueness key used for idempotent ingestion
    pub fn key(&self) -> ClearKey {
        ClearKey {
            member_id: self.member_id,
            encounter_id: self.encounter_id.clone(),
            report_id: self.report_id.clone(),
            report_fight_id: self.report_fight_id,
        }
    }

    /// Calendar date (UTC) the clear happened on
    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }
}

/// Clears versus eligible members for one encounter name
///
/// Stored as the exact pair of counts; rounding for display belongs to the
/// presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearRate {
    /// Distinct members with at least one matching clear
    pub clears: u64,

    /// Size of the roster snapshot
    pub eligible_members: u64,
}

impl ClearRate {
    /// Create a clear rate from raw counts
    pub fn new(clears: u64, eligible_members: u64) -> Self {
        Self {
            clears,
            eligible_members,
        }
    }

    /// The rate as a fraction in `[0, 1]`; zero when nobody is eligible
    pub fn rate(&self) -> f64 {
        if self.eligible_members == 0 {
            return 0.0;
        }
        self.clears as f64 / self.eligible_members as f64
    }

    /// The rate reduced to lowest terms `(numerator, denominator)`
    pub fn as_ratio(&self) -> (u64, u64) {
        if self.eligible_members == 0 {
            return (0, 1);
        }
        let g = gcd(self.clears, self.eligible_members);
        (self.clears / g, self.eligible_members / g)
    }
}

impl fmt::Display for ClearRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.clears, self.eligible_members)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}
