//! Guild members and roster snapshots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Guild-assigned member identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl MemberId {
    /// Get the raw identifier value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A guild member as seen in one roster snapshot
///
/// The roster is fetched once per evaluation run; the snapshot is never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Stable identity
    pub id: MemberId,

    /// Character name as it appears in raid logs ("First Last")
    pub name: String,

    /// Guild rank (lower is more senior)
    pub rank: u32,
}

impl Member {
    /// Create a new member
    pub fn new(id: u64, name: impl Into<String>, rank: u32) -> Self {
        Self {
            id: MemberId(id),
            name: name.into(),
            rank,
        }
    }
}

/// Sort members the way rosters are presented: by rank, then name
pub fn sort_roster(members: &mut [Member]) {
    members.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.name.cmp(&b.name)));
}
