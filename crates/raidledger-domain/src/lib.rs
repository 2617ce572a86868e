//! Raidledger Domain Layer
//!
//! Core value types and trait seams for tracking raid clears and turning raid
//! activity into a participation-points ledger. Nothing in this crate
//! performs I/O.
//!
//! ## Key Concepts
//!
//! - **Clear**: a member's recorded completion of an encounter
//! - **Encounter**: a unit of raid content, grouped by name and tier
//! - **PointsCategory**: a static table row (points, one-time flag)
//! - **PointsEvent**: a candidate award, reviewed from PENDING to a terminal state
//! - **Submission**: a reviewable bundle of events from one evaluation
//! - **LedgerRecord**: a member's accounting for one tier
//!
//! ## Architecture
//!
//! - Pure business logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod clear;
pub mod clear_order;
pub mod encounter;
pub mod error;
pub mod event;
pub mod fight;
pub mod ids;
pub mod ledger;
pub mod member;
pub mod submission;
pub mod tier;
pub mod traits;

// Re-exports for convenience
pub use category::{CategoryInfo, PointsCategory, CATEGORY_TABLE};
pub use clear::{Clear, ClearKey, ClearRate, Job};
pub use clear_order::{build_clear_order, cumulative_clears, ClearOrderBucket};
pub use encounter::{Encounter, EncounterId, EncounterKey};
pub use error::DomainError;
pub use event::{PointsEvent, PointsEventStatus};
pub use fight::{FightData, FightRef, FightSignature};
pub use ids::{EventId, SubmissionId};
pub use ledger::{LeaderboardEntry, LedgerRecord};
pub use member::{sort_roster, Member, MemberId};
pub use submission::{QueueEntry, Submission, SubmissionChannel};
pub use tier::TierId;
