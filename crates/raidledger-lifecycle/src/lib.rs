//! Raidledger Lifecycle
//!
//! Moves points events from fight evaluation, through human review, into the
//! per-member ledgers.
//!
//! # Overview
//!
//! - **submit**: resolve a fight, evaluate it, persist a submission and its
//!   queue entry. No ledger is touched.
//! - **submit_manual**: queue administrator awards (mentor tickets, statics,
//!   ad-hoc points) without a fight.
//! - **review**: approve or deny events; approved events are committed into
//!   the ledger with one-time categories de-duplicated.
//! - **remove_points_events**: corrections against a committed ledger.
//!
//! ## Submission states
//!
//! | State | Meaning | Leaves by |
//! |-------|---------|-----------|
//! | **Open** | at least one event PENDING, entry in the queue | review resolving every event |
//! | **Closed** | every event APPROVED, DENIED or ALREADY_AWARDED | never (retained for audit) |
//!
//! # Usage
//!
//! ```no_run
//! use raidledger_lifecycle::{LifecycleConfig, SubmissionLifecycle};
//! use raidledger_engine::ContentCatalog;
//! use raidledger_store::SqliteStore;
//! # use raidledger_domain::{FightData, FightRef, Member};
//! # use raidledger_domain::traits::FightResolver;
//! # struct Logs;
//! # impl FightResolver for Logs {
//! #     type Error = std::convert::Infallible;
//! #     fn resolve(&self, _: &FightRef) -> Result<Option<FightData>, Self::Error> { Ok(None) }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::new("raidledger.db")?;
//! let roster: Vec<Member> = Vec::new();
//! let lifecycle = SubmissionLifecycle::new(
//!     store,
//!     Logs,
//!     roster,
//!     ContentCatalog::default(),
//!     LifecycleConfig::default(),
//! )?;
//!
//! for submission in lifecycle.pending()? {
//!     println!("{} ({} events)", submission.id, submission.events.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! current_tier = "ANABASEIOS"
//! closed_review_policy = "reject"
//!
//! [engine]
//! party_threshold = 4
//! prior_clear_buffer_secs = 60
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod lifecycle;
mod metrics;

pub use config::{ClosedReviewPolicy, LifecycleConfig};
pub use error::LifecycleError;
pub use lifecycle::{ManualAward, SubmissionLifecycle};
pub use metrics::LifecycleMetrics;
