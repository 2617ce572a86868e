//! Raidledger Engine
//!
//! Evaluates a resolved fight against the roster and clear history and
//! produces candidate points events.
//!
//! The engine provides:
//! - Roster matching by exact character name
//! - FC party-finder participation points
//! - High-end content party points (extreme, unreal, savage, criterion, ultimate)
//! - First-clear and veteran-support points
//! - An advisory fight signature for duplicate reconciliation
//!
//! # Examples
//!
//! ```no_run
//! use raidledger_engine::{EngineConfig, ContentCatalog, PointsRuleEngine};
//!
//! let engine = PointsRuleEngine::new(EngineConfig::default(), ContentCatalog::default()).unwrap();
//!
//! // Evaluate a fight against a store
//! // let evaluation = engine.evaluate(&fight, &roster, &tier, flags, &store)?;
//! ```

#![warn(missing_docs)]

mod catalog;
mod config;
mod engine;
mod error;

pub use catalog::{ContentCatalog, ContentKind, TierDefinition};
pub use config::EngineConfig;
pub use engine::{Evaluation, EvaluationFlags, EvaluationNote, PointsRuleEngine};
pub use error::EngineError;
