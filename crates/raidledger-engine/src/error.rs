//! Engine error types

use raidledger_domain::DomainError;
use thiserror::Error;

/// Errors that can occur while evaluating a fight
#[derive(Error, Debug)]
pub enum EngineError {
    /// Clear-history or ledger read failed
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Domain rule violated while building events
    #[error(transparent)]
    Domain(#[from] DomainError),
}
