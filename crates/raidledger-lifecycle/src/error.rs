//! Error types for lifecycle operations

use raidledger_domain::traits::StoreFailure;
use raidledger_domain::DomainError;
use raidledger_engine::EngineError;
use thiserror::Error;

/// Errors that can occur during submission lifecycle operations
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Fight reference unresolvable or submission unknown
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed identifier, reference or award
    #[error("Validation error: {0}")]
    Validation(String),

    /// Closed submission reviewed again, or a concurrent ledger write won
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A collaborator (fight resolver, roster provider) failed
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Store(String),

    /// Evaluation failure
    #[error("Engine error: {0}")]
    Engine(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LifecycleError {
    /// Classify a store failure
    pub(crate) fn from_store<E: StoreFailure>(e: E) -> Self {
        if e.is_conflict() {
            LifecycleError::Conflict(e.to_string())
        } else if e.is_not_found() {
            LifecycleError::NotFound(e.to_string())
        } else if e.is_invalid() {
            LifecycleError::Validation(e.to_string())
        } else {
            LifecycleError::Store(e.to_string())
        }
    }
}

impl From<DomainError> for LifecycleError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => LifecycleError::Validation(msg),
            DomainError::InvalidTransition(msg) => LifecycleError::Conflict(msg),
        }
    }
}

impl From<EngineError> for LifecycleError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Domain(d) => d.into(),
            EngineError::Config(msg) => LifecycleError::Config(msg),
            other => LifecycleError::Engine(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    struct Rejected;

    impl fmt::Display for Rejected {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "rejected")
        }
    }

    impl StoreFailure for Rejected {
        fn is_conflict(&self) -> bool {
            false
        }

        fn is_invalid(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_invalid_store_data_is_validation() {
        assert!(matches!(LifecycleError::from_store(Rejected), LifecycleError::Validation(_)));
    }
}
