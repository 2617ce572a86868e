//! Error types for domain-level parsing and validation

use thiserror::Error;

/// Errors raised while constructing or transitioning domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed identifier, code, or reference
    #[error("Validation error: {0}")]
    Validation(String),

    /// A status transition that the lifecycle does not allow
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl DomainError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}
