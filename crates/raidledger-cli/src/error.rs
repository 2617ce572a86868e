//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lifecycle error
    #[error(transparent)]
    Lifecycle(#[from] raidledger_lifecycle::LifecycleError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] raidledger_store::StoreError),

    /// Catalog or engine configuration error
    #[error("Engine error: {0}")]
    Engine(#[from] raidledger_engine::EngineError),

    /// Domain value rejected
    #[error(transparent)]
    Domain(#[from] raidledger_domain::DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
