//! Raidledger CLI library.
//!
//! This library provides the core functionality for the `raidledger`
//! command-line interface: configuration management, the file-backed fight
//! resolver, command execution, and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod resolver;

pub use cli::{Cli, Command};
pub use commands::Lifecycle;
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use resolver::FileFightResolver;
