//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Raidledger CLI - Track guild raid clears and review participation points.
#[derive(Debug, Parser)]
#[command(name = "raidledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RAIDLEDGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configuration
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a roster snapshot and clear facts from JSON
    Ingest(IngestArgs),

    /// Clear rate of every registered encounter
    ClearRates(ClearRatesArgs),

    /// First-clear timeline of one encounter
    ClearOrder(ClearOrderArgs),

    /// Evaluate a fight without queueing anything
    Evaluate(FightArgs),

    /// Evaluate a fight and queue it for review
    Submit(SubmitArgs),

    /// Queue administrator awards
    SubmitManual(SubmitManualArgs),

    /// Approve or deny events of a submission
    Review(ReviewArgs),

    /// List submissions awaiting review
    Pending,

    /// Show one submission
    Show(ShowArgs),

    /// Points totals for a tier
    Leaderboard(TierArgs),

    /// Remove committed events from a member's ledger
    Remove(RemoveArgs),
}

/// Arguments for the ingest command.
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// JSON file with optional `roster` and `clears` arrays
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Read the JSON document from stdin
    #[arg(long)]
    pub stdin: bool,
}

/// Arguments for the clear-rates command.
#[derive(Debug, Args)]
pub struct ClearRatesArgs {
    /// Count echo-variant clears
    #[arg(long)]
    pub echo: bool,
}

/// Arguments for the clear-order command.
#[derive(Debug, Args)]
pub struct ClearOrderArgs {
    /// Encounter name (e.g. P9S)
    pub encounter: String,

    /// Count echo-variant clears
    #[arg(long)]
    pub echo: bool,

    /// Show running totals instead of per-day members
    #[arg(long)]
    pub cumulative: bool,
}

/// Fight reference and evaluation flags.
#[derive(Debug, Args)]
pub struct FightArgs {
    /// Raid-log URL or `<report>#<fight>`
    pub fight: String,

    /// The run was an FC party-finder listing
    #[arg(long)]
    pub pf: bool,

    /// The party is a static
    #[arg(long = "static")]
    pub is_static: bool,
}

/// Arguments for the submit command.
#[derive(Debug, Args)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub fight: FightArgs,

    /// Submission channel (name or code)
    #[arg(long, default_value = "FC_BOT_FFLOGS")]
    pub channel: String,

    /// Submitter, defaulting to the configured operator
    #[arg(long)]
    pub by: Option<String>,

    /// Note for the reviewer
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Arguments for the submit-manual command.
#[derive(Debug, Args)]
pub struct SubmitManualArgs {
    /// Award as `<member>:<CATEGORY>[:<points>]`, repeatable
    #[arg(short, long = "award", required = true)]
    pub awards: Vec<String>,

    /// Description applied to every award
    #[arg(short, long)]
    pub description: Option<String>,

    /// Ledger tier, defaulting to the current tier
    #[arg(short, long)]
    pub tier: Option<String>,

    /// Submission channel (name or code)
    #[arg(long, default_value = "ADMIN_PORTAL")]
    pub channel: String,

    /// Submitter, defaulting to the configured operator
    #[arg(long)]
    pub by: Option<String>,

    /// Note for the reviewer
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Arguments for the review command.
#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// Submission ID
    pub submission: String,

    /// Event IDs to approve
    #[arg(long, value_delimiter = ',')]
    pub approve: Vec<String>,

    /// Event IDs to deny
    #[arg(long, value_delimiter = ',')]
    pub deny: Vec<String>,

    /// Approve every event still pending
    #[arg(long, conflicts_with = "approve")]
    pub approve_all: bool,

    /// Reviewer, defaulting to the configured operator
    #[arg(long)]
    pub by: Option<String>,
}

/// Arguments for the show command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Submission ID
    pub submission: String,
}

/// Optional tier selection.
#[derive(Debug, Args)]
pub struct TierArgs {
    /// Ledger tier, defaulting to the current tier
    #[arg(short, long)]
    pub tier: Option<String>,
}

/// Arguments for the remove command.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Member ID
    pub member: u64,

    /// Event IDs to remove
    #[arg(required = true, value_delimiter = ',')]
    pub events: Vec<String>,

    #[command(flatten)]
    pub tier: TierArgs,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
