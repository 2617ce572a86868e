//! Ingest command implementation.

use super::Lifecycle;
use crate::cli::IngestArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use raidledger_domain::{Clear, Member};
use serde::Deserialize;
use std::fs;
use std::io::{self, Read};

/// Roster snapshot and clear facts, as produced by the fetcher.
#[derive(Debug, Default, Deserialize)]
pub struct IngestDocument {
    /// Full current roster; replaces the stored snapshot when non-empty
    #[serde(default)]
    pub roster: Vec<Member>,

    /// Clear facts; duplicates of stored clears are ignored
    #[serde(default)]
    pub clears: Vec<Clear>,
}

/// Counts reported after an ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Members in the new roster snapshot (0 if unchanged)
    pub members: usize,
    /// Clears newly stored
    pub inserted: usize,
    /// Clears already present
    pub duplicates: usize,
}

/// Execute the ingest command.
pub fn execute_ingest(args: IngestArgs, lifecycle: &mut Lifecycle, formatter: &Formatter) -> Result<()> {
    let json_data = if args.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else if let Some(file_path) = args.file {
        fs::read_to_string(file_path)?
    } else {
        return Err(CliError::InvalidInput(
            "Must specify either --file or --stdin".to_string(),
        ));
    };

    let document: IngestDocument = serde_json::from_str(&json_data)?;
    let summary = ingest(lifecycle, &document)?;

    println!(
        "{}",
        formatter.success(&format!(
            "Ingested {} member(s), {} new clear(s), {} duplicate(s) ignored",
            summary.members, summary.inserted, summary.duplicates
        ))
    );
    Ok(())
}

/// Store a document's roster and clears in one transaction.
///
/// A clear of an unregistered encounter rejects the whole document.
pub fn ingest(lifecycle: &mut Lifecycle, document: &IngestDocument) -> Result<IngestSummary> {
    if document.roster.is_empty() && document.clears.is_empty() {
        return Err(CliError::InvalidInput("Nothing to ingest".to_string()));
    }

    let inserted = lifecycle
        .store_mut()
        .ingest(&document.roster, &document.clears)?;

    let summary = IngestSummary {
        members: document.roster.len(),
        inserted,
        duplicates: document.clears.len() - inserted,
    };
    tracing::info!(
        members = summary.members,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        "ingest complete"
    );
    Ok(summary)
}
