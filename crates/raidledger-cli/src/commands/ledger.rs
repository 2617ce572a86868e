//! Ledger commands.

use super::{parse_tier, Lifecycle};
use crate::cli::{RemoveArgs, TierArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use raidledger_domain::traits::ClearHistoryStore;
use raidledger_domain::{EventId, MemberId};

/// Execute the leaderboard command.
pub fn execute_leaderboard(args: TierArgs, lifecycle: &Lifecycle, formatter: &Formatter) -> Result<()> {
    let tier = parse_tier(args.tier.as_deref())?;
    let entries = lifecycle.leaderboard(tier.as_ref())?;
    let roster = lifecycle.store().roster()?;
    println!("{}", formatter.format_leaderboard(&entries, &roster)?);
    Ok(())
}

/// Execute the remove command.
pub fn execute_remove(args: RemoveArgs, lifecycle: &mut Lifecycle, formatter: &Formatter) -> Result<()> {
    let tier = parse_tier(args.tier.tier.as_deref())?
        .unwrap_or_else(|| lifecycle.config().current_tier.clone());
    let event_ids = args
        .events
        .iter()
        .map(|raw| raw.parse::<EventId>().map_err(CliError::from))
        .collect::<Result<Vec<_>>>()?;

    let removed = lifecycle.remove_points_events(&tier, MemberId(args.member), &event_ids)?;

    if removed.is_empty() {
        println!("{}", formatter.info("No matching events in the ledger, nothing removed"));
        return Ok(());
    }
    println!(
        "{}",
        formatter.success(&format!("Removed {} event(s) from member {}", removed.len(), args.member))
    );
    println!("{}", formatter.format_events(&removed)?);
    Ok(())
}
