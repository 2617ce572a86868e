//! Submit-manual command implementation.

use super::{parse_tier, Lifecycle};
use crate::cli::SubmitManualArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use raidledger_domain::{MemberId, PointsCategory, SubmissionChannel};
use raidledger_lifecycle::ManualAward;

/// Execute the submit-manual command.
pub fn execute_submit_manual(
    args: SubmitManualArgs,
    lifecycle: &mut Lifecycle,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let channel = SubmissionChannel::parse(&args.channel)?;
    let tier = parse_tier(args.tier.as_deref())?;
    let submitted_by = args.by.as_deref().unwrap_or(&config.settings.operator);

    let awards = args
        .awards
        .iter()
        .map(|raw| {
            let mut award = parse_award(raw)?;
            award.description = args.description.clone();
            Ok(award)
        })
        .collect::<Result<Vec<_>>>()?;

    let submission = lifecycle.submit_manual(submitted_by, channel, tier, awards, args.note)?;

    println!("{}", formatter.success(&format!("Submission queued: {}", submission.id)));
    println!("{}", formatter.format_submission(&submission)?);
    Ok(())
}

/// Parse an award from `<member>:<CATEGORY>[:<points>]`.
///
/// The category may be given by name or numeric code.
pub fn parse_award(input: &str) -> Result<ManualAward> {
    let parts: Vec<&str> = input.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(CliError::InvalidInput(format!(
            "Invalid award '{}'. Expected '<member>:<CATEGORY>[:<points>]'",
            input
        )));
    }

    let member: u64 = parts[0]
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidInput(format!("Invalid member id '{}'", parts[0])))?;
    let category = PointsCategory::parse(parts[1].trim())?;

    let mut award = ManualAward::new(MemberId(member), category);
    if let Some(points) = parts.get(2) {
        award.points = Some(
            points
                .trim()
                .parse()
                .map_err(|_| CliError::InvalidInput(format!("Invalid points '{}'", points)))?,
        );
    }
    Ok(award)
}
