//! Review queue commands.

use super::Lifecycle;
use crate::cli::{ReviewArgs, ShowArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use raidledger_domain::{EventId, Submission, SubmissionId};
use std::collections::HashMap;

/// Execute the review command.
pub fn execute_review(
    args: ReviewArgs,
    lifecycle: &mut Lifecycle,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let submission_id: SubmissionId = args.submission.parse()?;
    let reviewer = args.by.as_deref().unwrap_or(&config.settings.operator);

    let approvals = if args.approve_all {
        let submission = lifecycle.get_submission(submission_id)?;
        let mut approvals = approve_pending(&submission);
        approvals.extend(decisions(&args.deny, false)?);
        approvals
    } else {
        let mut approvals = decisions(&args.approve, true)?;
        for (id, decision) in decisions(&args.deny, false)? {
            if approvals.insert(id, decision).is_some() {
                return Err(CliError::InvalidInput(format!(
                    "Event {} is both approved and denied",
                    id
                )));
            }
        }
        approvals
    };

    if approvals.is_empty() {
        return Err(CliError::InvalidInput(
            "Nothing to review. Use --approve, --deny or --approve-all".to_string(),
        ));
    }

    let submission = lifecycle.review(submission_id, &approvals, reviewer)?;

    let state = if submission.is_open() { "still open" } else { "closed" };
    println!(
        "{}",
        formatter.success(&format!("Reviewed {} event(s), submission {}", approvals.len(), state))
    );
    println!("{}", formatter.format_submission(&submission)?);
    Ok(())
}

/// Execute the pending command.
pub fn execute_pending(lifecycle: &Lifecycle, formatter: &Formatter) -> Result<()> {
    let submissions = lifecycle.pending()?;
    println!("{}", formatter.format_submissions(&submissions)?);
    Ok(())
}

/// Execute the show command.
pub fn execute_show(args: ShowArgs, lifecycle: &Lifecycle, formatter: &Formatter) -> Result<()> {
    let submission = lifecycle.get_submission(args.submission.parse()?)?;
    println!("{}", formatter.format_submission(&submission)?);
    Ok(())
}

fn decisions(ids: &[String], approve: bool) -> Result<HashMap<EventId, bool>> {
    ids.iter()
        .map(|raw| -> Result<(EventId, bool)> { Ok((raw.parse()?, approve)) })
        .collect()
}

/// Approve every pending event of a submission.
fn approve_pending(submission: &Submission) -> HashMap<EventId, bool> {
    submission.pending_events().map(|e| (e.id, true)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidledger_domain::{
        MemberId, PointsCategory, PointsEvent, PointsEventStatus, SubmissionChannel, TierId,
    };

    #[test]
    fn test_decisions_parse_ids() {
        let id = EventId::new();
        let parsed = decisions(&[id.to_string()], true).unwrap();
        assert_eq!(parsed.get(&id), Some(&true));

        assert!(decisions(&["not-a-uuid".to_string()], false).is_err());
    }

    #[test]
    fn test_approve_pending_skips_terminal_events() {
        let events = vec![
            PointsEvent::pending(MemberId(1), PointsCategory::FcPf, "FC PF").unwrap(),
            PointsEvent::pending(MemberId(2), PointsCategory::FcPf, "FC PF").unwrap(),
        ];
        let mut submission = Submission::new(
            "officer",
            SubmissionChannel::Dev,
            TierId::from_static("ANABASEIOS"),
            events,
        );
        submission.events[0].status = PointsEventStatus::Denied;

        let approvals = approve_pending(&submission);
        assert_eq!(approvals.len(), 1);
        assert_eq!(approvals.get(&submission.events[1].id), Some(&true));
    }
}
