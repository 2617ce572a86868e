//! Fight evaluation and submission commands.

use super::Lifecycle;
use crate::cli::{FightArgs, SubmitArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use raidledger_domain::SubmissionChannel;
use raidledger_engine::EvaluationFlags;

/// Execute the evaluate command.
pub fn execute_evaluate(args: FightArgs, lifecycle: &mut Lifecycle, formatter: &Formatter) -> Result<()> {
    let evaluation = lifecycle.evaluate(&args.fight, flags(&args))?;
    println!("{}", formatter.format_evaluation(&evaluation)?);
    Ok(())
}

/// Execute the submit command.
pub fn execute_submit(
    args: SubmitArgs,
    lifecycle: &mut Lifecycle,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let channel = SubmissionChannel::parse(&args.channel)?;
    let submitted_by = args.by.as_deref().unwrap_or(&config.settings.operator);

    let submission = lifecycle.submit(
        &args.fight.fight,
        submitted_by,
        channel,
        flags(&args.fight),
        args.note,
    )?;

    if submission.is_open() {
        println!("{}", formatter.success(&format!("Submission queued: {}", submission.id)));
    } else {
        println!("{}", formatter.warning("No points events, nothing queued for review"));
    }
    println!("{}", formatter.format_submission(&submission)?);
    Ok(())
}

fn flags(args: &FightArgs) -> EvaluationFlags {
    EvaluationFlags {
        is_fc_pf: args.pf,
        is_static: args.is_static,
    }
}
