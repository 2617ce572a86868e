//! Clear-history query commands.

use super::Lifecycle;
use crate::cli::{ClearOrderArgs, ClearRatesArgs};
use crate::error::Result;
use crate::output::Formatter;

/// Execute the clear-rates command.
pub fn execute_clear_rates(
    args: ClearRatesArgs,
    lifecycle: &Lifecycle,
    formatter: &Formatter,
) -> Result<()> {
    let rates = lifecycle.clear_rates(args.echo)?;
    println!("{}", formatter.format_clear_rates(&rates)?);
    Ok(())
}

/// Execute the clear-order command.
pub fn execute_clear_order(
    args: ClearOrderArgs,
    lifecycle: &Lifecycle,
    formatter: &Formatter,
) -> Result<()> {
    let buckets = lifecycle.clear_order(&args.encounter, args.echo)?;
    println!(
        "{}",
        formatter.format_clear_order(&args.encounter, &buckets, args.cumulative)?
    );
    Ok(())
}
