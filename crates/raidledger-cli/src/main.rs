//! Raidledger CLI - Command-line front-end for the raid clear and points ledger.

use anyhow::Context;
use clap::Parser;
use raidledger_cli::commands;
use raidledger_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RAIDLEDGER_LOG` overrides the level picked by `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("RAIDLEDGER_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let mut lifecycle = commands::open(&config)
        .with_context(|| format!("opening database {}", config.database.display()))?;

    match cli.command {
        Command::Ingest(args) => commands::execute_ingest(args, &mut lifecycle, &formatter)?,
        Command::ClearRates(args) => commands::execute_clear_rates(args, &lifecycle, &formatter)?,
        Command::ClearOrder(args) => commands::execute_clear_order(args, &lifecycle, &formatter)?,
        Command::Evaluate(args) => commands::execute_evaluate(args, &mut lifecycle, &formatter)?,
        Command::Submit(args) => commands::execute_submit(args, &mut lifecycle, &config, &formatter)?,
        Command::SubmitManual(args) => {
            commands::execute_submit_manual(args, &mut lifecycle, &config, &formatter)?
        }
        Command::Review(args) => commands::execute_review(args, &mut lifecycle, &config, &formatter)?,
        Command::Pending => commands::execute_pending(&lifecycle, &formatter)?,
        Command::Show(args) => commands::execute_show(args, &lifecycle, &formatter)?,
        Command::Leaderboard(args) => commands::execute_leaderboard(args, &lifecycle, &formatter)?,
        Command::Remove(args) => commands::execute_remove(args, &mut lifecycle, &formatter)?,
    }

    tracing::debug!(metrics = %lifecycle.metrics().summary(), "done");
    Ok(())
}
