//! Command implementations.

pub mod clears;
pub mod fight;
pub mod ingest;
pub mod ledger;
pub mod manual;
pub mod review;

pub use self::clears::{execute_clear_order, execute_clear_rates};
pub use self::fight::{execute_evaluate, execute_submit};
pub use self::ingest::execute_ingest;
pub use self::ledger::{execute_leaderboard, execute_remove};
pub use self::manual::execute_submit_manual;
pub use self::review::{execute_pending, execute_review, execute_show};

use crate::config::Config;
use crate::resolver::FileFightResolver;
use raidledger_domain::traits::ClearHistoryStore;
use raidledger_domain::{Member, TierId};
use raidledger_lifecycle::SubmissionLifecycle;
use raidledger_store::SqliteStore;

/// The lifecycle as wired by the CLI: SQLite store, fights file, roster snapshot.
pub type Lifecycle = SubmissionLifecycle<SqliteStore, FileFightResolver, Vec<Member>>;

/// Parse an optional `--tier` value.
pub(crate) fn parse_tier(tier: Option<&str>) -> crate::Result<Option<TierId>> {
    Ok(tier.map(str::parse::<TierId>).transpose()?)
}

/// Open the configured database and wire it into a lifecycle.
///
/// The roster provider is the roster snapshot stored by the last ingest.
/// Catalog encounters are registered on every open.
pub fn open(config: &Config) -> crate::Result<Lifecycle> {
    if let Some(parent) = config.database.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = SqliteStore::new(&config.database)?;
    let roster = store.roster()?;
    let catalog = config.load_catalog()?;

    let mut lifecycle = Lifecycle::new(
        store,
        FileFightResolver::new(&config.fights),
        roster,
        catalog,
        config.lifecycle.clone(),
    )?;
    let registered = lifecycle.register_catalog()?;
    tracing::debug!(
        database = %config.database.display(),
        encounters = registered,
        "store ready"
    );
    Ok(lifecycle)
}
