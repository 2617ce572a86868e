//! File-backed fight resolution.

use crate::error::{CliError, Result};
use raidledger_domain::traits::FightResolver;
use raidledger_domain::{FightData, FightRef};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves fight references against a JSON array of [`FightData`].
///
/// The file is re-read on every lookup so a fetcher process can append to it
/// between commands. A missing or malformed file is reported as an error,
/// which the lifecycle treats as the upstream being unavailable.
#[derive(Debug, Clone)]
pub struct FileFightResolver {
    path: PathBuf,
}

impl FileFightResolver {
    /// Create a resolver over the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<FightData>> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            CliError::Config(format!("Cannot read fights file {}: {}", self.path.display(), e))
        })?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl FightResolver for FileFightResolver {
    type Error = CliError;

    fn resolve(&self, fight: &FightRef) -> Result<Option<FightData>> {
        let found = self
            .load()?
            .into_iter()
            .find(|f| f.report_id == fight.report_id && f.fight_id == fight.fight_id);
        tracing::debug!(%fight, found = found.is_some(), "fight lookup");
        Ok(found)
    }
}
