//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use raidledger_engine::ContentCatalog;
use raidledger_lifecycle::LifecycleConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Content catalog override (TOML); built-in lists when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// JSON file of resolved fights
    #[serde(default = "default_fights")]
    pub fights: PathBuf,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Lifecycle and rule engine tunables
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Name recorded as submitter and reviewer
    #[serde(default = "default_operator")]
    pub operator: String,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the config file and default database.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".raidledger"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from an explicit path or the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::path()?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            Self::from_toml(&contents)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.lifecycle.validate()?;
        Ok(config)
    }

    /// Content catalog named by the config, or the built-in one.
    pub fn load_catalog(&self) -> Result<ContentCatalog> {
        match &self.catalog {
            Some(path) => Ok(ContentCatalog::from_file(path)?),
            None => Ok(ContentCatalog::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            catalog: None,
            fights: default_fights(),
            settings: Settings::default(),
            lifecycle: LifecycleConfig::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            operator: default_operator(),
        }
    }
}

fn data_file(name: &str) -> PathBuf {
    Config::home()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|_| PathBuf::from(name))
}

fn default_database() -> PathBuf {
    data_file("raidledger.db")
}

fn default_fights() -> PathBuf {
    data_file("fights.json")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_operator() -> String {
    "cli".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidledger_lifecycle::ClosedReviewPolicy;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database.ends_with("raidledger.db"));
        assert!(config.catalog.is_none());
        assert!(config.settings.color);
        assert_eq!(config.settings.operator, "cli");
        assert_eq!(config.lifecycle.current_tier.as_str(), "ANABASEIOS");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = Config::from_toml(
            r#"
            database = "/tmp/guild.db"

            [settings]
            format = "json"

            [lifecycle]
            closed_review_policy = "no_op"

            [lifecycle.engine]
            party_threshold = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.database, PathBuf::from("/tmp/guild.db"));
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.settings.color);
        assert_eq!(config.lifecycle.closed_review_policy, ClosedReviewPolicy::NoOp);
        assert_eq!(config.lifecycle.engine.party_threshold, 6);
    }

    #[test]
    fn test_invalid_engine_values_rejected() {
        let result = Config::from_toml("[lifecycle.engine]\nparty_threshold = 9");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[settings]\noperator = \"officer\"\n").unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.settings.operator, "officer");
        assert_eq!(loaded.database, Config::default().database);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Table);
    }

    #[test]
    fn test_default_catalog() {
        let catalog = Config::default().load_catalog().unwrap();
        assert!(catalog.tier(&"ANABASEIOS".parse().unwrap()).is_some());
    }
}
