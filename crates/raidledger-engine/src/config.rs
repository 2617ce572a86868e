//! Rule engine configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Tunables for the points rules
///
/// # Examples
///
/// ```
/// use raidledger_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.party_threshold, 4);
/// assert_eq!(config.prior_clear_buffer_secs, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Matched roster members needed for a "full or partial FC party"
    /// Default: 4
    pub party_threshold: usize,

    /// Clears this close before the fight start count as the same kill
    /// Default: 60 seconds
    pub prior_clear_buffer_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            party_threshold: 4,
            prior_clear_buffer_secs: 60,
        }
    }
}

impl EngineConfig {
    /// Parse from TOML, validating the result
    pub fn from_toml(s: &str) -> Result<Self, EngineError> {
        let config: EngineConfig =
            toml::from_str(s).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Reject values that would make the rules meaningless
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.party_threshold == 0 || self.party_threshold > 8 {
            return Err(EngineError::Config(format!(
                "party_threshold must be between 1 and 8, got {}",
                self.party_threshold
            )));
        }
        if self.prior_clear_buffer_secs < 0 {
            return Err(EngineError::Config(format!(
                "prior_clear_buffer_secs must not be negative, got {}",
                self.prior_clear_buffer_secs
            )));
        }
        Ok(())
    }

    /// Safety buffer as a duration
    pub fn prior_clear_buffer(&self) -> Duration {
        Duration::seconds(self.prior_clear_buffer_secs)
    }
}
