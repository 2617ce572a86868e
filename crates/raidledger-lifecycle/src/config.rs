//! Configuration for submission lifecycle operations
//!
//! Selects the tier that evaluations and reviews commit into, how a second
//! review of a closed submission is treated, and the engine tunables.

use raidledger_domain::TierId;
use raidledger_engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::LifecycleError;

/// What `review` does with a submission that is already closed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReviewPolicy {
    /// Fail with a conflict
    #[default]
    Reject,
    /// Return the stored submission unchanged
    NoOp,
}

/// Configuration for the submission lifecycle
///
/// # Examples
///
/// ```
/// use raidledger_lifecycle::{ClosedReviewPolicy, LifecycleConfig};
///
/// let config = LifecycleConfig::default();
/// assert_eq!(config.current_tier.as_str(), "ANABASEIOS");
/// assert_eq!(config.closed_review_policy, ClosedReviewPolicy::Reject);
///
/// // Re-running reviews from a script
/// let config = LifecycleConfig::lenient();
/// assert_eq!(config.closed_review_policy, ClosedReviewPolicy::NoOp);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Tier new submissions are evaluated and committed in
    /// Default: ANABASEIOS
    #[serde(default = "default_tier")]
    pub current_tier: TierId,

    /// Treatment of reviews naming a closed submission
    /// Default: reject
    #[serde(default)]
    pub closed_review_policy: ClosedReviewPolicy,

    /// Rule engine tunables
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_tier() -> TierId {
    TierId::from_static("ANABASEIOS")
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            current_tier: default_tier(),
            closed_review_policy: ClosedReviewPolicy::Reject,
            engine: EngineConfig::default(),
        }
    }
}

impl LifecycleConfig {
    /// Lenient configuration: closed-submission reviews are no-ops
    pub fn lenient() -> Self {
        Self {
            closed_review_policy: ClosedReviewPolicy::NoOp,
            ..Self::default()
        }
    }

    /// Default configuration scoped to another tier
    pub fn for_tier(tier: TierId) -> Self {
        Self {
            current_tier: tier,
            ..Self::default()
        }
    }

    /// Parse from TOML, validating the result
    pub fn from_toml(s: &str) -> Result<Self, LifecycleError> {
        let config: LifecycleConfig =
            toml::from_str(s).map_err(|e| LifecycleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, LifecycleError> {
        toml::to_string(self).map_err(|e| LifecycleError::Config(e.to_string()))
    }

    /// Validate nested configuration
    pub fn validate(&self) -> Result<(), LifecycleError> {
        self.engine.validate()?;
        Ok(())
    }
}
