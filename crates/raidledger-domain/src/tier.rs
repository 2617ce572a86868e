//! Tier module - content seasons that scope a points ledger

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// Identifier of a content tier (e.g. `ANABASEIOS`, `ULTIMATE`)
///
/// Every ledger record is scoped to one tier. Identifiers are upper-case
/// ASCII letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TierId(String);

impl TierId {
    /// Parse a tier identifier
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::validation("Tier identifier is empty"));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(DomainError::validation(format!("Invalid tier identifier: {}", s)));
        }
        Ok(Self(s.to_string()))
    }

    /// Built-in identifier known to be well-formed
    pub fn from_static(s: &'static str) -> Self {
        debug_assert!(Self::parse(s).is_ok(), "malformed built-in tier {}", s);
        Self(s.to_string())
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TierId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TierId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TierId> for String {
    fn from(value: TierId) -> Self {
        value.0
    }
}
