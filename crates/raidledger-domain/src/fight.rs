//! Fight references, resolved fight data, and fight signatures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::DomainError;

/// Pointer to one fight inside a raid-log report
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FightRef {
    /// Report code
    pub report_id: String,

    /// Fight index within the report
    pub fight_id: u32,
}

impl FightRef {
    /// Create a reference from its parts
    pub fn new(report_id: impl Into<String>, fight_id: u32) -> Self {
        Self {
            report_id: report_id.into(),
            fight_id,
        }
    }

    /// Parse a report URL or the compact `<report>#<fight>` form
    ///
    /// Accepted:
    /// - `https://www.fflogs.com/reports/<report>#fight=<n>&type=damage-done`
    /// - `<report>#<n>`
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        let (head, fragment) = raw
            .split_once('#')
            .ok_or_else(|| DomainError::validation(format!("Fight reference has no fight fragment: {}", raw)))?;

        let report_id = match head.find("/reports/") {
            Some(idx) => {
                let rest = &head[idx + "/reports/".len()..];
                rest.split(['?', '/']).next().unwrap_or_default()
            }
            None if head.contains('/') || head.contains(':') => {
                return Err(DomainError::validation(format!(
                    "Fight URL path does not contain /reports/<code>: {}",
                    raw
                )));
            }
            None => head,
        };
        if report_id.is_empty() || !report_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::validation(format!("Invalid report code in: {}", raw)));
        }

        let fight = if fragment.chars().all(|c| c.is_ascii_digit()) {
            fragment
        } else {
            fragment
                .split('&')
                .find_map(|param| param.strip_prefix("fight="))
                .ok_or_else(|| DomainError::validation(format!("Fight fragment does not contain fight=<n>: {}", raw)))?
        };
        let fight_id = fight
            .parse::<u32>()
            .map_err(|_| DomainError::validation(format!("Invalid fight index '{}' in: {}", fight, raw)))?;

        Ok(Self::new(report_id, fight_id))
    }
}

impl fmt::Display for FightRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.report_id, self.fight_id)
    }
}

impl std::str::FromStr for FightRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A fight as resolved by the raid-log provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightData {
    /// Report code
    pub report_id: String,

    /// Fight index within the report
    pub fight_id: u32,

    /// Provider boss id
    pub boss_id: u32,

    /// Provider difficulty id
    #[serde(default)]
    pub difficulty_id: Option<u32>,

    /// Pull start time
    pub start_time: DateTime<Utc>,

    /// Names of every player in the fight
    pub participant_names: Vec<String>,
}

impl FightData {
    /// Reference pointing back at this fight
    pub fn fight_ref(&self) -> FightRef {
        FightRef::new(self.report_id.clone(), self.fight_id)
    }
}

/// Advisory hash for spotting likely-duplicate submissions
///
/// Same people in the same content give the same signature, regardless of
/// participant order. Never used to block a submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FightSignature(String);

impl FightSignature {
    /// Compute the signature of a set of names in a given encounter
    pub fn compute<S: AsRef<str>>(names: &[S], boss_id: u32, difficulty_id: Option<u32>) -> Self {
        let mut sorted: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        sorted.sort_unstable();

        let mut hasher = Sha256::new();
        for name in &sorted {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(boss_id.to_be_bytes());
        match difficulty_id {
            Some(d) => {
                hasher.update([1u8]);
                hasher.update(d.to_be_bytes());
            }
            None => hasher.update([0u8]),
        }

        let digest = hasher.finalize();
        Self(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Hex form of the signature
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FightSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_url() {
        let r = FightRef::parse("https://www.fflogs.com/reports/W9VNKackfztR13g2#fight=16&type=damage-done").unwrap();
        assert_eq!(r, FightRef::new("W9VNKackfztR13g2", 16));
    }

    #[test]
    fn test_parse_fight_param_not_first() {
        let r = FightRef::parse("https://www.fflogs.com/reports/zmZg9tHFj4JaQ8Lr#type=damage-done&fight=1").unwrap();
        assert_eq!(r.fight_id, 1);
    }

    #[test]
    fn test_parse_compact_form() {
        let r: FightRef = "fKHn6F1a9jrX4g3D#11".parse().unwrap();
        assert_eq!(r, FightRef::new("fKHn6F1a9jrX4g3D", 11));
        assert_eq!(r.to_string(), "fKHn6F1a9jrX4g3D#11");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(FightRef::parse("").is_err());
        assert!(FightRef::parse("https://www.fflogs.com/reports/abc").is_err());
        assert!(FightRef::parse("https://example.com/other/abc#fight=1").is_err());
        assert!(FightRef::parse("https://www.fflogs.com/reports/abc#type=damage-done").is_err());
        assert!(FightRef::parse("abc#fight=last").is_err());
    }

    #[test]
    fn test_signature_ignores_name_order() {
        let a = FightSignature::compute(&["Amy A", "Bob B"], 92, Some(101));
        let b = FightSignature::compute(&["Bob B", "Amy A"], 92, Some(101));
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_signature_depends_on_encounter() {
        let a = FightSignature::compute(&["Amy A"], 92, Some(101));
        assert_ne!(a, FightSignature::compute(&["Amy A"], 91, Some(101)));
        assert_ne!(a, FightSignature::compute(&["Amy A"], 92, Some(100)));
        assert_ne!(a, FightSignature::compute(&["Amy A"], 92, None));
    }
}
