//! Encounters - addressable units of raid content

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier of an encounter variant (e.g. `P12S_ECHO`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncounterId(pub String);

impl EncounterId {
    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EncounterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of an encounter as reported by the raid-log provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EncounterKey {
    /// Provider boss/encounter id
    pub boss_id: u32,

    /// Provider difficulty id (absent for content with a single difficulty)
    pub difficulty_id: Option<u32>,

    /// Provider partition (used to separate echo-enabled clears)
    pub partition_id: Option<u32>,
}

/// A tracked encounter variant
///
/// Several variants share one human-readable `name` (the regular and the
/// echo partition of a savage floor, or an ultimate re-released across
/// expansions). Clear rates and clear order aggregate by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Encounter {
    /// Catalog identifier, unique per variant
    pub id: EncounterId,

    /// Display/grouping name (e.g. `P12S`)
    pub name: String,

    /// Provider boss id
    pub boss_id: u32,

    /// Provider difficulty id
    #[serde(default)]
    pub difficulty_id: Option<u32>,

    /// Provider partition id
    #[serde(default)]
    pub partition_id: Option<u32>,

    /// Whether clears of this variant were made with the echo buff
    #[serde(default)]
    pub is_echo: bool,
}

impl Encounter {
    /// Create a variant without difficulty or partition
    pub fn new(id: &str, name: &str, boss_id: u32) -> Self {
        Self {
            id: EncounterId::from(id),
            name: name.to_string(),
            boss_id,
            difficulty_id: None,
            partition_id: None,
            is_echo: false,
        }
    }

    /// Set the difficulty id
    pub fn with_difficulty(mut self, difficulty_id: u32) -> Self {
        self.difficulty_id = Some(difficulty_id);
        self
    }

    /// Mark as an echo variant living in the given partition
    pub fn echo(mut self, partition_id: u32) -> Self {
        self.partition_id = Some(partition_id);
        self.is_echo = true;
        self
    }

    /// Provider identity of this variant
    pub fn key(&self) -> EncounterKey {
        EncounterKey {
            boss_id: self.boss_id,
            difficulty_id: self.difficulty_id,
            partition_id: self.partition_id,
        }
    }

    /// Whether a fight with the given provider ids is this encounter
    ///
    /// A catalog entry without a difficulty matches every difficulty of its
    /// boss; otherwise both ids must be equal.
    pub fn matches(&self, boss_id: u32, difficulty_id: Option<u32>) -> bool {
        if self.boss_id != boss_id {
            return false;
        }
        match self.difficulty_id {
            None => true,
            Some(d) => difficulty_id == Some(d),
        }
    }
}

impl fmt::Display for Encounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.name,
            self.boss_id,
            self.difficulty_id.map(|d| d.to_string()).unwrap_or_else(|| "None".into()),
            self.partition_id.map(|p| p.to_string()).unwrap_or_else(|| "None".into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exact_difficulty() {
        let p12s = Encounter::new("P12S", "P12S", 92).with_difficulty(101);
        assert!(p12s.matches(92, Some(101)));
        assert!(!p12s.matches(92, Some(100)));
        assert!(!p12s.matches(92, None));
        assert!(!p12s.matches(91, Some(101)));
    }

    #[test]
    fn test_matches_without_difficulty() {
        let zeromus = Encounter::new("EW_EX_7", "ZEROMUS", 1070);
        assert!(zeromus.matches(1070, Some(100)));
        assert!(zeromus.matches(1070, None));
    }

    #[test]
    fn test_echo_variant_key() {
        let echo = Encounter::new("P9S_ECHO", "P9S", 88).with_difficulty(101).echo(13);
        assert!(echo.is_echo);
        assert_eq!(
            echo.key(),
            EncounterKey { boss_id: 88, difficulty_id: Some(101), partition_id: Some(13) }
        );
    }
}
