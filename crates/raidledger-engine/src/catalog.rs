//! Curated content lists, tiers and first-clear maps
//!
//! The five high-end lists are disjoint by construction; classification
//! walks them in a fixed order and the first match wins.

use raidledger_domain::{Encounter, EncounterId, PointsCategory, TierId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use crate::EngineError;

/// High-end content list an encounter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Extreme trials
    Extreme,
    /// Current unreal trial
    Unreal,
    /// Current savage raid tier
    Savage,
    /// Variant/criterion dungeons
    Criterion,
    /// Ultimate raids
    Ultimate,
}

impl ContentKind {
    /// Participation category awarded for this kind of content
    pub fn category(self) -> PointsCategory {
        match self {
            ContentKind::Extreme => PointsCategory::FcExtreme,
            ContentKind::Unreal => PointsCategory::FcUnreal,
            ContentKind::Savage => PointsCategory::FcSavage,
            ContentKind::Criterion => PointsCategory::FcCriterion,
            ContentKind::Ultimate => PointsCategory::FcUltimate,
        }
    }

    /// Label used in event descriptions
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Extreme => "Extreme",
            ContentKind::Unreal => "Unreal",
            ContentKind::Savage => "Savage",
            ContentKind::Criterion => "Criterion",
            ContentKind::Ultimate => "Ultimate",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A content season sharing one ledger scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefinition {
    /// Tier identifier
    pub id: TierId,

    /// Encounter names in this tier, in progression order
    #[serde(default)]
    pub encounters: Vec<String>,

    /// Encounter name to one-time first-clear category
    #[serde(default)]
    pub first_clears: BTreeMap<String, PointsCategory>,
}

/// The curated encounter catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentCatalog {
    /// Extreme trials
    pub extremes: Vec<Encounter>,
    /// Unreal trials
    pub unreals: Vec<Encounter>,
    /// Savage floors, including echo variants
    pub savages: Vec<Encounter>,
    /// Criterion dungeons
    pub criterions: Vec<Encounter>,
    /// Ultimates, one variant per release
    pub ultimates: Vec<Encounter>,
    /// Tier definitions
    pub tiers: Vec<TierDefinition>,
}

impl ContentCatalog {
    /// Load a catalog from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::Config(format!("Failed to read catalog {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a catalog
    pub fn from_toml(s: &str) -> Result<Self, EngineError> {
        let catalog: ContentCatalog =
            toml::from_str(s).map_err(|e| EngineError::Config(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that ids are unique and lists are disjoint
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut ids = BTreeSet::new();
        let mut keys = BTreeMap::new();
        for (kind, encounter) in self.lists().flat_map(|(k, l)| l.iter().map(move |e| (k, e))) {
            if !ids.insert(encounter.id.clone()) {
                return Err(EngineError::Config(format!("Duplicate encounter id {}", encounter.id)));
            }
            if let Some(other) = keys.insert(encounter.key(), kind) {
                if other != kind {
                    return Err(EngineError::Config(format!(
                        "Encounter {} is listed as both {} and {}",
                        encounter.id, other, kind
                    )));
                }
            }
        }

        let names: BTreeSet<&str> = self.all_encounters().map(|e| e.name.as_str()).collect();
        for tier in &self.tiers {
            for name in tier.first_clears.keys() {
                if !names.contains(name.as_str()) {
                    return Err(EngineError::Config(format!(
                        "Tier {} maps unknown encounter {}",
                        tier.id, name
                    )));
                }
            }
            if let Some(category) = tier.first_clears.values().find(|c| !c.is_one_time()) {
                return Err(EngineError::Config(format!(
                    "Tier {} uses repeatable category {} as a first clear",
                    tier.id, category
                )));
            }
        }
        Ok(())
    }

    fn lists(&self) -> impl Iterator<Item = (ContentKind, &Vec<Encounter>)> {
        [
            (ContentKind::Extreme, &self.extremes),
            (ContentKind::Unreal, &self.unreals),
            (ContentKind::Savage, &self.savages),
            (ContentKind::Criterion, &self.criterions),
            (ContentKind::Ultimate, &self.ultimates),
        ]
        .into_iter()
    }

    /// Every variant in the catalog
    pub fn all_encounters(&self) -> impl Iterator<Item = &Encounter> {
        self.lists().flat_map(|(_, list)| list.iter())
    }

    /// Find which high-end list a fight belongs to
    pub fn classify(&self, boss_id: u32, difficulty_id: Option<u32>) -> Option<(ContentKind, &Encounter)> {
        self.lists().find_map(|(kind, list)| {
            list.iter()
                .find(|e| !e.is_echo && e.matches(boss_id, difficulty_id))
                .or_else(|| list.iter().find(|e| e.matches(boss_id, difficulty_id)))
                .map(|e| (kind, e))
        })
    }

    /// Ids of every variant sharing an encounter name (echo included)
    pub fn variants_named(&self, name: &str) -> Vec<EncounterId> {
        self.all_encounters()
            .filter(|e| e.name == name)
            .map(|e| e.id.clone())
            .collect()
    }

    /// Look up a tier definition
    pub fn tier(&self, id: &TierId) -> Option<&TierDefinition> {
        self.tiers.iter().find(|t| &t.id == id)
    }

    /// One-time category for first-clearing `encounter_name` in `tier`
    pub fn first_clear_category(&self, tier: &TierId, encounter_name: &str) -> Option<PointsCategory> {
        self.tier(tier)?.first_clears.get(encounter_name).copied()
    }
}

impl Default for ContentCatalog {
    fn default() -> Self {
        let extremes = vec![
            Encounter::new("EW_EX_7", "ZEROMUS", 1070),
            Encounter::new("EW_EX_6", "GOLBEZ", 1069),
            Encounter::new("EW_EX_5", "RUBICANTE", 1067),
            Encounter::new("EW_EX_4", "BARBARICCIA", 1066),
            Encounter::new("EW_EX_3", "ENDSINGER", 1063),
            Encounter::new("EW_EX_2", "HYDAELYN", 1059),
            Encounter::new("EW_EX_1", "ZODIARK", 1058),
        ];

        let unreals = vec![Encounter::new("EW_UNREAL_5", "THORDAN", 3008)];

        let mut savages = Vec::new();
        for (name, boss_id) in [("P9S", 88), ("P10S", 89), ("P11S", 90), ("P12S_P1", 91), ("P12S", 92)] {
            savages.push(Encounter::new(name, name, boss_id).with_difficulty(101));
            savages.push(
                Encounter::new(&format!("{}_ECHO", name), name, boss_id)
                    .with_difficulty(101)
                    .echo(13),
            );
        }

        let criterions = vec![
            Encounter::new("EW_CRIT_1", "ASS", 4533).with_difficulty(10),
            Encounter::new("EW_CRIT_2", "AMR", 4536).with_difficulty(10),
            Encounter::new("EW_CRIT_3", "AAI", 4538).with_difficulty(10),
        ];

        let ultimates = vec![
            Encounter::new("UWU_EW", "UWU", 1061),
            Encounter::new("UWU_SHB", "UWU", 1048),
            Encounter::new("UWU_SB", "UWU", 1042),
            Encounter::new("UCOB_EW", "UCOB", 1060),
            Encounter::new("UCOB_SHB", "UCOB", 1047),
            Encounter::new("UCOB_SB", "UCOB", 1039),
            Encounter::new("TEA_EW", "TEA", 1062),
            Encounter::new("TEA_SHB", "TEA", 1050),
            Encounter::new("DSR_EW", "DSR", 1065),
            Encounter::new("TOP_EW", "TOP", 1068),
        ];

        let anabaseios = TierDefinition {
            id: TierId::from_static("ANABASEIOS"),
            encounters: ["P9S", "P10S", "P11S", "P12S_P1", "P12S"].map(String::from).to_vec(),
            first_clears: BTreeMap::from([
                ("P9S".to_string(), PointsCategory::Savage1),
                ("P10S".to_string(), PointsCategory::Savage2),
                ("P11S".to_string(), PointsCategory::Savage3),
                ("P12S_P1".to_string(), PointsCategory::Savage4Door),
                ("P12S".to_string(), PointsCategory::Savage4Final),
            ]),
        };
        let ultimate = TierDefinition {
            id: TierId::from_static("ULTIMATE"),
            encounters: ["UCOB", "UWU", "TEA", "DSR", "TOP"].map(String::from).to_vec(),
            first_clears: BTreeMap::new(),
        };

        Self {
            extremes,
            unreals,
            savages,
            criterions,
            ultimates,
            tiers: vec![anabaseios, ultimate],
        }
    }
}
