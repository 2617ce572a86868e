//! Points rule evaluation
//!
//! Rules run in a fixed order over the same matched-member set. Later rules
//! never look at events produced by earlier ones.

use raidledger_domain::traits::{ClearHistoryStore, LedgerStore};
use raidledger_domain::{
    Encounter, FightData, FightRef, FightSignature, Member, MemberId, PointsCategory, PointsEvent,
    TierId,
};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::{ContentCatalog, EngineConfig, EngineError};

/// How the fight was submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationFlags {
    /// The fight came from an FC party-finder listing
    pub is_fc_pf: bool,

    /// The party is a static (excluded from high-end party points)
    pub is_static: bool,
}

/// Why a rule produced nothing (or less than it could have)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationNote {
    /// Participants that are not on the roster
    NotOnRoster(Vec<String>),

    /// FC-PF rule skipped
    NotFcPf,

    /// High-end party rule skipped for a static
    StaticExcluded,

    /// Fight matched none of the curated lists
    NotHighEndContent {
        /// Provider boss id
        boss_id: u32,
        /// Provider difficulty id
        difficulty_id: Option<u32>,
    },

    /// Not enough roster members for a party award
    BelowPartyThreshold {
        /// Roster members in the fight
        matched: usize,
        /// Required count
        required: usize,
    },

    /// Encounter has no first-clear category in the tier
    NoFirstClearCategory {
        /// Encounter name
        encounter: String,
        /// Evaluation tier
        tier: TierId,
    },

    /// A first-clearee already holds the one-time category
    AlreadyAwarded {
        /// Member
        member_id: MemberId,
        /// Category already in the ledger
        category: PointsCategory,
    },

    /// Nobody earned a first clear, so veterans get nothing
    NoFirstClearees {
        /// Encounter name
        encounter: String,
    },
}

impl fmt::Display for EvaluationNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationNote::NotOnRoster(names) => {
                write!(f, "Not in FC roster, skipped: {}", names.join(", "))
            }
            EvaluationNote::NotFcPf => write!(f, "Not an FC PF submission, skipped"),
            EvaluationNote::StaticExcluded => {
                write!(f, "Static party, high-end content points skipped")
            }
            EvaluationNote::NotHighEndContent { boss_id, difficulty_id } => write!(
                f,
                "Not high-end content (boss {}, difficulty {}), no party points",
                boss_id,
                difficulty_id.map(|d| d.to_string()).unwrap_or_else(|| "none".into())
            ),
            EvaluationNote::BelowPartyThreshold { matched, required } => write!(
                f,
                "Not a full or partial FC party ({} of {} required members)",
                matched, required
            ),
            EvaluationNote::NoFirstClearCategory { encounter, tier } => {
                write!(f, "{} has no first-clear category in {}", encounter, tier)
            }
            EvaluationNote::AlreadyAwarded { member_id, category } => {
                write!(f, "Member {} already awarded {}, skipped", member_id, category)
            }
            EvaluationNote::NoFirstClearees { encounter } => write!(
                f,
                "No first clears of {}, veteran points not awarded",
                encounter
            ),
        }
    }
}

/// Output of one evaluation
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Fight that was evaluated
    pub fight: FightRef,

    /// Ledger scope the events are meant for
    pub tier: TierId,

    /// Catalog entry the fight matched, if any
    pub encounter: Option<Encounter>,

    /// Roster members found in the fight
    pub matched: Vec<Member>,

    /// Candidate events, all pending
    pub events: Vec<PointsEvent>,

    /// Rationale for skipped rules
    pub notes: Vec<EvaluationNote>,

    /// Advisory duplicate-detection hash
    pub fight_signature: FightSignature,
}

impl Evaluation {
    /// Notes rendered as text
    pub fn note_lines(&self) -> Vec<String> {
        self.notes.iter().map(ToString::to_string).collect()
    }

    /// Events of one category
    pub fn events_in(&self, category: PointsCategory) -> impl Iterator<Item = &PointsEvent> {
        self.events.iter().filter(move |e| e.category == category)
    }
}

/// Turns a resolved fight into candidate points events
#[derive(Debug, Clone)]
pub struct PointsRuleEngine {
    config: EngineConfig,
    catalog: ContentCatalog,
}

impl PointsRuleEngine {
    /// Create an engine, validating configuration and catalog
    pub fn new(config: EngineConfig, catalog: ContentCatalog) -> Result<Self, EngineError> {
        config.validate()?;
        catalog.validate()?;
        Ok(Self { config, catalog })
    }

    /// Engine with default configuration and the built-in catalog
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
            catalog: ContentCatalog::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active catalog
    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    /// Evaluate a fight
    ///
    /// Reads clear history and ledgers but never writes. Expected skips are
    /// reported in [`Evaluation::notes`], not as errors.
    pub fn evaluate<S>(
        &self,
        fight: &FightData,
        roster: &[Member],
        tier: &TierId,
        flags: EvaluationFlags,
        store: &S,
    ) -> Result<Evaluation, EngineError>
    where
        S: ClearHistoryStore + LedgerStore,
    {
        let fight_ref = fight.fight_ref();
        let mut notes = Vec::new();
        let mut events = Vec::new();

        // 1. Roster match
        let matched = self.match_roster(fight, roster, &mut notes);
        let encounter = self
            .catalog
            .classify(fight.boss_id, fight.difficulty_id)
            .map(|(kind, e)| (kind, e.clone()));

        // 2. FC-PF participation
        if flags.is_fc_pf {
            for member in &matched {
                events.push(PointsEvent::pending(
                    member.id,
                    PointsCategory::FcPf,
                    format!("FC PF: {}", fight_ref),
                )?);
            }
        } else {
            notes.push(EvaluationNote::NotFcPf);
        }

        // 3. High-end content party
        if flags.is_static {
            tracing::debug!(fight = %fight_ref, "static party, skipping high-end rule");
            notes.push(EvaluationNote::StaticExcluded);
        } else {
            match &encounter {
                None => {
                    tracing::info!(fight = %fight_ref, boss_id = fight.boss_id, "not high-end content");
                    notes.push(EvaluationNote::NotHighEndContent {
                        boss_id: fight.boss_id,
                        difficulty_id: fight.difficulty_id,
                    });
                }
                Some(_) if matched.len() < self.config.party_threshold => {
                    tracing::info!(
                        fight = %fight_ref,
                        matched = matched.len(),
                        "not a full or partial FC party"
                    );
                    notes.push(EvaluationNote::BelowPartyThreshold {
                        matched: matched.len(),
                        required: self.config.party_threshold,
                    });
                }
                Some((kind, e)) => {
                    for member in &matched {
                        events.push(PointsEvent::pending(
                            member.id,
                            kind.category(),
                            format!("FC {}: {}", kind, e.name),
                        )?);
                    }
                }
            }
        }

        // 4. Veteran / first clear
        if let Some((_, e)) = &encounter {
            match self.catalog.first_clear_category(tier, &e.name) {
                Some(category) => {
                    self.eval_first_clears(fight, e, category, tier, &matched, store, &mut events, &mut notes)?;
                }
                None => notes.push(EvaluationNote::NoFirstClearCategory {
                    encounter: e.name.clone(),
                    tier: tier.clone(),
                }),
            }
        }

        let names: Vec<&str> = matched.iter().map(|m| m.name.as_str()).collect();
        let fight_signature = FightSignature::compute(&names, fight.boss_id, fight.difficulty_id);

        tracing::info!(
            fight = %fight_ref,
            matched = matched.len(),
            events = events.len(),
            notes = notes.len(),
            "fight evaluated"
        );

        Ok(Evaluation {
            fight: fight_ref,
            tier: tier.clone(),
            encounter: encounter.map(|(_, e)| e),
            matched,
            events,
            notes,
            fight_signature,
        })
    }

    fn match_roster(
        &self,
        fight: &FightData,
        roster: &[Member],
        notes: &mut Vec<EvaluationNote>,
    ) -> Vec<Member> {
        let mut remaining: BTreeSet<&str> =
            fight.participant_names.iter().map(String::as_str).collect();
        let mut matched = Vec::new();
        for member in roster {
            if remaining.remove(member.name.as_str()) {
                matched.push(member.clone());
            }
        }

        if !remaining.is_empty() {
            let skipped: Vec<String> = remaining.into_iter().map(String::from).collect();
            tracing::debug!(skipped = ?skipped, "participants not on roster");
            notes.push(EvaluationNote::NotOnRoster(skipped));
        }
        matched
    }

    #[allow(clippy::too_many_arguments)]
    fn eval_first_clears<S>(
        &self,
        fight: &FightData,
        encounter: &Encounter,
        category: PointsCategory,
        tier: &TierId,
        matched: &[Member],
        store: &S,
        events: &mut Vec<PointsEvent>,
        notes: &mut Vec<EvaluationNote>,
    ) -> Result<(), EngineError>
    where
        S: ClearHistoryStore + LedgerStore,
    {
        if matched.is_empty() {
            return Ok(());
        }

        let member_ids: Vec<MemberId> = matched.iter().map(|m| m.id).collect();
        let variants = self.catalog.variants_named(&encounter.name);
        let cutoff = fight.start_time - self.config.prior_clear_buffer();
        let prior = store
            .prior_clears(&member_ids, &variants, cutoff)
            .map_err(|e| EngineError::Store(e.to_string()))?;
        let veterans: HashSet<MemberId> = prior.iter().map(|c| c.member_id).collect();

        let mut first_clears = 0;
        for member in matched.iter().filter(|m| !veterans.contains(&m.id)) {
            let ledger = store
                .get_ledger(member.id, tier)
                .map_err(|e| EngineError::Store(e.to_string()))?;
            if ledger.is_some_and(|l| l.has_one_time(category)) {
                tracing::debug!(member_id = %member.id, %category, "already awarded");
                notes.push(EvaluationNote::AlreadyAwarded {
                    member_id: member.id,
                    category,
                });
                continue;
            }
            events.push(PointsEvent::pending(
                member.id,
                category,
                format!("First clear: {}", encounter.name),
            )?);
            first_clears += 1;
        }

        if first_clears == 0 {
            notes.push(EvaluationNote::NoFirstClearees {
                encounter: encounter.name.clone(),
            });
            return Ok(());
        }

        for member in matched.iter().filter(|m| veterans.contains(&m.id)) {
            events.push(PointsEvent::pending(
                member.id,
                PointsCategory::Vet,
                format!("Veteran support: {}", encounter.name),
            )?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use raidledger_domain::{Clear, EncounterId, Job, LedgerRecord};
    use raidledger_store::SqliteStore;

    fn anabaseios() -> TierId {
        TierId::parse("ANABASEIOS").unwrap()
    }

    fn fight_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 7, 14, 21, 0, 0).unwrap()
    }

    fn roster(n: u64) -> Vec<Member> {
        (1..=n).map(|i| Member::new(i, format!("Member {}", i), 1)).collect()
    }

    fn fight(boss_id: u32, difficulty_id: Option<u32>, names: &[&str]) -> FightData {
        FightData {
            report_id: "aBcD1234".to_string(),
            fight_id: 12,
            boss_id,
            difficulty_id,
            start_time: fight_start(),
            participant_names: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn store() -> SqliteStore {
        let mut store = SqliteStore::in_memory().unwrap();
        let encounters: Vec<Encounter> = ContentCatalog::default().all_encounters().cloned().collect();
        store.register_encounters(&encounters).unwrap();
        store
    }

    fn prior_clear(store: &mut SqliteStore, member: u64, encounter: &str, at: DateTime<Utc>) {
        store
            .record_clears(&[Clear {
                member_id: MemberId(member),
                encounter_id: EncounterId::from(encounter),
                start_time: at,
                report_id: "older".to_string(),
                report_fight_id: 1,
                job: Job("PLD".to_string()),
                locked_in: false,
            }])
            .unwrap();
    }

    fn evaluate(
        store: &SqliteStore,
        fight: &FightData,
        roster: &[Member],
        flags: EvaluationFlags,
    ) -> Evaluation {
        PointsRuleEngine::with_defaults()
            .evaluate(fight, roster, &anabaseios(), flags, store)
            .unwrap()
    }

    const FC_PF: EvaluationFlags = EvaluationFlags { is_fc_pf: true, is_static: false };
    const PLAIN: EvaluationFlags = EvaluationFlags { is_fc_pf: false, is_static: false };

    #[test]
    fn test_fc_pf_only_for_roster_members() {
        let store = store();
        let roster = vec![Member::new(1, "A", 1), Member::new(2, "B", 1)];
        let result = evaluate(&store, &fight(1, None, &["A", "B", "C"]), &roster, FC_PF);

        assert_eq!(result.events.len(), 2);
        assert!(result.events.iter().all(|e| e.category == PointsCategory::FcPf));
        let members: BTreeSet<u64> = result.events.iter().map(|e| e.member_id.value()).collect();
        assert_eq!(members, BTreeSet::from([1, 2]));
        assert!(result
            .notes
            .contains(&EvaluationNote::NotOnRoster(vec!["C".to_string()])));
    }

    #[test]
    fn test_party_threshold() {
        let store = store();
        let roster = roster(4);

        let three = evaluate(
            &store,
            &fight(88, Some(101), &["Member 1", "Member 2", "Member 3", "Rando"]),
            &roster,
            PLAIN,
        );
        assert_eq!(three.events_in(PointsCategory::FcSavage).count(), 0);
        assert!(three.notes.contains(&EvaluationNote::BelowPartyThreshold { matched: 3, required: 4 }));

        let four = evaluate(
            &store,
            &fight(88, Some(101), &["Member 1", "Member 2", "Member 3", "Member 4"]),
            &roster,
            PLAIN,
        );
        assert_eq!(four.events_in(PointsCategory::FcSavage).count(), 4);
    }

    #[test]
    fn test_static_skips_party_rule() {
        let store = store();
        let roster = roster(8);
        let names: Vec<String> = roster.iter().map(|m| m.name.clone()).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let flags = EvaluationFlags { is_fc_pf: false, is_static: true };

        let result = evaluate(&store, &fight(1070, None, &names), &roster, flags);
        assert!(result.events.is_empty());
        assert!(result.notes.contains(&EvaluationNote::StaticExcluded));
    }

    #[test]
    fn test_extreme_description() {
        let store = store();
        let roster = roster(4);
        let result = evaluate(
            &store,
            &fight(1070, Some(100), &["Member 1", "Member 2", "Member 3", "Member 4"]),
            &roster,
            PLAIN,
        );
        let extreme: Vec<_> = result.events_in(PointsCategory::FcExtreme).collect();
        assert_eq!(extreme.len(), 4);
        assert_eq!(extreme[0].description, "FC Extreme: ZEROMUS");
        assert_eq!(extreme[0].points, 10);
    }

    #[test]
    fn test_first_clears_and_veterans() {
        let mut store = store();
        let roster = roster(4);
        for m in 2..=4 {
            prior_clear(&mut store, m, "P12S", fight_start() - Duration::days(7));
        }

        let result = evaluate(
            &store,
            &fight(92, Some(101), &["Member 1", "Member 2", "Member 3", "Member 4"]),
            &roster,
            PLAIN,
        );
        let first: Vec<_> = result.events_in(PointsCategory::Savage4Final).collect();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].member_id, MemberId(1));
        assert_eq!(first[0].description, "First clear: P12S");
        assert_eq!(result.events_in(PointsCategory::Vet).count(), 3);
    }

    #[test]
    fn test_echo_clear_makes_a_veteran() {
        let mut store = store();
        let roster = roster(1);
        prior_clear(&mut store, 1, "P9S_ECHO", fight_start() - Duration::days(30));

        let result = evaluate(&store, &fight(88, Some(101), &["Member 1"]), &roster, PLAIN);
        assert_eq!(result.events_in(PointsCategory::Savage1).count(), 0);
    }

    #[test]
    fn test_no_first_clearees_means_no_veteran_points() {
        let mut store = store();
        let roster = roster(4);
        for m in 1..=4 {
            prior_clear(&mut store, m, "P10S", fight_start() - Duration::days(1));
        }

        let result = evaluate(
            &store,
            &fight(89, Some(101), &["Member 1", "Member 2", "Member 3", "Member 4"]),
            &roster,
            PLAIN,
        );
        assert_eq!(result.events_in(PointsCategory::Savage2).count(), 0);
        assert_eq!(result.events_in(PointsCategory::Vet).count(), 0);
        assert!(result.notes.contains(&EvaluationNote::NoFirstClearees { encounter: "P10S".into() }));
    }

    #[test]
    fn test_buffer_suppresses_same_kill() {
        let mut store = store();
        let roster = roster(1);
        // Recorded 30s after the pull started; inside the 60s buffer either way
        prior_clear(&mut store, 1, "P11S", fight_start() - Duration::seconds(30));

        let result = evaluate(&store, &fight(90, Some(101), &["Member 1"]), &roster, PLAIN);
        assert_eq!(result.events_in(PointsCategory::Savage3).count(), 1);
    }

    #[test]
    fn test_already_awarded_is_skipped() {
        let mut store = store();
        let roster = roster(2);
        prior_clear(&mut store, 2, "P9S", fight_start() - Duration::days(2));

        let mut ledger = LedgerRecord::new(MemberId(1), anabaseios());
        ledger.commit(&PointsEvent::pending(MemberId(1), PointsCategory::Savage1, "x").unwrap());
        store.put_ledger(&ledger).unwrap();

        let result = evaluate(&store, &fight(88, Some(101), &["Member 1", "Member 2"]), &roster, PLAIN);
        assert_eq!(result.events_in(PointsCategory::Savage1).count(), 0);
        assert_eq!(result.events_in(PointsCategory::Vet).count(), 0);
        assert!(result.notes.contains(&EvaluationNote::AlreadyAwarded {
            member_id: MemberId(1),
            category: PointsCategory::Savage1,
        }));
    }

    #[test]
    fn test_ultimate_has_no_first_clear_category() {
        let store = store();
        let roster = roster(4);
        let result = evaluate(
            &store,
            &fight(1068, Some(100), &["Member 1", "Member 2", "Member 3", "Member 4"]),
            &roster,
            PLAIN,
        );
        assert_eq!(result.events.len(), 4);
        assert!(result.events.iter().all(|e| e.category == PointsCategory::FcUltimate));
        assert!(result
            .notes
            .iter()
            .any(|n| matches!(n, EvaluationNote::NoFirstClearCategory { .. })));
    }

    #[test]
    fn test_signature_ignores_participant_order() {
        let store = store();
        let roster = roster(3);
        let a = evaluate(&store, &fight(1, None, &["Member 1", "Member 2", "Member 3"]), &roster, PLAIN);
        let b = evaluate(&store, &fight(1, None, &["Member 3", "Member 1", "Member 2", "Rando"]), &roster, PLAIN);
        assert_eq!(a.fight_signature, b.fight_signature);
    }

    #[test]
    fn test_note_text() {
        assert_eq!(EvaluationNote::NotFcPf.to_string(), "Not an FC PF submission, skipped");
        let note = EvaluationNote::BelowPartyThreshold { matched: 3, required: 4 };
        assert!(note.to_string().contains("3 of 4"));
    }
}
