//! Submission lifecycle: evaluate, submit, review, correct

use chrono::Utc;
use raidledger_domain::traits::{
    ClearHistoryStore, FightResolver, LedgerStore, RosterProvider, SubmissionStore,
};
use raidledger_domain::{
    ClearOrderBucket, ClearRate, EventId, FightRef, LeaderboardEntry, LedgerRecord, Member,
    MemberId, PointsCategory, PointsEvent, PointsEventStatus, Submission, SubmissionChannel,
    SubmissionId, TierId,
};
use raidledger_engine::{ContentCatalog, Evaluation, EvaluationFlags, PointsRuleEngine};
use std::collections::{BTreeMap, HashMap};

use crate::{ClosedReviewPolicy, LifecycleConfig, LifecycleError, LifecycleMetrics};

/// One line of a manual award
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualAward {
    /// Recipient
    pub member_id: MemberId,

    /// Category awarded
    pub category: PointsCategory,

    /// Explicit points; required for AD_HOC, must match the table otherwise
    pub points: Option<i64>,

    /// Rationale; defaults to the category description
    pub description: Option<String>,
}

impl ManualAward {
    /// Award a category at its table points
    pub fn new(member_id: MemberId, category: PointsCategory) -> Self {
        Self {
            member_id,
            category,
            points: None,
            description: None,
        }
    }

    fn into_event(self) -> Result<PointsEvent, LifecycleError> {
        let description = self
            .description
            .unwrap_or_else(|| self.category.description().to_string());
        match (self.category.points(), self.points) {
            (None, Some(points)) => Ok(PointsEvent::with_points(
                self.member_id,
                self.category,
                points,
                description,
            )),
            (None, None) => Err(LifecycleError::Validation(format!(
                "Category {} requires explicit points",
                self.category
            ))),
            (Some(table), Some(points)) if points != table => {
                Err(LifecycleError::Validation(format!(
                    "Category {} is worth {} points, not {}",
                    self.category, table, points
                )))
            }
            (Some(_), _) => Ok(PointsEvent::pending(self.member_id, self.category, description)?),
        }
    }
}

/// Orchestrates submissions from evaluation through review into the ledger
///
/// Owns the store and its collaborators. Every mutation goes through
/// `&mut self`, so one lifecycle instance commits serially; separate
/// instances sharing a database are kept honest by the store's versioned
/// ledger writes.
///
/// # Examples
///
/// ```no_run
/// use raidledger_lifecycle::{LifecycleConfig, SubmissionLifecycle};
/// use raidledger_engine::{ContentCatalog, EvaluationFlags};
/// use raidledger_domain::{Member, SubmissionChannel};
/// # use raidledger_domain::{FightData, FightRef};
/// # use raidledger_domain::traits::FightResolver;
/// use raidledger_store::SqliteStore;
///
/// # struct Logs;
/// # impl FightResolver for Logs {
/// #     type Error = std::convert::Infallible;
/// #     fn resolve(&self, _: &FightRef) -> Result<Option<FightData>, Self::Error> { Ok(None) }
/// # }
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::new("raidledger.db")?;
/// let roster = vec![Member::new(1, "Alpha Beta", 0)];
/// let mut lifecycle = SubmissionLifecycle::new(
///     store,
///     Logs,
///     roster,
///     ContentCatalog::default(),
///     LifecycleConfig::default(),
/// )?;
///
/// let submission = lifecycle.submit(
///     "https://www.fflogs.com/reports/aBcD1234#fight=3",
///     "officer",
///     SubmissionChannel::FcBotFflogs,
///     EvaluationFlags { is_fc_pf: true, is_static: false },
///     None,
/// )?;
/// println!("{} events pending", submission.events.len());
/// # Ok(())
/// # }
/// ```
pub struct SubmissionLifecycle<S, F, R> {
    store: S,
    resolver: F,
    roster: R,
    engine: PointsRuleEngine,
    config: LifecycleConfig,
    metrics: LifecycleMetrics,
}

impl<S, F, R> SubmissionLifecycle<S, F, R>
where
    S: ClearHistoryStore + LedgerStore + SubmissionStore,
    F: FightResolver,
    R: RosterProvider,
{
    /// Create a lifecycle over a store and collaborators
    pub fn new(
        store: S,
        resolver: F,
        roster: R,
        catalog: ContentCatalog,
        config: LifecycleConfig,
    ) -> Result<Self, LifecycleError> {
        config.validate()?;
        let engine = PointsRuleEngine::new(config.engine.clone(), catalog)?;
        Ok(Self {
            store,
            resolver,
            roster,
            engine,
            config,
            metrics: LifecycleMetrics::new(),
        })
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying store, mutably (ingestion)
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Active configuration
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Counters since creation
    pub fn metrics(&self) -> &LifecycleMetrics {
        &self.metrics
    }

    /// Register every catalog encounter with the store
    pub fn register_catalog(&mut self) -> Result<usize, LifecycleError> {
        let encounters: Vec<_> = self.engine.catalog().all_encounters().cloned().collect();
        self.store
            .register_encounters(&encounters)
            .map_err(LifecycleError::from_store)?;
        Ok(encounters.len())
    }

    /// Refresh the stored roster snapshot from the roster provider
    pub fn sync_roster(&mut self) -> Result<usize, LifecycleError> {
        let members = self.current_roster()?;
        self.store
            .replace_roster(&members)
            .map_err(LifecycleError::from_store)?;
        Ok(members.len())
    }

    fn current_roster(&self) -> Result<Vec<Member>, LifecycleError> {
        self.roster
            .current()
            .map_err(|e| LifecycleError::UpstreamUnavailable(format!("Roster: {}", e)))
    }

    /// Evaluate a fight reference without side effects on ledgers or submissions
    pub fn evaluate(&mut self, fight_ref: &str, flags: EvaluationFlags) -> Result<Evaluation, LifecycleError> {
        let fight_ref = FightRef::parse(fight_ref)?;
        let fight = self
            .resolver
            .resolve(&fight_ref)
            .map_err(|e| LifecycleError::UpstreamUnavailable(format!("Fight resolver: {}", e)))?
            .ok_or_else(|| LifecycleError::NotFound(format!("Fight {}", fight_ref)))?;
        let roster = self.current_roster()?;

        let evaluation = self.engine.evaluate(
            &fight,
            &roster,
            &self.config.current_tier,
            flags,
            &self.store,
        )?;
        self.metrics.record_evaluation();
        Ok(evaluation)
    }

    /// Evaluate a fight and queue the result for review
    ///
    /// No ledger is touched. Nothing is persisted if resolution or
    /// evaluation fails.
    pub fn submit(
        &mut self,
        fight_ref: &str,
        submitted_by: &str,
        channel: SubmissionChannel,
        flags: EvaluationFlags,
        note: Option<String>,
    ) -> Result<Submission, LifecycleError> {
        let evaluation = self.evaluate(fight_ref, flags)?;
        let notes = evaluation.note_lines();

        let mut submission = Submission::new(
            submitted_by,
            channel,
            evaluation.tier,
            evaluation.events,
        );
        submission.fight = Some(evaluation.fight);
        submission.notes = notes;
        submission.notes.extend(note);

        for other in self.pending_with_signature(&evaluation.fight_signature.to_string())? {
            tracing::warn!(
                submission = %submission.id,
                duplicate_of = %other,
                "possible duplicate submission"
            );
            submission.notes.push(format!("Possible duplicate of submission {}", other));
        }
        submission.fight_signature = Some(evaluation.fight_signature);

        self.store
            .create_submission(&submission)
            .map_err(LifecycleError::from_store)?;
        self.metrics.record_submission();

        tracing::info!(
            submission = %submission.id,
            submitted_by,
            %channel,
            events = submission.events.len(),
            "fight submitted"
        );
        Ok(submission)
    }

    fn pending_with_signature(&self, signature: &str) -> Result<Vec<SubmissionId>, LifecycleError> {
        let mut matches = Vec::new();
        for entry in self.store.pending_submissions().map_err(LifecycleError::from_store)? {
            let Some(other) = self
                .store
                .get_submission(entry.submission_id)
                .map_err(LifecycleError::from_store)?
            else {
                continue;
            };
            if other.fight_signature.as_ref().is_some_and(|s| s.as_str() == signature) {
                matches.push(other.id);
            }
        }
        Ok(matches)
    }

    /// Queue administrator awards that do not come from a fight
    pub fn submit_manual(
        &mut self,
        submitted_by: &str,
        channel: SubmissionChannel,
        tier: Option<TierId>,
        awards: Vec<ManualAward>,
        note: Option<String>,
    ) -> Result<Submission, LifecycleError> {
        if awards.is_empty() {
            return Err(LifecycleError::Validation("No awards given".to_string()));
        }
        let events = awards
            .into_iter()
            .map(ManualAward::into_event)
            .collect::<Result<Vec<_>, _>>()?;

        let tier = tier.unwrap_or_else(|| self.config.current_tier.clone());
        let mut submission = Submission::new(submitted_by, channel, tier, events);
        submission.notes.extend(note);

        self.store
            .create_submission(&submission)
            .map_err(LifecycleError::from_store)?;
        self.metrics.record_submission();

        tracing::info!(
            submission = %submission.id,
            submitted_by,
            events = submission.events.len(),
            "manual awards submitted"
        );
        Ok(submission)
    }

    /// Apply reviewer decisions and commit approved events
    ///
    /// `approvals` maps event ids to approve (`true`) or deny (`false`).
    /// Events not mentioned stay pending. Ledger writes, the submission
    /// update and the queue removal commit together or not at all.
    pub fn review(
        &mut self,
        submission_id: SubmissionId,
        approvals: &HashMap<EventId, bool>,
        reviewer: &str,
    ) -> Result<Submission, LifecycleError> {
        let mut submission = self.get_submission(submission_id)?;

        if !submission.is_open() {
            return match self.config.closed_review_policy {
                ClosedReviewPolicy::Reject => Err(LifecycleError::Conflict(format!(
                    "Submission {} is already closed",
                    submission_id
                ))),
                ClosedReviewPolicy::NoOp => {
                    tracing::info!(submission = %submission_id, "closed submission, review ignored");
                    Ok(submission)
                }
            };
        }

        if let Some(unknown) = approvals
            .keys()
            .find(|id| !submission.events.iter().any(|e| &e.id == *id))
        {
            return Err(LifecycleError::Validation(format!(
                "Event {} is not part of submission {}",
                unknown, submission_id
            )));
        }

        // Approved events grouped by member, in submission order
        let mut approved: BTreeMap<MemberId, Vec<usize>> = BTreeMap::new();
        let mut resolved = Vec::new();
        for (idx, event) in submission.events.iter_mut().enumerate() {
            let Some(&approve) = approvals.get(&event.id) else {
                continue;
            };
            if event.status.is_terminal() {
                tracing::debug!(event = %event.id, status = %event.status, "already reviewed, ignored");
                continue;
            }
            resolved.push(idx);
            if approve {
                approved.entry(event.member_id).or_default().push(idx);
            } else {
                event.resolve(PointsEventStatus::Denied)?;
            }
        }

        let tier = submission.tier.clone();
        let mut ledgers = Vec::with_capacity(approved.len());
        for (member_id, indices) in &approved {
            let mut ledger = self
                .store
                .get_ledger(*member_id, &tier)
                .map_err(LifecycleError::from_store)?
                .unwrap_or_else(|| LedgerRecord::new(*member_id, tier.clone()));

            for &idx in indices {
                let event = &mut submission.events[idx];
                let status = ledger.commit(event);
                if status == PointsEventStatus::AlreadyAwarded {
                    tracing::info!(
                        member_id = %member_id,
                        category = %event.category,
                        "one-time category already awarded"
                    );
                }
                event.resolve(status)?;
            }
            ledgers.push(ledger);
        }

        submission.last_update_ts = Some(Utc::now());
        submission.last_update_by = Some(reviewer.to_string());

        if let Err(e) = self.store.commit_review(&ledgers, &submission) {
            let err = LifecycleError::from_store(e);
            if matches!(err, LifecycleError::Conflict(_)) {
                self.metrics.record_conflict();
            }
            tracing::warn!(submission = %submission_id, error = %err, "review not committed");
            return Err(err);
        }

        self.metrics.record_review();
        for &idx in &resolved {
            self.metrics.record_outcome(submission.events[idx].status);
        }

        tracing::info!(
            submission = %submission_id,
            reviewer,
            ledgers = ledgers.len(),
            closed = !submission.is_open(),
            "submission reviewed"
        );
        Ok(submission)
    }

    /// Remove committed events from a member's ledger
    ///
    /// Ids that are not in the ledger are skipped, so repeating a removal
    /// is a no-op. Returns the removed events.
    pub fn remove_points_events(
        &mut self,
        tier: &TierId,
        member_id: MemberId,
        event_ids: &[EventId],
    ) -> Result<Vec<PointsEvent>, LifecycleError> {
        let mut ledger = self
            .store
            .get_ledger(member_id, tier)
            .map_err(LifecycleError::from_store)?
            .ok_or_else(|| LifecycleError::NotFound(format!("Ledger {}/{}", member_id, tier)))?;

        let removed = ledger.remove_events(event_ids);
        if removed.is_empty() {
            return Ok(removed);
        }

        self.store
            .put_ledger(&ledger)
            .map_err(LifecycleError::from_store)?;
        self.metrics.record_removal(removed.len());

        tracing::info!(
            member_id = %member_id,
            %tier,
            removed = removed.len(),
            total = ledger.total_points,
            "points events removed"
        );
        Ok(removed)
    }

    /// Load a submission (open or closed)
    pub fn get_submission(&self, id: SubmissionId) -> Result<Submission, LifecycleError> {
        self.store
            .get_submission(id)
            .map_err(LifecycleError::from_store)?
            .ok_or_else(|| LifecycleError::NotFound(format!("Submission {}", id)))
    }

    /// Open submissions, oldest first
    pub fn pending(&self) -> Result<Vec<Submission>, LifecycleError> {
        self.store
            .pending_submissions()
            .map_err(LifecycleError::from_store)?
            .into_iter()
            .map(|entry| self.get_submission(entry.submission_id))
            .collect()
    }

    /// A member's ledger in a tier (current tier when `None`)
    pub fn ledger(&self, member_id: MemberId, tier: Option<&TierId>) -> Result<Option<LedgerRecord>, LifecycleError> {
        let tier = tier.unwrap_or(&self.config.current_tier);
        self.store
            .get_ledger(member_id, tier)
            .map_err(LifecycleError::from_store)
    }

    /// Totals for a tier (current tier when `None`), highest first
    pub fn leaderboard(&self, tier: Option<&TierId>) -> Result<Vec<LeaderboardEntry>, LifecycleError> {
        let tier = tier.unwrap_or(&self.config.current_tier);
        self.store.leaderboard(tier).map_err(LifecycleError::from_store)
    }

    /// Clear rate of one encounter name
    pub fn clear_rate(&self, encounter_name: &str, include_echo: bool) -> Result<ClearRate, LifecycleError> {
        self.store
            .clear_rate(encounter_name, include_echo)
            .map_err(LifecycleError::from_store)
    }

    /// Clear rates of every registered encounter name
    pub fn clear_rates(&self, include_echo: bool) -> Result<BTreeMap<String, ClearRate>, LifecycleError> {
        self.store
            .clear_rates(include_echo)
            .map_err(LifecycleError::from_store)
    }

    /// Date-bucketed first-clear timeline of one encounter name
    pub fn clear_order(
        &self,
        encounter_name: &str,
        include_echo: bool,
    ) -> Result<Vec<ClearOrderBucket>, LifecycleError> {
        self.store
            .clear_order_for(encounter_name, include_echo)
            .map_err(LifecycleError::from_store)
    }
}
