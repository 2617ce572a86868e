//! Counters for lifecycle operations

use raidledger_domain::PointsEventStatus;

/// Counters collected across lifecycle calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleMetrics {
    /// Fights evaluated
    pub evaluations: usize,

    /// Submissions created (fight and manual)
    pub submissions: usize,

    /// Reviews committed
    pub reviews: usize,

    /// Events approved into a ledger
    pub approved: usize,

    /// Events denied
    pub denied: usize,

    /// One-time events found already awarded at commit
    pub already_awarded: usize,

    /// Events removed by corrections
    pub removed: usize,

    /// Commits lost to a concurrent writer
    pub conflicts: usize,
}

impl LifecycleMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an evaluation
    pub fn record_evaluation(&mut self) {
        self.evaluations += 1;
    }

    /// Record a new submission
    pub fn record_submission(&mut self) {
        self.submissions += 1;
    }

    /// Record one event outcome from a review
    pub fn record_outcome(&mut self, status: PointsEventStatus) {
        match status {
            PointsEventStatus::Approved => self.approved += 1,
            PointsEventStatus::Denied => self.denied += 1,
            PointsEventStatus::AlreadyAwarded => self.already_awarded += 1,
            PointsEventStatus::Pending => {}
        }
    }

    /// Record a committed review
    pub fn record_review(&mut self) {
        self.reviews += 1;
    }

    /// Record removed events
    pub fn record_removal(&mut self, count: usize) {
        self.removed += count;
    }

    /// Record a lost commit
    pub fn record_conflict(&mut self) {
        self.conflicts += 1;
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        [
            "Lifecycle Metrics Summary".to_string(),
            "=========================".to_string(),
            format!("Evaluations: {}", self.evaluations),
            format!("Submissions: {}", self.submissions),
            format!("Reviews: {}", self.reviews),
            format!("  Approved: {}", self.approved),
            format!("  Denied: {}", self.denied),
            format!("  Already awarded: {}", self.already_awarded),
            format!("Removed: {}", self.removed),
            format!("Conflicts: {}", self.conflicts),
        ]
        .join("\n")
    }
}
