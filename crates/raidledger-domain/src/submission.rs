//! Submissions - reviewable bundles of candidate points events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DomainError, FightRef, FightSignature, PointsEvent, PointsEventStatus, SubmissionId, TierId};

/// Where a submission came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum SubmissionChannel {
    /// Party-finder listing hook
    FcPf,
    /// Chat bot, raid-log link
    FcBotFflogs,
    /// Chat bot, screenshot upload
    FcBotScreenshot,
    /// Chat bot, administrator command
    FcBotAdmin,
    /// Web admin portal
    AdminPortal,
    /// Development and testing
    Dev,
}

impl SubmissionChannel {
    const ALL: [SubmissionChannel; 6] = [
        SubmissionChannel::FcPf,
        SubmissionChannel::FcBotFflogs,
        SubmissionChannel::FcBotScreenshot,
        SubmissionChannel::FcBotAdmin,
        SubmissionChannel::AdminPortal,
        SubmissionChannel::Dev,
    ];

    /// Numeric code
    pub fn code(self) -> u16 {
        match self {
            SubmissionChannel::FcPf => 1,
            SubmissionChannel::FcBotFflogs => 2,
            SubmissionChannel::FcBotScreenshot => 3,
            SubmissionChannel::FcBotAdmin => 4,
            SubmissionChannel::AdminPortal => 5,
            SubmissionChannel::Dev => 777,
        }
    }

    /// Upper-case name
    pub fn name(self) -> &'static str {
        match self {
            SubmissionChannel::FcPf => "FC_PF",
            SubmissionChannel::FcBotFflogs => "FC_BOT_FFLOGS",
            SubmissionChannel::FcBotScreenshot => "FC_BOT_SCREENSHOT",
            SubmissionChannel::FcBotAdmin => "FC_BOT_ADMIN",
            SubmissionChannel::AdminPortal => "ADMIN_PORTAL",
            SubmissionChannel::Dev => "DEV",
        }
    }

    /// Look up a channel by numeric code
    pub fn from_code(code: u16) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| DomainError::validation(format!("Unknown submission channel code: {}", code)))
    }

    /// Look up a channel by case-sensitive name
    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| DomainError::validation(format!("Unknown submission channel: {}", name)))
    }

    /// Parse a numeric code first, then a case-sensitive name
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        match raw.parse::<u16>() {
            Ok(code) => Self::from_code(code),
            Err(_) => Self::from_name(raw),
        }
    }
}

impl fmt::Display for SubmissionChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SubmissionChannel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u16> for SubmissionChannel {
    type Error = DomainError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<SubmissionChannel> for u16 {
    fn from(channel: SubmissionChannel) -> Self {
        channel.code()
    }
}

/// A reviewable bundle of points events from one evaluation
///
/// Created once by submit, mutated only by review, and retained after it
/// leaves the pending queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Unique identifier
    pub id: SubmissionId,

    /// Creation time
    pub ts: DateTime<Utc>,

    /// Who submitted
    pub submitted_by: String,

    /// Intake channel
    pub channel: SubmissionChannel,

    /// Fight the events were derived from (absent for manual awards)
    #[serde(default)]
    pub fight: Option<FightRef>,

    /// Advisory duplicate-detection hash
    #[serde(default)]
    pub fight_signature: Option<FightSignature>,

    /// Ledger scope the events commit into
    pub tier: TierId,

    /// Candidate events
    pub events: Vec<PointsEvent>,

    /// Last review time
    #[serde(default)]
    pub last_update_ts: Option<DateTime<Utc>>,

    /// Last reviewer
    #[serde(default)]
    pub last_update_by: Option<String>,

    /// Evaluation rationale and submitter notes
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Submission {
    /// Wrap events into a new submission, stamping each with its id
    pub fn new(
        submitted_by: impl Into<String>,
        channel: SubmissionChannel,
        tier: TierId,
        mut events: Vec<PointsEvent>,
    ) -> Self {
        let id = SubmissionId::new();
        for event in &mut events {
            event.submission_id = Some(id);
            event.status = PointsEventStatus::Pending;
        }
        Self {
            id,
            ts: Utc::now(),
            submitted_by: submitted_by.into(),
            channel,
            fight: None,
            fight_signature: None,
            tier,
            events,
            last_update_ts: None,
            last_update_by: None,
            notes: Vec::new(),
        }
    }

    /// Open while any event is still pending
    pub fn is_open(&self) -> bool {
        self.events.iter().any(|e| e.status == PointsEventStatus::Pending)
    }

    /// Events still awaiting review
    pub fn pending_events(&self) -> impl Iterator<Item = &PointsEvent> {
        self.events.iter().filter(|e| e.status == PointsEventStatus::Pending)
    }

    /// Queue-index entry for this submission
    pub fn queue_entry(&self) -> QueueEntry {
        QueueEntry {
            submission_id: self.id,
            ts: self.ts,
        }
    }
}

/// Pending-review queue index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Queued submission
    pub submission_id: SubmissionId,

    /// Submission time
    pub ts: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemberId, PointsCategory};

    fn tier() -> TierId {
        TierId::parse("ANABASEIOS").unwrap()
    }

    #[test]
    fn test_new_submission_stamps_events() {
        let pe = PointsEvent::pending(MemberId(1), PointsCategory::FcPf, "FC PF").unwrap();
        let sub = Submission::new("bot", SubmissionChannel::FcPf, tier(), vec![pe]);
        assert!(sub.is_open());
        assert_eq!(sub.events[0].submission_id, Some(sub.id));
        assert_eq!(sub.queue_entry().submission_id, sub.id);
    }

    #[test]
    fn test_closed_once_all_terminal() {
        let pe = PointsEvent::pending(MemberId(1), PointsCategory::FcPf, "FC PF").unwrap();
        let mut sub = Submission::new("bot", SubmissionChannel::Dev, tier(), vec![pe]);
        sub.events[0].resolve(PointsEventStatus::Approved).unwrap();
        assert!(!sub.is_open());
        assert_eq!(sub.pending_events().count(), 0);
    }

    #[test]
    fn test_empty_submission_is_closed() {
        let sub = Submission::new("bot", SubmissionChannel::Dev, tier(), Vec::new());
        assert!(!sub.is_open());
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!(SubmissionChannel::parse("777").unwrap(), SubmissionChannel::Dev);
        assert_eq!(SubmissionChannel::parse("ADMIN_PORTAL").unwrap(), SubmissionChannel::AdminPortal);
        assert!(SubmissionChannel::parse("admin_portal").is_err());
        assert!(SubmissionChannel::parse("6").is_err());
    }
}
