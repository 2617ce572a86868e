//! Points events and their review status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DomainError, EventId, MemberId, PointsCategory, SubmissionId};

/// Review status of a points event
///
/// `Pending` moves to exactly one of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PointsEventStatus {
    /// Awaiting review
    Pending,
    /// Approved and committed to the ledger
    Approved,
    /// Rejected by the reviewer
    Denied,
    /// Approved, but the one-time category had already been awarded
    AlreadyAwarded,
}

impl PointsEventStatus {
    /// Numeric code
    pub fn code(self) -> u8 {
        match self {
            PointsEventStatus::Pending => 0,
            PointsEventStatus::Approved => 1,
            PointsEventStatus::Denied => 2,
            PointsEventStatus::AlreadyAwarded => 3,
        }
    }

    /// Upper-case name
    pub fn name(self) -> &'static str {
        match self {
            PointsEventStatus::Pending => "PENDING",
            PointsEventStatus::Approved => "APPROVED",
            PointsEventStatus::Denied => "DENIED",
            PointsEventStatus::AlreadyAwarded => "ALREADY_AWARDED",
        }
    }

    /// Look up a status by numeric code
    pub fn from_code(code: u8) -> Result<Self, DomainError> {
        match code {
            0 => Ok(PointsEventStatus::Pending),
            1 => Ok(PointsEventStatus::Approved),
            2 => Ok(PointsEventStatus::Denied),
            3 => Ok(PointsEventStatus::AlreadyAwarded),
            _ => Err(DomainError::validation(format!("Unknown event status code: {}", code))),
        }
    }

    /// Look up a status by case-sensitive name
    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        match name {
            "PENDING" => Ok(PointsEventStatus::Pending),
            "APPROVED" => Ok(PointsEventStatus::Approved),
            "DENIED" => Ok(PointsEventStatus::Denied),
            "ALREADY_AWARDED" => Ok(PointsEventStatus::AlreadyAwarded),
            _ => Err(DomainError::validation(format!("Unknown event status: {}", name))),
        }
    }

    /// Parse a numeric code first, then a case-sensitive name
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        match raw.parse::<u8>() {
            Ok(code) => Self::from_code(code),
            Err(_) => Self::from_name(raw),
        }
    }

    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        self != PointsEventStatus::Pending
    }
}

impl fmt::Display for PointsEventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for PointsEventStatus {
    type Error = DomainError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<PointsEventStatus> for u8 {
    fn from(status: PointsEventStatus) -> Self {
        status.code()
    }
}

/// A candidate or committed award of points to one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEvent {
    /// Unique identifier, reused unchanged across retries
    pub id: EventId,

    /// Recipient
    pub member_id: MemberId,

    /// Category the award falls under
    pub category: PointsCategory,

    /// Points as recorded at creation time
    pub points: i64,

    /// Human-readable rationale
    pub description: String,

    /// Creation time
    pub ts: DateTime<Utc>,

    /// Submission the event was created in
    #[serde(default)]
    pub submission_id: Option<SubmissionId>,

    /// Review status
    pub status: PointsEventStatus,
}

impl PointsEvent {
    /// Create a pending event carrying the category's intrinsic points
    ///
    /// Fails for categories without intrinsic points; use
    /// [`PointsEvent::with_points`] for those.
    pub fn pending(
        member_id: MemberId,
        category: PointsCategory,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let points = category.points().ok_or_else(|| {
            DomainError::validation(format!("Category {} requires explicit points", category))
        })?;
        Ok(Self::with_points(member_id, category, points, description))
    }

    /// Create a pending event with explicit points
    pub fn with_points(
        member_id: MemberId,
        category: PointsCategory,
        points: i64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: EventId::new(),
            member_id,
            category,
            points,
            description: description.into(),
            ts: Utc::now(),
            submission_id: None,
            status: PointsEventStatus::Pending,
        }
    }

    /// Move a pending event to a terminal status
    pub fn resolve(&mut self, status: PointsEventStatus) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidTransition(format!(
                "event {} is already {}",
                self.id, self.status
            )));
        }
        if !status.is_terminal() {
            return Err(DomainError::InvalidTransition(format!(
                "event {} cannot move back to {}",
                self.id, status
            )));
        }
        self.status = status;
        Ok(())
    }
}

impl fmt::Display for PointsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.member_id, self.category, self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_uses_table_points() {
        let pe = PointsEvent::pending(MemberId(1), PointsCategory::Mentor, "Mentor").unwrap();
        assert_eq!(pe.points, 25);
        assert_eq!(pe.status, PointsEventStatus::Pending);
    }

    #[test]
    fn test_ad_hoc_requires_points() {
        assert!(PointsEvent::pending(MemberId(1), PointsCategory::AdHoc, "x").is_err());
        let pe = PointsEvent::with_points(MemberId(1), PointsCategory::AdHoc, 15, "Raffle");
        assert_eq!(pe.points, 15);
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut pe = PointsEvent::pending(MemberId(1), PointsCategory::FcPf, "FC PF").unwrap();
        pe.resolve(PointsEventStatus::Denied).unwrap();
        assert!(pe.resolve(PointsEventStatus::Approved).is_err());
        assert_eq!(pe.status, PointsEventStatus::Denied);
    }

    #[test]
    fn test_cannot_resolve_to_pending() {
        let mut pe = PointsEvent::pending(MemberId(1), PointsCategory::FcPf, "FC PF").unwrap();
        assert!(pe.resolve(PointsEventStatus::Pending).is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(PointsEventStatus::parse("3").unwrap(), PointsEventStatus::AlreadyAwarded);
        assert_eq!(PointsEventStatus::parse("DENIED").unwrap(), PointsEventStatus::Denied);
        assert!(PointsEventStatus::parse("denied").is_err());
        assert!(PointsEventStatus::parse("7").is_err());
    }
}
