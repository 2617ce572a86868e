//! Points categories and their static lookup table
//!
//! Points, the one-time flag and the description are intrinsic to a
//! category. They are looked up from [`CATEGORY_TABLE`], never recomputed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// Kind of participation that earns points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum PointsCategory {
    /// Participate in any FC party-finder listing
    FcPf,
    /// Attend an FC event
    FcEvent,
    /// Put in and finish a mentor ticket
    MentorTicket,
    /// Member of a full or partial FC static
    FcStatic,
    /// FC extreme trial party
    FcExtreme,
    /// FC unreal trial party
    FcUnreal,
    /// FC savage raid party
    FcSavage,
    /// FC criterion dungeon party
    FcCriterion,
    /// FC criterion savage party
    FcCriterionSavage,
    /// FC ultimate party
    FcUltimate,
    /// First clear of savage floor 1
    Savage1,
    /// First clear of savage floor 2
    Savage2,
    /// First clear of savage floor 3
    Savage3,
    /// First clear of the savage floor 4 door boss
    Savage4Door,
    /// First clear of savage floor 4
    Savage4Final,
    /// Veteran helping produce a first clear
    Vet,
    /// Crafting / gathering team member
    CraftingGathering,
    /// Mentor
    Mentor,
    /// Administrator-assigned award with explicit points
    AdHoc,
}

/// Static attributes of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    /// The category this row describes
    pub category: PointsCategory,
    /// Stable numeric code used on the wire and in storage
    pub code: u16,
    /// Stable upper-case name
    pub name: &'static str,
    /// Points awarded; `None` when the awarder must supply them
    pub points: Option<i64>,
    /// Awardable at most once per member per tier
    pub is_one_time: bool,
    /// Human description
    pub description: &'static str,
    /// Eligibility constraint shown to reviewers
    pub constraint: Option<&'static str>,
}

const PARTY: Option<&str> = Some("4+ FC, non-static");
const ONCE: Option<&str> = Some("One-time only");

/// Category lookup table, in declaration order of [`PointsCategory`]
pub const CATEGORY_TABLE: &[CategoryInfo] = &[
    row(PointsCategory::FcPf, 100, "FC_PF", Some(10), false, "FC PF Listing", None),
    row(PointsCategory::FcEvent, 101, "FC_EVENT", Some(20), false, "FC event", None),
    row(PointsCategory::MentorTicket, 102, "MENTOR_TICKET", Some(10), false, "Put in and finish a mentor ticket", None),
    row(PointsCategory::FcStatic, 103, "FC_STATIC", Some(20), false, "Be a part of a full / partial FC Savage / Ultimate static", None),
    row(PointsCategory::FcExtreme, 200, "FC_EXTREME", Some(10), false, "FC EX party", PARTY),
    row(PointsCategory::FcUnreal, 201, "FC_UNREAL", Some(10), false, "FC Unreal party", PARTY),
    row(PointsCategory::FcSavage, 202, "FC_SAVAGE", Some(10), false, "FC Savage party", PARTY),
    row(PointsCategory::FcCriterion, 203, "FC_CRITERION", Some(10), false, "FC Criterion party", PARTY),
    row(PointsCategory::FcCriterionSavage, 204, "FC_CRITERION_SAVAGE", Some(10), false, "FC Criterion Savage party", PARTY),
    row(PointsCategory::FcUltimate, 205, "FC_ULTIMATE", Some(10), false, "FC Ultimate party", PARTY),
    row(PointsCategory::Savage1, 310, "SAVAGE_1", Some(10), true, "Clear the first floor of Savage", ONCE),
    row(PointsCategory::Savage2, 320, "SAVAGE_2", Some(10), true, "Clear the second floor of Savage", ONCE),
    row(PointsCategory::Savage3, 330, "SAVAGE_3", Some(10), true, "Clear the third floor of Savage", ONCE),
    row(PointsCategory::Savage4Door, 340, "SAVAGE_4_1", Some(10), true, "Clear the door boss on the fourth floor of Savage", ONCE),
    row(PointsCategory::Savage4Final, 341, "SAVAGE_4_2", Some(10), true, "Clear the fourth floor of Savage", ONCE),
    row(PointsCategory::Vet, 400, "VET", Some(10), false, "Veteran award: Helping with a first-clear", None),
    row(PointsCategory::CraftingGathering, 401, "CRAFTING_GATHERING", Some(50), true, "Crafting / Gathering team member", ONCE),
    row(PointsCategory::Mentor, 402, "MENTOR", Some(25), true, "Mentor", ONCE),
    row(PointsCategory::AdHoc, 777, "AD_HOC", None, false, "Ad hoc", None),
];

const fn row(
    category: PointsCategory,
    code: u16,
    name: &'static str,
    points: Option<i64>,
    is_one_time: bool,
    description: &'static str,
    constraint: Option<&'static str>,
) -> CategoryInfo {
    CategoryInfo {
        category,
        code,
        name,
        points,
        is_one_time,
        description,
        constraint,
    }
}

impl PointsCategory {
    /// Table row for this category
    pub fn info(self) -> &'static CategoryInfo {
        &CATEGORY_TABLE[self as usize]
    }

    /// Intrinsic points (`None` for [`PointsCategory::AdHoc`])
    pub fn points(self) -> Option<i64> {
        self.info().points
    }

    /// Whether the category is awardable at most once per member per tier
    pub fn is_one_time(self) -> bool {
        self.info().is_one_time
    }

    /// Human description
    pub fn description(self) -> &'static str {
        self.info().description
    }

    /// Numeric code
    pub fn code(self) -> u16 {
        self.info().code
    }

    /// Upper-case name
    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Look up a category by numeric code
    pub fn from_code(code: u16) -> Result<Self, DomainError> {
        CATEGORY_TABLE
            .iter()
            .find(|row| row.code == code)
            .map(|row| row.category)
            .ok_or_else(|| DomainError::validation(format!("Unknown points category code: {}", code)))
    }

    /// Look up a category by its case-sensitive name
    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        CATEGORY_TABLE
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.category)
            .ok_or_else(|| DomainError::validation(format!("Unknown points category: {}", name)))
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

impl fmt::Display for PointsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for PointsCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<u16> for PointsCategory {
    type Error = DomainError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<PointsCategory> for u16 {
    fn from(category: PointsCategory) -> Self {
        category.code()
    }
}
