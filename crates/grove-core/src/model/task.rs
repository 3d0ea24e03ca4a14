//! Task vocabulary enums and the persisted task aggregate.
//!
//! The catalog stores a few legacy string values from earlier deployments:
//! old category names (`recycling`, `water`, `energy`, `transport`,
//! `consumption`) and the old cadence `yearly`. Parsing normalizes the
//! legacy categories to their modern equivalents; `yearly` stays a distinct
//! cadence because it has its own eligibility window (see [`crate::window`]).

use crate::model::id::EntityId;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Inclusive bounds for a task's point value.
pub const MIN_POINTS: u32 = 1;
pub const MAX_POINTS: u32 = 2000;

/// How often a task may be completed.
///
/// `OneTime` is the modern replacement for the legacy `Yearly` value. Both
/// remain parseable; their eligibility windows differ (`one_time` falls back
/// to the daily window, `yearly` spans the calendar year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
    OneTime,
    Yearly,
}

impl Cadence {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::OneTime => "one_time",
            Self::Yearly => "yearly",
        }
    }
}

/// Life area a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Education,
    Work,
    Social,
    Environment,
    Other,
    Group,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Education => "education",
            Self::Work => "work",
            Self::Social => "social",
            Self::Environment => "environment",
            Self::Other => "other",
            Self::Group => "group",
        }
    }
}

/// Subjective effort rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// All persisted fields for a catalog task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub cadence: Cadence,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: u32,
    pub is_active: bool,
    pub is_group_task: bool,
    pub group_id: Option<EntityId>,
    pub created_at_us: i64,
}

/// Caller-supplied fields for creating a task, validated before insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub cadence: Cadence,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: u32,
}

/// Error returned when a task draft fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid task draft: {field} {reason}")]
pub struct DraftError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl TaskDraft {
    /// Validate field lengths and the point range.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), DraftError> {
        let title_len = self.title.trim().chars().count();
        if !(3..=200).contains(&title_len) {
            return Err(DraftError {
                field: "title",
                reason: "must be 3..=200 characters",
            });
        }

        let description_len = self.description.trim().chars().count();
        if !(10..=1000).contains(&description_len) {
            return Err(DraftError {
                field: "description",
                reason: "must be 10..=1000 characters",
            });
        }

        if !(MIN_POINTS..=MAX_POINTS).contains(&self.points) {
            return Err(DraftError {
                field: "points",
                reason: "must be 1..=2000",
            });
        }

        Ok(())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Cadence {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "one_time" | "one-time" => Ok(Self::OneTime),
            "yearly" => Ok(Self::Yearly),
            _ => Err(ParseEnumError {
                expected: "cadence",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "health" => Ok(Self::Health),
            "education" => Ok(Self::Education),
            "work" => Ok(Self::Work),
            "social" => Ok(Self::Social),
            // Legacy names collapse into the modern set on read.
            "environment" | "recycling" | "water" | "energy" | "transport" => Ok(Self::Environment),
            "other" | "consumption" => Ok(Self::Other),
            "group" => Ok(Self::Group),
            _ => Err(ParseEnumError {
                expected: "category",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseEnumError {
                expected: "difficulty",
                got: s.to_string(),
            }),
        }
    }
}
