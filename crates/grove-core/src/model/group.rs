use crate::model::id::EntityId;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The kinds of organization that can host a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    University,
    School,
    Municipality,
    Ngo,
    Company,
}

impl GroupKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::University => "university",
            Self::School => "school",
            Self::Municipality => "municipality",
            Self::Ngo => "ngo",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKind {
    type Err = super::task::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "university" => Ok(Self::University),
            "school" => Ok(Self::School),
            "municipality" => Ok(Self::Municipality),
            "ngo" => Ok(Self::Ngo),
            "company" => Ok(Self::Company),
            _ => Err(super::task::ParseEnumError {
                expected: "group kind",
                got: s.to_string(),
            }),
        }
    }
}

/// A sustainability group with an aggregate point total.
///
/// `total_points` is the sum of completions attributed to the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: EntityId,
    pub name: String,
    pub kind: GroupKind,
    #[serde(default)]
    pub members: Vec<EntityId>,
    #[serde(default)]
    pub admins: Vec<EntityId>,
    pub total_points: i64,
    pub created_at_us: i64,
}

#[cfg(test)]
mod tests {
    use super::GroupKind;
    use std::str::FromStr;

    #[test]
    fn display_parse_roundtrips() {
        for value in [
            GroupKind::University,
            GroupKind::School,
            GroupKind::Municipality,
            GroupKind::Ngo,
            GroupKind::Company,
        ] {
            assert_eq!(GroupKind::from_str(&value.to_string()).unwrap(), value);
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(GroupKind::from_str("club").is_err());
    }
}
