//! Opaque entity identifiers.
//!
//! Every persisted aggregate (task, user, group, completion) is keyed by a
//! `gv-` prefixed id with a fixed-width hex suffix. Ids are validated at the
//! boundary so malformed input is rejected before any storage access.

use rand::Rng;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Prefix carried by every grove entity id.
pub const ID_PREFIX: &str = "gv-";

/// Number of lowercase hex characters after the prefix.
pub const SUFFIX_LEN: usize = 12;

/// A validated entity identifier (`gv-` + 12 lowercase hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

/// Error returned when an identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier '{got}': expected '{ID_PREFIX}' followed by {SUFFIX_LEN} hex characters")]
pub struct ParseIdError {
    pub got: String,
}

impl EntityId {
    /// Validate and wrap an identifier string.
    ///
    /// # Errors
    ///
    /// Returns [`ParseIdError`] when the prefix, length, or character set is
    /// wrong.
    pub fn parse(raw: &str) -> Result<Self, ParseIdError> {
        let err = || ParseIdError {
            got: raw.to_string(),
        };

        let suffix = raw.strip_prefix(ID_PREFIX).ok_or_else(err)?;
        if suffix.len() != SUFFIX_LEN {
            return Err(err());
        }
        if !suffix
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(err());
        }

        Ok(Self(raw.to_string()))
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        let suffix: u64 = rand::thread_rng().r#gen::<u64>() & 0x0000_ffff_ffff_ffff;
        Self(format!("{ID_PREFIX}{suffix:012x}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl ToSql for EntityId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for EntityId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        Self::parse(raw).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityId, ID_PREFIX, SUFFIX_LEN};
    use std::str::FromStr;

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = EntityId::generate();
        let b = EntityId::generate();

        assert!(a.as_str().starts_with(ID_PREFIX));
        assert_eq!(a.as_str().len(), ID_PREFIX.len() + SUFFIX_LEN);
        assert_ne!(a, b);
        assert_eq!(EntityId::parse(a.as_str()), Ok(a));
    }

    #[test]
    fn parse_rejects_malformed_identifiers() {
        assert!(EntityId::parse("").is_err());
        assert!(EntityId::parse("gv-").is_err());
        assert!(EntityId::parse("bn-0123456789ab").is_err());
        assert!(EntityId::parse("gv-0123456789a").is_err());
        assert!(EntityId::parse("gv-0123456789abc").is_err());
        assert!(EntityId::parse("gv-0123456789aZ").is_err());
        assert!(EntityId::parse("gv-0123456789AB").is_err());
    }

    #[test]
    fn from_str_trims_surrounding_whitespace() {
        let id = EntityId::from_str("  gv-00deadbeef00 ").expect("trimmed id parses");
        assert_eq!(id.as_str(), "gv-00deadbeef00");
    }

    #[test]
    fn serde_roundtrip_validates_on_deserialize() {
        let id = EntityId::generate();
        let json = serde_json::to_string(&id).expect("serialize id");
        let back: EntityId = serde_json::from_str(&json).expect("deserialize id");
        assert_eq!(id, back);

        let bad: Result<EntityId, _> = serde_json::from_str("\"not-an-id\"");
        assert!(bad.is_err());
    }
}
