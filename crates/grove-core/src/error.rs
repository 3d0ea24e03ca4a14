use std::fmt;

/// Machine-readable error codes for CLI and API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    TaskNotFound,
    UserNotFound,
    GroupNotFound,
    InvalidIdentifier,
    InvalidEnumValue,
    InvalidDraft,
    NotGroupAdmin,
    DuplicateCompletion,
    StorageFailure,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::TaskNotFound => "E2001",
            Self::UserNotFound => "E2002",
            Self::GroupNotFound => "E2003",
            Self::InvalidIdentifier => "E2004",
            Self::InvalidEnumValue => "E2005",
            Self::InvalidDraft => "E2006",
            Self::NotGroupAdmin => "E2007",
            Self::DuplicateCompletion => "E3001",
            Self::StorageFailure => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Store not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::TaskNotFound => "Task not found",
            Self::UserNotFound => "User not found",
            Self::GroupNotFound => "Group not found",
            Self::InvalidIdentifier => "Invalid identifier",
            Self::InvalidEnumValue => "Invalid cadence/category/difficulty value",
            Self::InvalidDraft => "Draft failed validation",
            Self::NotGroupAdmin => "Caller is not a group admin",
            Self::DuplicateCompletion => "Task already completed in this period",
            Self::StorageFailure => "Storage operation failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `gv init` to create the store in this directory."),
            Self::ConfigParseError => Some("Fix syntax in .grove/config.toml and retry."),
            Self::TaskNotFound | Self::UserNotFound | Self::GroupNotFound => None,
            Self::InvalidIdentifier => {
                Some("Identifiers look like `gv-` followed by 12 hex characters.")
            }
            Self::InvalidEnumValue => {
                Some("Use one of the documented cadence/category/difficulty values.")
            }
            Self::InvalidDraft => Some("Check field lengths and the 1..=2000 point range."),
            Self::NotGroupAdmin => Some("Only group admins can manage group tasks."),
            Self::DuplicateCompletion => Some("Retry after the current period ends."),
            Self::StorageFailure => Some("Check disk space and that no other process holds the store."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
