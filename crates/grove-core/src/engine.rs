//! Completion eligibility and point settlement.
//!
//! `complete_task` is the only write path for completions. It derives the
//! eligibility window from the task's cadence, then runs one transaction:
//! insert the completion, credit the user, credit the group (when supplied).
//! Either all three land or none do.
//!
//! The duplicate guard has two layers. A read inside the transaction gives
//! the friendly per-cadence rejection; the store's UNIQUE index on
//! `(task_id, user_id, window_start_us)` is the authority, so a racing
//! insert that slips past the read still loses with [`CompleteError::Duplicate`]
//! instead of double-crediting.

use crate::error::ErrorCode;
use crate::model::completion::Completion;
use crate::model::id::EntityId;
use crate::model::task::Cadence;
use crate::window::{Window, window_for};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::{info, warn};

/// What the caller wants to complete, and for whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub task_id: EntityId,
    pub user_id: EntityId,
    /// Attribute the points to this group as well. The caller chooses;
    /// nothing is inferred from the user's membership.
    pub group_id: Option<EntityId>,
}

/// A rejected duplicate, carrying enough context for a useful message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateCompletion {
    pub cadence: Cadence,
    /// First instant at which the task becomes eligible again.
    pub next_eligible: DateTime<Utc>,
}

impl DuplicateCompletion {
    /// Per-cadence rejection message shown to users.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self.cadence {
            Cadence::Daily | Cadence::OneTime => {
                "You already completed this task today. Try again tomorrow."
            }
            Cadence::Weekly => "You already completed this task this week. Try again next week.",
            Cadence::Monthly => {
                "You already completed this task this month. Try again next month."
            }
            Cadence::Yearly => "You already completed this task this year. Try again next year.",
        }
    }
}

/// Errors from the completion path.
#[derive(Debug, thiserror::Error)]
pub enum CompleteError {
    #[error("task '{0}' not found")]
    TaskNotFound(EntityId),
    #[error("user '{0}' not found")]
    UserNotFound(EntityId),
    #[error("group '{0}' not found")]
    GroupNotFound(EntityId),
    #[error("{}", .0.message())]
    Duplicate(DuplicateCompletion),
    #[error("storage failure during completion")]
    Storage(#[from] rusqlite::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CompleteError {
    /// Stable error code for CLI and API consumers.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TaskNotFound(_) => ErrorCode::TaskNotFound,
            Self::UserNotFound(_) => ErrorCode::UserNotFound,
            Self::GroupNotFound(_) => ErrorCode::GroupNotFound,
            Self::Duplicate(_) => ErrorCode::DuplicateCompletion,
            Self::Storage(_) => ErrorCode::StorageFailure,
            Self::Other(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Complete a task for a user at the given instant.
///
/// On success the returned [`Completion`] snapshots the task's point value;
/// the user's `points` and the group's `total_points` (when a group id is
/// supplied) have been credited in the same transaction.
///
/// # Errors
///
/// Returns [`CompleteError::Duplicate`] when the pair already has a
/// completion in the current window, the `*NotFound` variants when a
/// referenced entity is missing, and [`CompleteError::Storage`] on database
/// failures.
pub fn complete_task(
    conn: &mut Connection,
    req: &CompletionRequest,
    now: DateTime<Utc>,
) -> Result<Completion, CompleteError> {
    let task = crate::store::tasks::get_task(conn, &req.task_id)?
        .ok_or_else(|| CompleteError::TaskNotFound(req.task_id.clone()))?;

    let user_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?1)",
        params![req.user_id],
        |row| row.get(0),
    )?;
    if !user_exists {
        return Err(CompleteError::UserNotFound(req.user_id.clone()));
    }

    if let Some(group_id) = &req.group_id {
        let group_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM groups WHERE group_id = ?1)",
            params![group_id],
            |row| row.get(0),
        )?;
        if !group_exists {
            return Err(CompleteError::GroupNotFound(group_id.clone()));
        }
    }

    let window = window_for(task.cadence, now);
    let completion = Completion {
        id: EntityId::generate(),
        task_id: req.task_id.clone(),
        user_id: req.user_id.clone(),
        group_id: req.group_id.clone(),
        completed_at_us: now.timestamp_micros(),
        window_start_us: window.start_us(),
        points_earned: task.points,
    };

    // Immediate so concurrent writers queue at BEGIN instead of failing a
    // deferred read-then-write upgrade mid-transaction.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    settle(&tx, &completion, task.cadence, &window)?;
    tx.commit()?;

    info!(
        task_id = %completion.task_id,
        user_id = %completion.user_id,
        points = completion.points_earned,
        window_start_us = completion.window_start_us,
        "completion settled"
    );
    Ok(completion)
}

/// Convenience wrapper over [`complete_task`] using the current wall clock.
///
/// # Errors
///
/// Same as [`complete_task`].
pub fn complete_task_now(
    conn: &mut Connection,
    req: &CompletionRequest,
) -> Result<Completion, CompleteError> {
    complete_task(conn, req, Utc::now())
}

fn settle(
    tx: &Transaction<'_>,
    completion: &Completion,
    cadence: Cadence,
    window: &Window,
) -> Result<(), CompleteError> {
    // Friendly pre-check; the UNIQUE index below is the real guard.
    let existing: Option<i64> = tx
        .query_row(
            "SELECT completed_at_us FROM completions
             WHERE task_id = ?1 AND user_id = ?2 AND window_start_us = ?3",
            params![completion.task_id, completion.user_id, completion.window_start_us],
            |row| row.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(duplicate(cadence, window));
    }

    let insert = tx.execute(
        "INSERT INTO completions (
            completion_id, task_id, user_id, group_id,
            completed_at_us, window_start_us, points_earned
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            completion.id,
            completion.task_id,
            completion.user_id,
            completion.group_id,
            completion.completed_at_us,
            completion.window_start_us,
            completion.points_earned
        ],
    );
    if let Err(error) = insert {
        if is_unique_violation(&error) {
            warn!(
                task_id = %completion.task_id,
                user_id = %completion.user_id,
                window_start_us = completion.window_start_us,
                "duplicate completion lost the race at the unique index"
            );
            return Err(duplicate(cadence, window));
        }
        return Err(error.into());
    }

    tx.execute(
        "UPDATE users SET points = points + ?1 WHERE user_id = ?2",
        params![completion.points_earned, completion.user_id],
    )?;

    if let Some(group_id) = &completion.group_id {
        tx.execute(
            "UPDATE groups SET total_points = total_points + ?1 WHERE group_id = ?2",
            params![completion.points_earned, group_id],
        )?;
    }

    Ok(())
}

fn duplicate(cadence: Cadence, window: &Window) -> CompleteError {
    CompleteError::Duplicate(DuplicateCompletion {
        cadence,
        next_eligible: window.end,
    })
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
