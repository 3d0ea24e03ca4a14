//! Completion feeds, leaderboards, and aggregate stats.
//!
//! These are read paths only; the single write path for completions lives
//! in [`crate::engine`] so settlement always happens in one transaction.

use super::parse_text_col;
use crate::model::completion::{Completion, CompletionDetail};
use crate::model::id::EntityId;
use crate::model::task::Task;
use anyhow::{Context, Result};
use rusqlite::{Connection, Row, params};
use serde::Serialize;

const DETAIL_COLUMNS: &str = "c.completion_id, c.task_id, c.user_id, c.group_id, \
     c.completed_at_us, c.window_start_us, c.points_earned, \
     t.task_id, t.title, t.description, t.cadence, t.category, t.difficulty, \
     t.points, t.is_active, t.is_group_task, t.group_id, t.created_at_us";

/// A leaderboard row for users or groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub id: EntityId,
    pub name: String,
    pub points: i64,
}

/// Aggregate completion stats for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total_completions: u64,
    pub total_points_earned: i64,
    pub distinct_tasks: u64,
    pub first_completed_at_us: Option<i64>,
    pub last_completed_at_us: Option<i64>,
}

fn row_to_detail(row: &Row<'_>) -> rusqlite::Result<CompletionDetail> {
    let completion = Completion {
        id: row.get(0)?,
        task_id: row.get(1)?,
        user_id: row.get(2)?,
        group_id: row.get(3)?,
        completed_at_us: row.get(4)?,
        window_start_us: row.get(5)?,
        points_earned: row.get(6)?,
    };

    // LEFT JOIN leaves the task columns NULL when the task row is gone.
    let task = match row.get::<_, Option<EntityId>>(7)? {
        Some(id) => Some(Task {
            id,
            title: row.get(8)?,
            description: row.get(9)?,
            cadence: parse_text_col(10, row.get_ref(10)?.as_str()?)?,
            category: parse_text_col(11, row.get_ref(11)?.as_str()?)?,
            difficulty: parse_text_col(12, row.get_ref(12)?.as_str()?)?,
            points: row.get(13)?,
            is_active: row.get(14)?,
            is_group_task: row.get(15)?,
            group_id: row.get(16)?,
            created_at_us: row.get(17)?,
        }),
        None => None,
    };

    Ok(CompletionDetail { completion, task })
}

fn collect_details(
    conn: &Connection,
    sql: &str,
    id: &EntityId,
    limit: u32,
) -> Result<Vec<CompletionDetail>> {
    let mut stmt = conn.prepare(sql).context("prepare completion feed query")?;
    let rows = stmt
        .query_map(params![id, limit], row_to_detail)
        .context("execute completion feed query")?;

    let mut details = Vec::new();
    for row in rows {
        details.push(row.context("read completion feed row")?);
    }
    Ok(details)
}

/// List a user's completions, newest first, with the task joined in.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_user_completions(
    conn: &Connection,
    user_id: &EntityId,
    limit: u32,
) -> Result<Vec<CompletionDetail>> {
    let sql = format!(
        "SELECT {DETAIL_COLUMNS} FROM completions c \
         LEFT JOIN tasks t ON t.task_id = c.task_id \
         WHERE c.user_id = ?1 \
         ORDER BY c.completed_at_us DESC, c.completion_id ASC LIMIT ?2"
    );
    collect_details(conn, &sql, user_id, limit)
}

/// List completions attributed to a group, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_group_completions(
    conn: &Connection,
    group_id: &EntityId,
    limit: u32,
) -> Result<Vec<CompletionDetail>> {
    let sql = format!(
        "SELECT {DETAIL_COLUMNS} FROM completions c \
         LEFT JOIN tasks t ON t.task_id = c.task_id \
         WHERE c.group_id = ?1 \
         ORDER BY c.completed_at_us DESC, c.completion_id ASC LIMIT ?2"
    );
    collect_details(conn, &sql, group_id, limit)
}

fn collect_leaderboard(conn: &Connection, sql: &str, limit: u32) -> Result<Vec<LeaderboardEntry>> {
    let mut stmt = conn.prepare(sql).context("prepare leaderboard query")?;
    let rows = stmt
        .query_map(params![limit], |row| {
            Ok((
                row.get::<_, EntityId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })
        .context("execute leaderboard query")?;

    let mut entries = Vec::new();
    for (offset, row) in rows.enumerate() {
        let (id, name, points) = row.context("read leaderboard row")?;
        let rank = u32::try_from(offset + 1).context("leaderboard rank overflow")?;
        entries.push(LeaderboardEntry {
            rank,
            id,
            name,
            points,
        });
    }
    Ok(entries)
}

/// Top users by accumulated points. Ties break on id for a stable order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn top_users(conn: &Connection, limit: u32) -> Result<Vec<LeaderboardEntry>> {
    collect_leaderboard(
        conn,
        "SELECT user_id, name, points FROM users \
         ORDER BY points DESC, user_id ASC LIMIT ?1",
        limit,
    )
}

/// Top groups by accumulated points.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn top_groups(conn: &Connection, limit: u32) -> Result<Vec<LeaderboardEntry>> {
    collect_leaderboard(
        conn,
        "SELECT group_id, name, total_points FROM groups \
         ORDER BY total_points DESC, group_id ASC LIMIT ?1",
        limit,
    )
}

/// Aggregate completion stats for one user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn user_stats(conn: &Connection, user_id: &EntityId) -> Result<UserStats> {
    conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(points_earned), 0),
                COUNT(DISTINCT task_id),
                MIN(completed_at_us),
                MAX(completed_at_us)
         FROM completions WHERE user_id = ?1",
        params![user_id],
        |row| {
            Ok(UserStats {
                total_completions: row.get(0)?,
                total_points_earned: row.get(1)?,
                distinct_tasks: row.get(2)?,
                first_completed_at_us: row.get(3)?,
                last_completed_at_us: row.get(4)?,
            })
        },
    )
    .with_context(|| format!("user_stats for '{user_id}'"))
}
