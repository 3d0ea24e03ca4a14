//! Canonical SQLite schema for the grove store.
//!
//! Normalized for queryability:
//! - `tasks`, `users`, `groups` keep the aggregate fields per entity
//! - `group_members` and `user_favorites` model the multi-valued sets
//! - `completions` is append-only; its `(task_id, user_id, window_start_us)`
//!   UNIQUE index is the authority for the one-completion-per-window rule,
//!   so a racing insert loses atomically instead of double-crediting
//! - `store_meta` tracks the schema version
//!
//! Category CHECKs admit the legacy names still present in old stores;
//! reads normalize them (see `model::task`).

/// Migration v1: core tables plus the completion uniqueness index.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS groups (
    group_id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) BETWEEN 2 AND 100),
    kind TEXT NOT NULL CHECK (kind IN ('university', 'school', 'municipality', 'ngo', 'company')),
    total_points INTEGER NOT NULL DEFAULT 0 CHECK (total_points >= 0),
    created_at_us INTEGER NOT NULL,
    CHECK (group_id LIKE 'gv-%')
);

CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) BETWEEN 2 AND 100),
    email TEXT NOT NULL UNIQUE CHECK (email LIKE '%_@_%'),
    points INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
    group_id TEXT REFERENCES groups(group_id) ON DELETE SET NULL,
    is_admin INTEGER NOT NULL DEFAULT 0 CHECK (is_admin IN (0, 1)),
    created_at_us INTEGER NOT NULL,
    CHECK (user_id LIKE 'gv-%')
);

CREATE TABLE IF NOT EXISTS tasks (
    task_id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(trim(title)) BETWEEN 3 AND 200),
    description TEXT NOT NULL CHECK (length(trim(description)) BETWEEN 10 AND 1000),
    cadence TEXT NOT NULL CHECK (cadence IN ('daily', 'weekly', 'monthly', 'one_time', 'yearly')),
    category TEXT NOT NULL CHECK (category IN (
        'health', 'education', 'work', 'social', 'environment', 'other', 'group',
        'recycling', 'water', 'energy', 'transport', 'consumption'
    )),
    difficulty TEXT NOT NULL CHECK (difficulty IN ('easy', 'medium', 'hard')),
    points INTEGER NOT NULL CHECK (points BETWEEN 1 AND 2000),
    is_active INTEGER NOT NULL DEFAULT 1 CHECK (is_active IN (0, 1)),
    is_group_task INTEGER NOT NULL DEFAULT 0 CHECK (is_group_task IN (0, 1)),
    group_id TEXT REFERENCES groups(group_id) ON DELETE SET NULL,
    created_at_us INTEGER NOT NULL,
    CHECK (task_id LIKE 'gv-%')
);

CREATE TABLE IF NOT EXISTS group_members (
    group_id TEXT NOT NULL REFERENCES groups(group_id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    is_admin INTEGER NOT NULL DEFAULT 0 CHECK (is_admin IN (0, 1)),
    joined_at_us INTEGER NOT NULL,
    PRIMARY KEY (group_id, user_id)
);

CREATE TABLE IF NOT EXISTS user_favorites (
    user_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    task_id TEXT NOT NULL REFERENCES tasks(task_id) ON DELETE CASCADE,
    created_at_us INTEGER NOT NULL,
    PRIMARY KEY (user_id, task_id)
);

CREATE TABLE IF NOT EXISTS completions (
    completion_id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL REFERENCES tasks(task_id),
    user_id TEXT NOT NULL REFERENCES users(user_id),
    group_id TEXT REFERENCES groups(group_id),
    completed_at_us INTEGER NOT NULL,
    window_start_us INTEGER NOT NULL,
    points_earned INTEGER NOT NULL CHECK (points_earned >= 0),
    CHECK (completion_id LIKE 'gv-%')
);

CREATE UNIQUE INDEX IF NOT EXISTS uq_completions_task_user_window
    ON completions(task_id, user_id, window_start_us);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO store_meta (id, schema_version, created_at_us)
VALUES (1, 1, 0);
"#;

/// Migration v2: read-path indexes for catalog, feed, and leaderboard queries.
pub const MIGRATION_V2_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_tasks_active_cadence
    ON tasks(is_active, cadence, category, difficulty);

CREATE INDEX IF NOT EXISTS idx_tasks_group
    ON tasks(group_id, is_group_task);

CREATE INDEX IF NOT EXISTS idx_completions_user_time
    ON completions(user_id, completed_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_completions_group_time
    ON completions(group_id, completed_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_users_points
    ON users(points DESC, user_id);

CREATE INDEX IF NOT EXISTS idx_groups_points
    ON groups(total_points DESC, group_id);

UPDATE store_meta
SET schema_version = 2
WHERE id = 1;
"#;

/// Indexes expected by list/feed/leaderboard query paths (plus the
/// correctness-critical uniqueness index from v1).
pub const REQUIRED_INDEXES: &[&str] = &[
    "uq_completions_task_user_window",
    "idx_tasks_active_cadence",
    "idx_tasks_group",
    "idx_completions_user_time",
    "idx_completions_group_time",
    "idx_users_points",
    "idx_groups_points",
];

#[cfg(test)]
mod tests {
    use crate::db::migrations;
    use rusqlite::{Connection, params};

    fn seeded_conn() -> rusqlite::Result<Connection> {
        let mut conn = Connection::open_in_memory()?;
        migrations::migrate(&mut conn)?;

        for idx in 0..24_u32 {
            let task_id = format!("gv-{idx:012x}");
            let cadence = if idx % 2 == 0 { "daily" } else { "weekly" };
            conn.execute(
                "INSERT INTO tasks (
                    task_id, title, description, cadence, category, difficulty,
                    points, is_active, is_group_task, created_at_us
                 ) VALUES (?1, ?2, ?3, ?4, 'environment', 'easy', 10, 1, 0, ?5)",
                params![
                    task_id,
                    format!("Seeded task {idx}"),
                    "A task used only by schema tests.",
                    cadence,
                    i64::from(idx)
                ],
            )?;
        }

        for idx in 0..8_u32 {
            conn.execute(
                "INSERT INTO users (user_id, name, email, points, created_at_us)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    format!("gv-{:012x}", 0x1000 + idx),
                    format!("User {idx}"),
                    format!("user{idx}@example.org"),
                    i64::from(idx * 10),
                    i64::from(idx)
                ],
            )?;
        }

        Ok(conn)
    }

    fn query_plan_details(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!("EXPLAIN QUERY PLAN {sql}"))?;
        stmt.query_map([], |row| row.get::<_, String>(3))?
            .collect::<Result<Vec<_>, _>>()
    }

    #[test]
    fn query_plan_uses_catalog_index() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let details = query_plan_details(
            &conn,
            "SELECT task_id FROM tasks WHERE is_active = 1 AND cadence = 'daily'",
        )?;

        assert!(
            details
                .iter()
                .any(|detail| detail.contains("idx_tasks_active_cadence")),
            "expected catalog index in plan, got: {details:?}"
        );

        Ok(())
    }

    #[test]
    fn query_plan_uses_leaderboard_index() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let details = query_plan_details(
            &conn,
            "SELECT user_id FROM users ORDER BY points DESC, user_id LIMIT 10",
        )?;

        assert!(
            details
                .iter()
                .any(|detail| detail.contains("idx_users_points")),
            "expected leaderboard index in plan, got: {details:?}"
        );

        Ok(())
    }

    #[test]
    fn duplicate_window_insert_violates_unique_index() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;

        let insert = |completion_id: &str| {
            conn.execute(
                "INSERT INTO completions (
                    completion_id, task_id, user_id,
                    completed_at_us, window_start_us, points_earned
                 ) VALUES (?1, 'gv-000000000000', 'gv-000000001000', 100, 0, 10)",
                params![completion_id],
            )
        };

        insert("gv-00000000c001")?;
        let second = insert("gv-00000000c002");

        let Err(rusqlite::Error::SqliteFailure(error, _)) = second else {
            panic!("second insert in the same window must fail");
        };
        assert_eq!(
            error.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        );

        Ok(())
    }

    #[test]
    fn points_range_is_enforced_by_check() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let result = conn.execute(
            "INSERT INTO tasks (
                task_id, title, description, cadence, category, difficulty,
                points, created_at_us
             ) VALUES ('gv-00000000bad0', 'Over-limit task',
                       'Points above the allowed ceiling.', 'daily',
                       'other', 'easy', 2001, 0)",
            [],
        );
        assert!(result.is_err(), "points > 2000 must be rejected");
        Ok(())
    }

    #[test]
    fn legacy_category_rows_are_accepted() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        conn.execute(
            "INSERT INTO tasks (
                task_id, title, description, cadence, category, difficulty,
                points, created_at_us
             ) VALUES ('gv-00000000aaaa', 'Collect rainwater',
                       'Set up a barrel under the downspout.', 'monthly',
                       'water', 'medium', 40, 0)",
            [],
        )?;
        Ok(())
    }
}
