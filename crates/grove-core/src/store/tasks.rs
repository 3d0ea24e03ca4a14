//! Task catalog reads and writes.
//!
//! Legacy rows (old category names) are normalized by the enum parsers on
//! the way out; the stored text is left untouched.

use super::{now_us, parse_text_col};
use crate::model::id::EntityId;
use crate::model::task::{Cadence, Category, Difficulty, Task, TaskDraft};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, Row, params, params_from_iter};

const TASK_COLUMNS: &str = "task_id, title, description, cadence, category, difficulty, \
     points, is_active, is_group_task, group_id, created_at_us";

/// Filter criteria for catalog listings. Fields combine with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub cadence: Option<Cadence>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    /// Include deactivated tasks (default: active only).
    pub include_inactive: bool,
    /// Maximum number of results.
    pub limit: Option<u32>,
}

/// Optional field edits for an existing task.
///
/// Point edits apply to future completions only; past completions keep
/// their snapshotted `points_earned`.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cadence: Option<Cadence>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub points: Option<u32>,
    pub is_active: Option<bool>,
}

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        cadence: parse_text_col(3, row.get_ref(3)?.as_str()?)?,
        category: parse_text_col(4, row.get_ref(4)?.as_str()?)?,
        difficulty: parse_text_col(5, row.get_ref(5)?.as_str()?)?,
        points: row.get(6)?,
        is_active: row.get(7)?,
        is_group_task: row.get(8)?,
        group_id: row.get(9)?,
        created_at_us: row.get(10)?,
    })
}

/// Create a catalog task from a validated draft.
///
/// # Errors
///
/// Returns an error if draft validation or the insert fails.
pub fn create_task(conn: &Connection, draft: &TaskDraft) -> Result<Task> {
    insert_task(conn, draft, None)
}

/// Create a task owned by a group. Only group admins may do this.
///
/// # Errors
///
/// Returns an error if the group is missing, the acting user is not a group
/// admin, or the insert fails.
pub fn create_group_task(
    conn: &Connection,
    group_id: &EntityId,
    acting_user: &EntityId,
    draft: &TaskDraft,
) -> Result<Task> {
    if !super::groups::group_exists(conn, group_id)? {
        bail!("group '{group_id}' not found");
    }
    if !super::groups::is_group_admin(conn, group_id, acting_user)? {
        bail!("user '{acting_user}' is not an admin of group '{group_id}'");
    }

    insert_task(conn, draft, Some(group_id))
}

/// Create several tasks atomically; either all drafts land or none do.
///
/// # Errors
///
/// Returns an error if any draft fails validation or any insert fails.
pub fn create_tasks_bulk(conn: &mut Connection, drafts: &[TaskDraft]) -> Result<Vec<Task>> {
    if drafts.is_empty() {
        bail!("bulk upload requires at least one task");
    }

    let tx = conn.transaction().context("begin bulk task transaction")?;
    let mut created = Vec::with_capacity(drafts.len());
    for draft in drafts {
        created.push(insert_task(&tx, draft, None)?);
    }
    tx.commit().context("commit bulk task transaction")?;

    Ok(created)
}

fn insert_task(conn: &Connection, draft: &TaskDraft, group_id: Option<&EntityId>) -> Result<Task> {
    draft.validate()?;

    let task = Task {
        id: EntityId::generate(),
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        cadence: draft.cadence,
        category: draft.category,
        difficulty: draft.difficulty,
        points: draft.points,
        is_active: true,
        is_group_task: group_id.is_some(),
        group_id: group_id.cloned(),
        created_at_us: now_us(),
    };

    conn.execute(
        "INSERT INTO tasks (
            task_id, title, description, cadence, category, difficulty,
            points, is_active, is_group_task, group_id, created_at_us
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            task.id,
            task.title,
            task.description,
            task.cadence.as_str(),
            task.category.as_str(),
            task.difficulty.as_str(),
            task.points,
            task.is_active,
            task.is_group_task,
            task.group_id,
            task.created_at_us
        ],
    )
    .with_context(|| format!("insert task '{}'", task.title))?;

    Ok(task)
}

/// Fetch a single task by id. Returns `None` when it does not exist.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_task(conn: &Connection, task_id: &EntityId) -> Result<Option<Task>> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1");
    let mut stmt = conn.prepare(&sql).context("prepare get_task query")?;

    match stmt.query_row(params![task_id], row_to_task) {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e).context(format!("get_task for '{task_id}'")),
    }
}

/// List catalog tasks matching the filter, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tasks(conn: &Connection, filter: &TaskFilter) -> Result<Vec<Task>> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if !filter.include_inactive {
        conditions.push("is_active = 1".to_string());
    }

    if let Some(cadence) = filter.cadence {
        param_values.push(Box::new(cadence.as_str()));
        conditions.push(format!("cadence = ?{}", param_values.len()));
    }

    if let Some(category) = filter.category {
        param_values.push(Box::new(category.as_str()));
        conditions.push(format!("category = ?{}", param_values.len()));
    }

    if let Some(difficulty) = filter.difficulty {
        param_values.push(Box::new(difficulty.as_str()));
        conditions.push(format!("difficulty = ?{}", param_values.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let limit_clause = filter
        .limit
        .map_or(String::new(), |limit| format!(" LIMIT {limit}"));

    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks{where_clause} \
         ORDER BY created_at_us DESC, task_id ASC{limit_clause}"
    );

    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("prepare list_tasks query: {sql}"))?;

    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();

    let rows = stmt
        .query_map(params_from_iter(params_ref), row_to_task)
        .context("execute list_tasks query")?;

    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row.context("read list_tasks row")?);
    }
    Ok(tasks)
}

/// List active tasks owned by a group. Callers must be group members.
///
/// # Errors
///
/// Returns an error if the group is missing, the acting user is not a
/// member, or the query fails.
pub fn list_group_tasks(
    conn: &Connection,
    group_id: &EntityId,
    acting_user: &EntityId,
) -> Result<Vec<Task>> {
    if !super::groups::group_exists(conn, group_id)? {
        bail!("group '{group_id}' not found");
    }
    if !super::groups::is_group_member(conn, group_id, acting_user)? {
        bail!("user '{acting_user}' is not a member of group '{group_id}'");
    }

    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks \
         WHERE group_id = ?1 AND is_group_task = 1 AND is_active = 1 \
         ORDER BY created_at_us DESC, task_id ASC"
    );

    let mut stmt = conn.prepare(&sql).context("prepare list_group_tasks")?;
    let rows = stmt
        .query_map(params![group_id], row_to_task)
        .context("execute list_group_tasks query")?;

    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row.context("read list_group_tasks row")?);
    }
    Ok(tasks)
}

/// Apply optional field edits to a task.
///
/// # Errors
///
/// Returns an error if the task does not exist or the update fails.
pub fn update_task(conn: &Connection, task_id: &EntityId, update: &TaskUpdate) -> Result<()> {
    let mut sets: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(ref title) = update.title {
        param_values.push(Box::new(title.trim().to_string()));
        sets.push(format!("title = ?{}", param_values.len()));
    }
    if let Some(ref description) = update.description {
        param_values.push(Box::new(description.trim().to_string()));
        sets.push(format!("description = ?{}", param_values.len()));
    }
    if let Some(cadence) = update.cadence {
        param_values.push(Box::new(cadence.as_str()));
        sets.push(format!("cadence = ?{}", param_values.len()));
    }
    if let Some(category) = update.category {
        param_values.push(Box::new(category.as_str()));
        sets.push(format!("category = ?{}", param_values.len()));
    }
    if let Some(difficulty) = update.difficulty {
        param_values.push(Box::new(difficulty.as_str()));
        sets.push(format!("difficulty = ?{}", param_values.len()));
    }
    if let Some(points) = update.points {
        param_values.push(Box::new(points));
        sets.push(format!("points = ?{}", param_values.len()));
    }
    if let Some(is_active) = update.is_active {
        param_values.push(Box::new(is_active));
        sets.push(format!("is_active = ?{}", param_values.len()));
    }

    if sets.is_empty() {
        bail!("update_task called with no fields to change");
    }

    param_values.push(Box::new(task_id.clone()));
    let sql = format!(
        "UPDATE tasks SET {} WHERE task_id = ?{}",
        sets.join(", "),
        param_values.len()
    );

    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();

    let changed = conn
        .execute(&sql, params_from_iter(params_ref))
        .with_context(|| format!("update task '{task_id}'"))?;
    if changed == 0 {
        bail!("task '{task_id}' not found");
    }

    Ok(())
}

/// Deactivate a task so it stops appearing in the catalog. Past completions
/// are untouched.
///
/// # Errors
///
/// Returns an error if the task does not exist or the update fails.
pub fn deactivate_task(conn: &Connection, task_id: &EntityId) -> Result<()> {
    update_task(
        conn,
        task_id,
        &TaskUpdate {
            is_active: Some(false),
            ..TaskUpdate::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::{TaskFilter, TaskUpdate, create_task, create_tasks_bulk, deactivate_task};
    use super::{get_task, list_tasks, update_task};
    use crate::db::open_in_memory;
    use crate::model::id::EntityId;
    use crate::model::task::{Cadence, Category, Difficulty, TaskDraft};
    use rusqlite::params;

    fn draft(title: &str, cadence: Cadence) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: "A repeating sustainability habit for tests.".to_string(),
            cadence,
            category: Category::Environment,
            difficulty: Difficulty::Easy,
            points: 10,
        }
    }

    #[test]
    fn create_then_get_roundtrips() {
        let conn = open_in_memory().unwrap();
        let created = create_task(&conn, &draft("Compost scraps", Cadence::Daily)).unwrap();

        let fetched = get_task(&conn, &created.id).unwrap().expect("task exists");
        assert_eq!(fetched, created);
        assert!(fetched.is_active);
        assert!(!fetched.is_group_task);
    }

    #[test]
    fn get_missing_task_returns_none() {
        let conn = open_in_memory().unwrap();
        let id = EntityId::generate();
        assert_eq!(get_task(&conn, &id).unwrap(), None);
    }

    #[test]
    fn invalid_draft_is_rejected_before_insert() {
        let conn = open_in_memory().unwrap();
        let mut bad = draft("Compost scraps", Cadence::Daily);
        bad.points = 5000;
        assert!(create_task(&conn, &bad).is_err());
        assert!(list_tasks(&conn, &TaskFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn list_filters_combine_with_and() {
        let conn = open_in_memory().unwrap();
        create_task(&conn, &draft("Cycle to work", Cadence::Daily)).unwrap();
        create_task(&conn, &draft("Beach cleanup", Cadence::Weekly)).unwrap();
        let retired = create_task(&conn, &draft("Old habit", Cadence::Daily)).unwrap();
        deactivate_task(&conn, &retired.id).unwrap();

        let all = list_tasks(&conn, &TaskFilter::default()).unwrap();
        assert_eq!(all.len(), 2);

        let daily = list_tasks(
            &conn,
            &TaskFilter {
                cadence: Some(Cadence::Daily),
                ..TaskFilter::default()
            },
        )
        .unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].title, "Cycle to work");

        let with_inactive = list_tasks(
            &conn,
            &TaskFilter {
                include_inactive: true,
                ..TaskFilter::default()
            },
        )
        .unwrap();
        assert_eq!(with_inactive.len(), 3);
    }

    #[test]
    fn bulk_create_is_all_or_nothing() {
        let mut conn = open_in_memory().unwrap();
        let mut bad = draft("Broken draft", Cadence::Daily);
        bad.points = 0;

        let result = create_tasks_bulk(
            &mut conn,
            &[draft("Good draft", Cadence::Daily), bad],
        );
        assert!(result.is_err());
        assert!(list_tasks(&conn, &TaskFilter::default()).unwrap().is_empty());

        let created = create_tasks_bulk(
            &mut conn,
            &[
                draft("First habit", Cadence::Daily),
                draft("Second habit", Cadence::Monthly),
            ],
        )
        .unwrap();
        assert_eq!(created.len(), 2);
    }

    #[test]
    fn update_edits_only_named_fields() {
        let conn = open_in_memory().unwrap();
        let task = create_task(&conn, &draft("Cycle to work", Cadence::Daily)).unwrap();

        update_task(
            &conn,
            &task.id,
            &TaskUpdate {
                points: Some(25),
                difficulty: Some(Difficulty::Hard),
                ..TaskUpdate::default()
            },
        )
        .unwrap();

        let updated = get_task(&conn, &task.id).unwrap().expect("task exists");
        assert_eq!(updated.points, 25);
        assert_eq!(updated.difficulty, Difficulty::Hard);
        assert_eq!(updated.title, task.title);
    }

    #[test]
    fn group_tasks_require_admin_to_create_and_membership_to_list() {
        let mut conn = open_in_memory().unwrap();
        let admin = crate::store::users::create_user(&conn, "Ada", "ada@example.org").unwrap();
        let member = crate::store::users::create_user(&conn, "Grace", "grace@example.org").unwrap();
        let outsider = crate::store::users::create_user(&conn, "Linus", "linus@example.org").unwrap();
        let group = crate::store::groups::create_group(
            &mut conn,
            "Green Campus",
            crate::model::group::GroupKind::University,
            &admin.id,
        )
        .unwrap();
        crate::store::groups::join_group(&mut conn, &group.id, &member.id).unwrap();

        let draft = draft("Campus audit", Cadence::Monthly);
        assert!(super::create_group_task(&conn, &group.id, &member.id, &draft).is_err());

        let task = super::create_group_task(&conn, &group.id, &admin.id, &draft).unwrap();
        assert!(task.is_group_task);
        assert_eq!(task.group_id, Some(group.id.clone()));

        let listed = super::list_group_tasks(&conn, &group.id, &member.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert!(super::list_group_tasks(&conn, &group.id, &outsider.id).is_err());

        let catalog = list_tasks(&conn, &TaskFilter::default()).unwrap();
        assert_eq!(catalog.len(), 1, "group tasks appear in the catalog too");
    }

    #[test]
    fn legacy_rows_normalize_on_read() {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO tasks (
                task_id, title, description, cadence, category, difficulty,
                points, created_at_us
             ) VALUES ('gv-00000000aaaa', 'Collect rainwater',
                       'Set up a barrel under the downspout.', 'yearly',
                       'water', 'medium', 40, 0)",
            params![],
        )
        .unwrap();

        let id = EntityId::parse("gv-00000000aaaa").unwrap();
        let task = get_task(&conn, &id).unwrap().expect("task exists");
        assert_eq!(task.category, Category::Environment);
        assert_eq!(task.cadence, Cadence::Yearly);
    }
}
