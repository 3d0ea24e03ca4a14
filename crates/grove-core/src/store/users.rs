//! User reads and writes.

use super::now_us;
use crate::model::id::EntityId;
use crate::model::user::User;
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, Row, params};

const USER_COLUMNS: &str = "user_id, name, email, points, group_id, is_admin, created_at_us";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        points: row.get(3)?,
        group_id: row.get(4)?,
        favorite_tasks: Vec::new(),
        is_admin: row.get(5)?,
        created_at_us: row.get(6)?,
    })
}

fn load_favorites(conn: &Connection, user_id: &EntityId) -> Result<Vec<EntityId>> {
    let mut stmt = conn
        .prepare(
            "SELECT task_id FROM user_favorites
             WHERE user_id = ?1
             ORDER BY created_at_us ASC",
        )
        .context("prepare load_favorites query")?;

    let rows = stmt
        .query_map(params![user_id], |row| row.get(0))
        .context("execute load_favorites query")?;

    let mut favorites = Vec::new();
    for row in rows {
        favorites.push(row.context("read favorite row")?);
    }
    Ok(favorites)
}

/// Register a user. Emails are unique across the store.
///
/// # Errors
///
/// Returns an error if the name is out of bounds, the email is taken, or
/// the insert fails.
pub fn create_user(conn: &Connection, name: &str, email: &str) -> Result<User> {
    let name = name.trim();
    if !(2..=100).contains(&name.chars().count()) {
        bail!("user name must be 2..=100 characters");
    }

    let user = User {
        id: EntityId::generate(),
        name: name.to_string(),
        email: email.trim().to_ascii_lowercase(),
        points: 0,
        group_id: None,
        favorite_tasks: Vec::new(),
        is_admin: false,
        created_at_us: now_us(),
    };

    conn.execute(
        "INSERT INTO users (user_id, name, email, points, is_admin, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.name,
            user.email,
            user.points,
            user.is_admin,
            user.created_at_us
        ],
    )
    .with_context(|| format!("insert user '{}'", user.email))?;

    Ok(user)
}

/// Fetch a user by id, including their favorite task ids.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_user(conn: &Connection, user_id: &EntityId) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1");
    let user = conn
        .query_row(&sql, params![user_id], row_to_user)
        .optional()
        .with_context(|| format!("get_user for '{user_id}'"))?;

    match user {
        Some(mut user) => {
            user.favorite_tasks = load_favorites(conn, user_id)?;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

/// List users, newest first. Favorites are not loaded in list context.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &Connection, limit: u32) -> Result<Vec<User>> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users \
         ORDER BY created_at_us DESC, user_id ASC LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql).context("prepare list_users query")?;

    let rows = stmt
        .query_map(params![limit], row_to_user)
        .context("execute list_users query")?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row.context("read list_users row")?);
    }
    Ok(users)
}

/// Add a task to a user's favorites. Adding twice is a no-op.
///
/// # Errors
///
/// Returns an error if either entity is missing or the insert fails.
pub fn add_favorite(conn: &Connection, user_id: &EntityId, task_id: &EntityId) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO user_favorites (user_id, task_id, created_at_us)
         VALUES (?1, ?2, ?3)",
        params![user_id, task_id, now_us()],
    )
    .with_context(|| format!("add favorite '{task_id}' for '{user_id}'"))?;
    Ok(())
}

/// Remove a task from a user's favorites. Removing a non-favorite is a no-op.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn remove_favorite(conn: &Connection, user_id: &EntityId, task_id: &EntityId) -> Result<()> {
    conn.execute(
        "DELETE FROM user_favorites WHERE user_id = ?1 AND task_id = ?2",
        params![user_id, task_id],
    )
    .with_context(|| format!("remove favorite '{task_id}' for '{user_id}'"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{add_favorite, create_user, get_user, list_users, remove_favorite};
    use crate::db::open_in_memory;
    use crate::model::task::{Cadence, Category, Difficulty, TaskDraft};
    use crate::store::tasks::create_task;

    #[test]
    fn create_then_get_roundtrips() {
        let conn = open_in_memory().unwrap();
        let user = create_user(&conn, "Ada", "Ada@Example.org").unwrap();

        let fetched = get_user(&conn, &user.id).unwrap().expect("user exists");
        assert_eq!(fetched, user);
        assert_eq!(fetched.email, "ada@example.org");
        assert_eq!(fetched.points, 0);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = open_in_memory().unwrap();
        create_user(&conn, "Ada", "ada@example.org").unwrap();
        assert!(create_user(&conn, "Another Ada", "ada@example.org").is_err());
        assert_eq!(list_users(&conn, 100).unwrap().len(), 1);
    }

    #[test]
    fn short_name_is_rejected() {
        let conn = open_in_memory().unwrap();
        assert!(create_user(&conn, "A", "a@example.org").is_err());
    }

    #[test]
    fn favorites_roundtrip_and_tolerate_repeats() {
        let conn = open_in_memory().unwrap();
        let user = create_user(&conn, "Ada", "ada@example.org").unwrap();
        let task = create_task(
            &conn,
            &TaskDraft {
                title: "Cycle to work".to_string(),
                description: "Leave the car at home and cycle instead.".to_string(),
                cadence: Cadence::Daily,
                category: Category::Environment,
                difficulty: Difficulty::Medium,
                points: 20,
            },
        )
        .unwrap();

        add_favorite(&conn, &user.id, &task.id).unwrap();
        add_favorite(&conn, &user.id, &task.id).unwrap();

        let fetched = get_user(&conn, &user.id).unwrap().expect("user exists");
        assert_eq!(fetched.favorite_tasks, vec![task.id.clone()]);

        remove_favorite(&conn, &user.id, &task.id).unwrap();
        let fetched = get_user(&conn, &user.id).unwrap().expect("user exists");
        assert!(fetched.favorite_tasks.is_empty());
    }
}
