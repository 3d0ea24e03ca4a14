//! Group reads, membership, and admin management.
//!
//! Membership lives in `group_members`; `users.group_id` mirrors the user's
//! current group so joins and leaves touch both inside one transaction.

use super::{now_us, parse_text_col};
use crate::model::group::{Group, GroupKind};
use crate::model::id::EntityId;
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, Row, params};

const GROUP_COLUMNS: &str = "group_id, name, kind, total_points, created_at_us";

fn row_to_group(row: &Row<'_>) -> rusqlite::Result<Group> {
    let kind: String = row.get(2)?;
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: parse_text_col(2, &kind)?,
        members: Vec::new(),
        admins: Vec::new(),
        total_points: row.get(3)?,
        created_at_us: row.get(4)?,
    })
}

fn load_membership(conn: &Connection, group: &mut Group) -> Result<()> {
    let mut stmt = conn
        .prepare(
            "SELECT user_id, is_admin FROM group_members
             WHERE group_id = ?1
             ORDER BY joined_at_us ASC",
        )
        .context("prepare membership query")?;

    let rows = stmt
        .query_map(params![group.id], |row| {
            Ok((row.get::<_, EntityId>(0)?, row.get::<_, bool>(1)?))
        })
        .context("execute membership query")?;

    for row in rows {
        let (user_id, is_admin) = row.context("read membership row")?;
        if is_admin {
            group.admins.push(user_id.clone());
        }
        group.members.push(user_id);
    }
    Ok(())
}

/// Create a group. The founder becomes its first member and admin.
///
/// # Errors
///
/// Returns an error if the founder does not exist, the name is out of
/// bounds, or the insert fails.
pub fn create_group(
    conn: &mut Connection,
    name: &str,
    kind: GroupKind,
    founder: &EntityId,
) -> Result<Group> {
    let name = name.trim();
    if !(2..=100).contains(&name.chars().count()) {
        bail!("group name must be 2..=100 characters");
    }
    if super::users::get_user(conn, founder)
        .context("look up founder")?
        .is_none()
    {
        bail!("founder user '{founder}' not found");
    }

    let group = Group {
        id: EntityId::generate(),
        name: name.to_string(),
        kind,
        members: vec![founder.clone()],
        admins: vec![founder.clone()],
        total_points: 0,
        created_at_us: now_us(),
    };

    let tx = conn.transaction().context("begin create_group")?;
    tx.execute(
        "INSERT INTO groups (group_id, name, kind, total_points, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            group.id,
            group.name,
            group.kind.as_str(),
            group.total_points,
            group.created_at_us
        ],
    )
    .with_context(|| format!("insert group '{}'", group.name))?;
    tx.execute(
        "INSERT INTO group_members (group_id, user_id, is_admin, joined_at_us)
         VALUES (?1, ?2, 1, ?3)",
        params![group.id, founder, group.created_at_us],
    )
    .context("insert founding membership")?;
    tx.execute(
        "UPDATE users SET group_id = ?1 WHERE user_id = ?2",
        params![group.id, founder],
    )
    .context("point founder at new group")?;
    tx.commit().context("commit create_group")?;

    Ok(group)
}

/// Fetch a group by id, including member and admin lists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_group(conn: &Connection, group_id: &EntityId) -> Result<Option<Group>> {
    let sql = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE group_id = ?1");
    let group = conn
        .query_row(&sql, params![group_id], row_to_group)
        .optional()
        .with_context(|| format!("get_group for '{group_id}'"))?;

    match group {
        Some(mut group) => {
            load_membership(conn, &mut group)?;
            Ok(Some(group))
        }
        None => Ok(None),
    }
}

/// List groups ordered by total points. Member lists are not loaded.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_groups(conn: &Connection, limit: u32) -> Result<Vec<Group>> {
    let sql = format!(
        "SELECT {GROUP_COLUMNS} FROM groups \
         ORDER BY total_points DESC, group_id ASC LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql).context("prepare list_groups query")?;

    let rows = stmt
        .query_map(params![limit], row_to_group)
        .context("execute list_groups query")?;

    let mut groups = Vec::new();
    for row in rows {
        groups.push(row.context("read list_groups row")?);
    }
    Ok(groups)
}

/// Add a user to a group. A user belongs to at most one group at a time,
/// so joining replaces any previous membership.
///
/// # Errors
///
/// Returns an error if either entity is missing or the writes fail.
pub fn join_group(conn: &mut Connection, group_id: &EntityId, user_id: &EntityId) -> Result<()> {
    if !group_exists(conn, group_id)? {
        bail!("group '{group_id}' not found");
    }
    let Some(user) = super::users::get_user(conn, user_id).context("look up joining user")? else {
        bail!("user '{user_id}' not found");
    };
    // Re-joining the current group is a no-op; it must not reset the
    // member's admin flag or join time.
    if user.group_id.as_ref() == Some(group_id) {
        return Ok(());
    }

    let tx = conn.transaction().context("begin join_group")?;
    if let Some(previous) = &user.group_id {
        tx.execute(
            "DELETE FROM group_members WHERE group_id = ?1 AND user_id = ?2",
            params![previous, user_id],
        )
        .context("drop previous membership")?;
    }
    tx.execute(
        "INSERT OR IGNORE INTO group_members (group_id, user_id, is_admin, joined_at_us)
         VALUES (?1, ?2, 0, ?3)",
        params![group_id, user_id, now_us()],
    )
    .context("insert membership")?;
    tx.execute(
        "UPDATE users SET group_id = ?1 WHERE user_id = ?2",
        params![group_id, user_id],
    )
    .context("update user group pointer")?;
    tx.commit().context("commit join_group")?;

    Ok(())
}

/// Remove a user from a group.
///
/// # Errors
///
/// Returns an error if the user is not a member or the writes fail.
pub fn leave_group(conn: &mut Connection, group_id: &EntityId, user_id: &EntityId) -> Result<()> {
    if !is_group_member(conn, group_id, user_id)? {
        bail!("user '{user_id}' is not a member of group '{group_id}'");
    }

    let tx = conn.transaction().context("begin leave_group")?;
    tx.execute(
        "DELETE FROM group_members WHERE group_id = ?1 AND user_id = ?2",
        params![group_id, user_id],
    )
    .context("delete membership")?;
    tx.execute(
        "UPDATE users SET group_id = NULL WHERE user_id = ?1 AND group_id = ?2",
        params![user_id, group_id],
    )
    .context("clear user group pointer")?;
    tx.commit().context("commit leave_group")?;

    Ok(())
}

/// Promote a member to group admin. Only an existing admin may promote.
///
/// # Errors
///
/// Returns an error if the acting user is not an admin, the target is not
/// a member, or the update fails.
pub fn promote_admin(
    conn: &Connection,
    group_id: &EntityId,
    acting_user: &EntityId,
    target_user: &EntityId,
) -> Result<()> {
    if !is_group_admin(conn, group_id, acting_user)? {
        bail!("user '{acting_user}' is not an admin of group '{group_id}'");
    }

    let updated = conn
        .execute(
            "UPDATE group_members SET is_admin = 1
             WHERE group_id = ?1 AND user_id = ?2",
            params![group_id, target_user],
        )
        .context("promote member to admin")?;
    if updated == 0 {
        bail!("user '{target_user}' is not a member of group '{group_id}'");
    }

    Ok(())
}

pub(crate) fn group_exists(conn: &Connection, group_id: &EntityId) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM groups WHERE group_id = ?1)",
        params![group_id],
        |row| row.get(0),
    )
    .with_context(|| format!("check group '{group_id}' exists"))
}

pub(crate) fn is_group_member(
    conn: &Connection,
    group_id: &EntityId,
    user_id: &EntityId,
) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM group_members WHERE group_id = ?1 AND user_id = ?2
        )",
        params![group_id, user_id],
        |row| row.get(0),
    )
    .with_context(|| format!("check membership of '{user_id}' in '{group_id}'"))
}

pub(crate) fn is_group_admin(
    conn: &Connection,
    group_id: &EntityId,
    user_id: &EntityId,
) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM group_members
            WHERE group_id = ?1 AND user_id = ?2 AND is_admin = 1
        )",
        params![group_id, user_id],
        |row| row.get(0),
    )
    .with_context(|| format!("check admin role of '{user_id}' in '{group_id}'"))
}
