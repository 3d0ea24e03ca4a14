//! `gv user` — registration and lookup.

use crate::output::{CliError, OutputMode, human_kv, render, render_error, render_success};
use anyhow::Result;
use clap::{Args, Subcommand};
use grove_core::config::EffectiveConfig;
use grove_core::error::ErrorCode;
use grove_core::model::user::User;
use grove_core::store::users;
use std::io::Write;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a user.
    Add(AddArgs),
    /// List users.
    List,
    /// Show one user, including favorite tasks.
    Show(ShowArgs),
    /// Mark a task as a favorite for a user.
    Favorite(FavoriteArgs),
    /// Remove a task from a user's favorites.
    Unfavorite(FavoriteArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Display name (2..=100 characters).
    #[arg(long)]
    pub name: String,

    /// Email address; unique across the store.
    #[arg(long)]
    pub email: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// User id.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct FavoriteArgs {
    /// User id.
    #[arg(long)]
    pub user: String,

    /// Task id.
    #[arg(long)]
    pub task: String,
}

fn write_user(user: &User, w: &mut dyn Write) -> std::io::Result<()> {
    human_kv(w, "id", user.id.to_string())?;
    human_kv(w, "name", &user.name)?;
    human_kv(w, "email", &user.email)?;
    human_kv(w, "points", user.points.to_string())?;
    if let Some(group_id) = &user.group_id {
        human_kv(w, "group", group_id.to_string())?;
    }
    if !user.favorite_tasks.is_empty() {
        let favorites: Vec<String> = user
            .favorite_tasks
            .iter()
            .map(ToString::to_string)
            .collect();
        human_kv(w, "favorites", favorites.join(", "))?;
    }
    Ok(())
}

pub fn run_user(
    command: &UserCommand,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    match command {
        UserCommand::Add(args) => {
            let conn = super::open_project_store(project_root, config, mode)?;
            let user = users::create_user(&conn, &args.name, &args.email)?;
            render(mode, &user, |user, w| write_user(user, w))
        }
        UserCommand::List => {
            let conn = super::open_project_store(project_root, config, mode)?;
            let list = users::list_users(&conn, config.project.catalog.list_limit)?;
            render(mode, &list, |list, w| {
                for user in list {
                    writeln!(w, "{}  {:>6}  {}", user.id, user.points, user.name)?;
                }
                Ok(())
            })
        }
        UserCommand::Show(args) => {
            let conn = super::open_project_store(project_root, config, mode)?;
            let id = super::parse_id(&args.id, mode)?;
            match users::get_user(&conn, &id)? {
                Some(user) => render(mode, &user, |user, w| write_user(user, w)),
                None => {
                    let code = ErrorCode::UserNotFound;
                    render_error(mode, &CliError::new(code, format!("user '{id}' not found")))?;
                    anyhow::bail!("user '{id}' not found");
                }
            }
        }
        UserCommand::Favorite(args) => {
            let conn = super::open_project_store(project_root, config, mode)?;
            let user_id = super::parse_id(&args.user, mode)?;
            let task_id = super::parse_id(&args.task, mode)?;
            users::add_favorite(&conn, &user_id, &task_id)?;
            render_success(mode, &format!("Added {task_id} to favorites."))
        }
        UserCommand::Unfavorite(args) => {
            let conn = super::open_project_store(project_root, config, mode)?;
            let user_id = super::parse_id(&args.user, mode)?;
            let task_id = super::parse_id(&args.task, mode)?;
            users::remove_favorite(&conn, &user_id, &task_id)?;
            render_success(mode, &format!("Removed {task_id} from favorites."))
        }
    }
}
