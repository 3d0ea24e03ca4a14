//! `gv task` — catalog management: add, import, list, show, retire.

use crate::output::{CliError, OutputMode, human_kv, render, render_error, render_success};
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use grove_core::config::EffectiveConfig;
use grove_core::error::ErrorCode;
use grove_core::model::task::{Cadence, Category, Difficulty, Task, TaskDraft};
use grove_core::store::tasks::{self, TaskFilter, TaskUpdate};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task to the catalog.
    Add(AddArgs),
    /// Import tasks in bulk from a JSON file (all-or-nothing).
    Import(ImportArgs),
    /// List catalog tasks.
    List(ListArgs),
    /// Show one task.
    Show(ShowArgs),
    /// Retire a task so it stops appearing in the catalog.
    Retire(ShowArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title (3..=200 characters).
    #[arg(long)]
    pub title: String,

    /// Task description (10..=1000 characters).
    #[arg(long)]
    pub description: String,

    /// Cadence: daily, weekly, monthly, one_time.
    #[arg(long)]
    pub cadence: String,

    /// Category: health, education, work, social, environment, other.
    #[arg(long)]
    pub category: String,

    /// Difficulty: easy, medium, hard.
    #[arg(long)]
    pub difficulty: String,

    /// Points awarded per completion (1..=2000).
    #[arg(long)]
    pub points: u32,

    /// Create the task inside a group (requires --as-admin).
    #[arg(long)]
    pub group: Option<String>,

    /// Acting user for group task creation; must be a group admin.
    #[arg(long = "as-admin")]
    pub as_admin: Option<String>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file with an array of task drafts.
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by cadence.
    #[arg(long)]
    pub cadence: Option<String>,

    /// Filter by category.
    #[arg(long)]
    pub category: Option<String>,

    /// Filter by difficulty.
    #[arg(long)]
    pub difficulty: Option<String>,

    /// Include retired tasks.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task id (`gv-` followed by 12 hex characters).
    pub id: String,
}

fn parse_enum<T: FromStr>(raw: &str, mode: OutputMode) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match raw.parse() {
        Ok(value) => Ok(value),
        Err(e) => {
            render_error(
                mode,
                &CliError::new(ErrorCode::InvalidEnumValue, e.to_string()),
            )?;
            anyhow::bail!("{e}");
        }
    }
}

fn write_task(task: &Task, w: &mut dyn Write) -> std::io::Result<()> {
    human_kv(w, "id", task.id.to_string())?;
    human_kv(w, "title", &task.title)?;
    human_kv(w, "cadence", task.cadence.as_str())?;
    human_kv(w, "category", task.category.as_str())?;
    human_kv(w, "difficulty", task.difficulty.as_str())?;
    human_kv(w, "points", task.points.to_string())?;
    human_kv(w, "active", if task.is_active { "yes" } else { "no" })?;
    if let Some(group_id) = &task.group_id {
        human_kv(w, "group", group_id.to_string())?;
    }
    Ok(())
}

pub fn run_task(
    command: &TaskCommand,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    match command {
        TaskCommand::Add(args) => run_add(args, mode, project_root, config),
        TaskCommand::Import(args) => run_import(args, mode, project_root, config),
        TaskCommand::List(args) => run_list(args, mode, project_root, config),
        TaskCommand::Show(args) => run_show(args, mode, project_root, config),
        TaskCommand::Retire(args) => run_retire(args, mode, project_root, config),
    }
}

fn draft_from_args(args: &AddArgs, mode: OutputMode) -> Result<TaskDraft> {
    Ok(TaskDraft {
        title: args.title.clone(),
        description: args.description.clone(),
        cadence: parse_enum::<Cadence>(&args.cadence, mode)?,
        category: parse_enum::<Category>(&args.category, mode)?,
        difficulty: parse_enum::<Difficulty>(&args.difficulty, mode)?,
        points: args.points,
    })
}

fn run_add(
    args: &AddArgs,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    let conn = super::open_project_store(project_root, config, mode)?;
    let draft = draft_from_args(args, mode)?;

    let created = match (&args.group, &args.as_admin) {
        (Some(group), Some(acting)) => {
            let group_id = super::parse_id(group, mode)?;
            let acting_user = super::parse_id(acting, mode)?;
            tasks::create_group_task(&conn, &group_id, &acting_user, &draft)
        }
        (Some(_), None) => anyhow::bail!("--group requires --as-admin <user-id>"),
        (None, Some(_)) => anyhow::bail!("--as-admin only applies with --group"),
        (None, None) => tasks::create_task(&conn, &draft),
    };

    match created {
        Ok(task) => render(mode, &task, |task, w| write_task(task, w)),
        Err(e) => {
            render_error(mode, &CliError::new(ErrorCode::InvalidDraft, e.to_string()))?;
            Err(e)
        }
    }
}

fn run_import(
    args: &ImportArgs,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    let mut conn = super::open_project_store(project_root, config, mode)?;

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let drafts: Vec<TaskDraft> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    let created = tasks::create_tasks_bulk(&mut conn, &drafts)?;
    render_success(mode, &format!("Imported {} tasks.", created.len()))
}

fn run_list(
    args: &ListArgs,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    let conn = super::open_project_store(project_root, config, mode)?;

    let filter = TaskFilter {
        cadence: args
            .cadence
            .as_deref()
            .map(|raw| parse_enum(raw, mode))
            .transpose()?,
        category: args
            .category
            .as_deref()
            .map(|raw| parse_enum(raw, mode))
            .transpose()?,
        difficulty: args
            .difficulty
            .as_deref()
            .map(|raw| parse_enum(raw, mode))
            .transpose()?,
        include_inactive: args.all,
        limit: Some(config.project.catalog.list_limit),
    };

    let list = tasks::list_tasks(&conn, &filter)?;
    render(mode, &list, |list, w| {
        for task in list {
            writeln!(
                w,
                "{}  {:<9} {:<12} {:>5}  {}",
                task.id,
                task.cadence.as_str(),
                task.category.as_str(),
                task.points,
                task.title
            )?;
        }
        Ok(())
    })
}

fn run_show(
    args: &ShowArgs,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    let conn = super::open_project_store(project_root, config, mode)?;
    let id = super::parse_id(&args.id, mode)?;

    match tasks::get_task(&conn, &id)? {
        Some(task) => render(mode, &task, |task, w| write_task(task, w)),
        None => {
            let code = ErrorCode::TaskNotFound;
            render_error(mode, &CliError::new(code, format!("task '{id}' not found")))?;
            anyhow::bail!("task '{id}' not found");
        }
    }
}

fn run_retire(
    args: &ShowArgs,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    let conn = super::open_project_store(project_root, config, mode)?;
    let id = super::parse_id(&args.id, mode)?;

    tasks::update_task(
        &conn,
        &id,
        &TaskUpdate {
            is_active: Some(false),
            ..TaskUpdate::default()
        },
    )?;
    render_success(mode, &format!("Retired task {id}."))
}
