//! `gv complete` — settle a task completion for a user.

use crate::output::{CliError, OutputMode, human_kv, render, render_error};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use grove_core::config::EffectiveConfig;
use grove_core::engine::{CompleteError, CompletionRequest, complete_task, complete_task_now};
use std::path::Path;

#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// Task id.
    #[arg(long)]
    pub task: String,

    /// Completing user id.
    #[arg(long)]
    pub user: String,

    /// Attribute the points to this group as well.
    #[arg(long)]
    pub group: Option<String>,

    /// Complete at this RFC 3339 instant instead of now (useful in scripts
    /// and tests).
    #[arg(long, value_name = "RFC3339")]
    pub at: Option<DateTime<Utc>>,
}

pub fn run_complete(
    args: &CompleteArgs,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    let mut conn = super::open_project_store(project_root, config, mode)?;

    let req = CompletionRequest {
        task_id: super::parse_id(&args.task, mode)?,
        user_id: super::parse_id(&args.user, mode)?,
        group_id: args
            .group
            .as_deref()
            .map(|raw| super::parse_id(raw, mode))
            .transpose()?,
    };

    let result = match args.at {
        Some(at) => complete_task(&mut conn, &req, at),
        None => complete_task_now(&mut conn, &req),
    };

    match result {
        Ok(completion) => render(mode, &completion, |completion, w| {
            human_kv(w, "completion", completion.id.to_string())?;
            human_kv(w, "task", completion.task_id.to_string())?;
            human_kv(w, "user", completion.user_id.to_string())?;
            if let Some(group_id) = &completion.group_id {
                human_kv(w, "group", group_id.to_string())?;
            }
            human_kv(w, "points", completion.points_earned.to_string())
        }),
        Err(e) => {
            let message = match &e {
                CompleteError::Duplicate(dup) => dup.message().to_string(),
                other => other.to_string(),
            };
            render_error(mode, &CliError::new(e.code(), message))?;
            Err(e.into())
        }
    }
}
