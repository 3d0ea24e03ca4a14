//! `gv log` — completion feed for a user or a group.

use crate::output::{OutputMode, render};
use anyhow::Result;
use chrono::DateTime;
use clap::Args;
use grove_core::config::EffectiveConfig;
use grove_core::model::completion::CompletionDetail;
use grove_core::store::completions;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct LogArgs {
    /// Show completions for this user.
    #[arg(long)]
    pub user: Option<String>,

    /// Show completions attributed to this group.
    #[arg(long)]
    pub group: Option<String>,
}

fn write_feed(feed: &[CompletionDetail], w: &mut dyn Write) -> std::io::Result<()> {
    for detail in feed {
        let when = DateTime::from_timestamp_micros(detail.completion.completed_at_us)
            .map_or_else(
                || detail.completion.completed_at_us.to_string(),
                |ts| ts.format("%Y-%m-%d %H:%M").to_string(),
            );
        let title = detail
            .task
            .as_ref()
            .map_or("(task removed)", |task| task.title.as_str());
        writeln!(
            w,
            "{when}  {:>5}  {title}",
            detail.completion.points_earned
        )?;
    }
    Ok(())
}

pub fn run_log(
    args: &LogArgs,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    let conn = super::open_project_store(project_root, config, mode)?;
    let limit = config.project.catalog.list_limit;

    let feed = if let Some(user) = &args.user {
        let user_id = super::parse_id(user, mode)?;
        completions::list_user_completions(&conn, &user_id, limit)?
    } else if let Some(group) = &args.group {
        let group_id = super::parse_id(group, mode)?;
        completions::list_group_completions(&conn, &group_id, limit)?
    } else {
        // clap's arg group guarantees one of the two is present.
        anyhow::bail!("one of --user or --group is required");
    };

    render(mode, &feed, |feed, w| write_feed(feed, w))
}
