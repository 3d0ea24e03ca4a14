//! `gv stats` — aggregate completion stats for one user.

use crate::output::{OutputMode, human_kv, render};
use anyhow::Result;
use chrono::DateTime;
use clap::Args;
use grove_core::config::EffectiveConfig;
use grove_core::store::completions;
use std::path::Path;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// User id.
    #[arg(long)]
    pub user: String,
}

fn format_us(us: Option<i64>) -> String {
    us.and_then(DateTime::from_timestamp_micros)
        .map_or_else(|| "-".to_string(), |ts| ts.format("%Y-%m-%d").to_string())
}

pub fn run_stats(
    args: &StatsArgs,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    let conn = super::open_project_store(project_root, config, mode)?;
    let user_id = super::parse_id(&args.user, mode)?;
    let stats = completions::user_stats(&conn, &user_id)?;

    render(mode, &stats, |stats, w| {
        human_kv(w, "completions", stats.total_completions.to_string())?;
        human_kv(w, "points", stats.total_points_earned.to_string())?;
        human_kv(w, "tasks", stats.distinct_tasks.to_string())?;
        human_kv(w, "first", format_us(stats.first_completed_at_us))?;
        human_kv(w, "last", format_us(stats.last_completed_at_us))
    })
}
