//! `gv top` — leaderboards.

use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::{Args, ValueEnum};
use grove_core::config::EffectiveConfig;
use grove_core::store::completions;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TopKind {
    Users,
    Groups,
}

#[derive(Args, Debug)]
pub struct TopArgs {
    /// Which leaderboard to show.
    #[arg(value_enum)]
    pub kind: TopKind,

    /// Number of entries.
    #[arg(long, default_value_t = 10)]
    pub limit: u32,
}

pub fn run_top(
    args: &TopArgs,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    let conn = super::open_project_store(project_root, config, mode)?;

    let board = match args.kind {
        TopKind::Users => completions::top_users(&conn, args.limit)?,
        TopKind::Groups => completions::top_groups(&conn, args.limit)?,
    };

    render(mode, &board, |board, w| {
        for entry in board {
            writeln!(
                w,
                "{:>3}. {:>7}  {}  {}",
                entry.rank, entry.points, entry.id, entry.name
            )?;
        }
        Ok(())
    })
}
