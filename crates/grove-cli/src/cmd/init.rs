use crate::output::{OutputMode, render_success};
use anyhow::{Context as _, Result};
use clap::Args;
use grove_core::config::GROVE_DIR;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force re-initialization even if `.grove/` already exists.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[store]\n\
    db_file = \"grove.db\"\n\
    \n\
    [catalog]\n\
    list_limit = 100\n";

const GITIGNORE: &str = "grove.db\ngrove.db-wal\ngrove.db-shm\n";

/// Execute `gv init`. Creates the project skeleton:
///
/// ```text
/// .grove/
///   grove.db       (SQLite store, migrated to the latest schema)
///   config.toml    (default project config template)
///   .gitignore     (store and WAL sidecar files)
/// ```
///
/// # Errors
///
/// Returns an error if `.grove/` already exists and `--force` is not set,
/// or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, mode: OutputMode, project_root: &Path) -> Result<()> {
    let grove_dir = project_root.join(GROVE_DIR);

    if grove_dir.exists() && !args.force {
        anyhow::bail!(".grove/ already exists. Use `gv init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&grove_dir)
        .with_context(|| format!("Failed to create {}", grove_dir.display()))?;

    let config_path = grove_dir.join("config.toml");
    std::fs::write(&config_path, CONFIG_TOML)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = grove_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    // Opening the store creates and migrates the database.
    let db_path = grove_dir.join("grove.db");
    grove_core::db::open_store(&db_path)
        .with_context(|| format!("Failed to initialize store: {}", db_path.display()))?;

    render_success(mode, "Initialized .grove/ project structure.")?;
    if mode == OutputMode::Human {
        println!();
        println!("Next steps:");
        println!("  Add a task:       gv task add --title \"Cycle to work\" ...");
        println!("  Register a user:  gv user add --name Ada --email ada@example.org");
        println!("  Complete a task:  gv complete --task <task-id> --user <user-id>");
    }

    Ok(())
}
