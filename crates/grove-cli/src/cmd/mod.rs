//! Command handlers for the `gv` binary.

pub mod complete;
pub mod group;
pub mod init;
pub mod log;
pub mod stats;
pub mod task;
pub mod top;
pub mod user;

use crate::output::{CliError, OutputMode, render_error};
use anyhow::Result;
use grove_core::config::{EffectiveConfig, GROVE_DIR, store_path};
use grove_core::error::ErrorCode;
use grove_core::model::id::EntityId;
use rusqlite::Connection;
use std::path::Path;

/// Open the project store, failing with a clear error when `gv init` has
/// not been run in this directory.
pub fn open_project_store(
    project_root: &Path,
    config: &EffectiveConfig,
    mode: OutputMode,
) -> Result<Connection> {
    if !project_root.join(GROVE_DIR).exists() {
        let code = ErrorCode::NotInitialized;
        render_error(mode, &CliError::new(code, code.message()))?;
        anyhow::bail!("{}", code.message());
    }

    grove_core::db::open_store(&store_path(project_root, &config.project))
}

/// Parse a `gv-` identifier argument, rendering a structured error on failure.
pub fn parse_id(raw: &str, mode: OutputMode) -> Result<EntityId> {
    match EntityId::parse(raw) {
        Ok(id) => Ok(id),
        Err(e) => {
            render_error(
                mode,
                &CliError::new(ErrorCode::InvalidIdentifier, e.to_string()),
            )?;
            anyhow::bail!("{e}");
        }
    }
}
