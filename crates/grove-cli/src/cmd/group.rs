//! `gv group` — groups, membership, and admin management.

use crate::output::{CliError, OutputMode, human_kv, render, render_error, render_success};
use anyhow::Result;
use clap::{Args, Subcommand};
use grove_core::config::EffectiveConfig;
use grove_core::error::ErrorCode;
use grove_core::model::group::{Group, GroupKind};
use grove_core::store::groups;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// Create a group; the founder becomes its first admin.
    Add(AddArgs),
    /// List groups by total points.
    List,
    /// Show one group, including members and admins.
    Show(ShowArgs),
    /// Join a group.
    Join(MembershipArgs),
    /// Leave a group.
    Leave(MembershipArgs),
    /// Promote a member to group admin.
    Promote(PromoteArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Group name (2..=100 characters).
    #[arg(long)]
    pub name: String,

    /// Kind: university, school, municipality, ngo, company.
    #[arg(long)]
    pub kind: String,

    /// Founding user id.
    #[arg(long)]
    pub founder: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Group id.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct MembershipArgs {
    /// Group id.
    #[arg(long)]
    pub group: String,

    /// User id.
    #[arg(long)]
    pub user: String,
}

#[derive(Args, Debug)]
pub struct PromoteArgs {
    /// Group id.
    #[arg(long)]
    pub group: String,

    /// Acting admin's user id.
    #[arg(long = "as-admin")]
    pub as_admin: String,

    /// Member to promote.
    #[arg(long)]
    pub user: String,
}

fn write_group(group: &Group, w: &mut dyn Write) -> std::io::Result<()> {
    human_kv(w, "id", group.id.to_string())?;
    human_kv(w, "name", &group.name)?;
    human_kv(w, "kind", group.kind.as_str())?;
    human_kv(w, "total points", group.total_points.to_string())?;
    human_kv(w, "members", group.members.len().to_string())?;
    if !group.admins.is_empty() {
        let admins: Vec<String> = group.admins.iter().map(ToString::to_string).collect();
        human_kv(w, "admins", admins.join(", "))?;
    }
    Ok(())
}

pub fn run_group(
    command: &GroupCommand,
    mode: OutputMode,
    project_root: &Path,
    config: &EffectiveConfig,
) -> Result<()> {
    match command {
        GroupCommand::Add(args) => {
            let mut conn = super::open_project_store(project_root, config, mode)?;
            let kind = match GroupKind::from_str(&args.kind) {
                Ok(kind) => kind,
                Err(e) => {
                    render_error(
                        mode,
                        &CliError::new(ErrorCode::InvalidEnumValue, e.to_string()),
                    )?;
                    anyhow::bail!("{e}");
                }
            };
            let founder = super::parse_id(&args.founder, mode)?;
            let group = groups::create_group(&mut conn, &args.name, kind, &founder)?;
            render(mode, &group, |group, w| write_group(group, w))
        }
        GroupCommand::List => {
            let conn = super::open_project_store(project_root, config, mode)?;
            let list = groups::list_groups(&conn, config.project.catalog.list_limit)?;
            render(mode, &list, |list, w| {
                for group in list {
                    writeln!(
                        w,
                        "{}  {:>7}  {:<12} {}",
                        group.id,
                        group.total_points,
                        group.kind.as_str(),
                        group.name
                    )?;
                }
                Ok(())
            })
        }
        GroupCommand::Show(args) => {
            let conn = super::open_project_store(project_root, config, mode)?;
            let id = super::parse_id(&args.id, mode)?;
            match groups::get_group(&conn, &id)? {
                Some(group) => render(mode, &group, |group, w| write_group(group, w)),
                None => {
                    let code = ErrorCode::GroupNotFound;
                    render_error(mode, &CliError::new(code, format!("group '{id}' not found")))?;
                    anyhow::bail!("group '{id}' not found");
                }
            }
        }
        GroupCommand::Join(args) => {
            let mut conn = super::open_project_store(project_root, config, mode)?;
            let group_id = super::parse_id(&args.group, mode)?;
            let user_id = super::parse_id(&args.user, mode)?;
            groups::join_group(&mut conn, &group_id, &user_id)?;
            render_success(mode, &format!("User {user_id} joined group {group_id}."))
        }
        GroupCommand::Leave(args) => {
            let mut conn = super::open_project_store(project_root, config, mode)?;
            let group_id = super::parse_id(&args.group, mode)?;
            let user_id = super::parse_id(&args.user, mode)?;
            groups::leave_group(&mut conn, &group_id, &user_id)?;
            render_success(mode, &format!("User {user_id} left group {group_id}."))
        }
        GroupCommand::Promote(args) => {
            let conn = super::open_project_store(project_root, config, mode)?;
            let group_id = super::parse_id(&args.group, mode)?;
            let acting = super::parse_id(&args.as_admin, mode)?;
            let target = super::parse_id(&args.user, mode)?;
            if let Err(e) = groups::promote_admin(&conn, &group_id, &acting, &target) {
                render_error(
                    mode,
                    &CliError::new(ErrorCode::NotGroupAdmin, e.to_string()),
                )?;
                return Err(e);
            }
            render_success(mode, &format!("Promoted {target} to admin of {group_id}."))
        }
    }
}
