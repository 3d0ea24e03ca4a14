#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "grove: habit tracking with eligibility windows and point settlement",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Initialize a grove project",
        long_about = "Initialize a grove project in the current directory.",
        after_help = "EXAMPLES:\n    # Initialize a project in the current directory\n    gv init\n\n    # Emit machine-readable output\n    gv init --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(about = "Manage the task catalog")]
    Task {
        #[command(subcommand)]
        command: cmd::task::TaskCommand,
    },

    #[command(about = "Manage users")]
    User {
        #[command(subcommand)]
        command: cmd::user::UserCommand,
    },

    #[command(about = "Manage groups and membership")]
    Group {
        #[command(subcommand)]
        command: cmd::group::GroupCommand,
    },

    #[command(
        about = "Complete a task for a user",
        long_about = "Complete a task for a user, settling points atomically. At most one \
                      completion per task, user, and eligibility window.",
        after_help = "EXAMPLES:\n    # Complete a task\n    gv complete --task gv-0123456789ab --user gv-ba9876543210\n\n    # Attribute the points to a group as well\n    gv complete --task gv-0123456789ab --user gv-ba9876543210 --group gv-aaaabbbbcccc"
    )]
    Complete(cmd::complete::CompleteArgs),

    #[command(
        about = "Show a completion feed",
        after_help = "EXAMPLES:\n    # A user's recent completions\n    gv log --user gv-ba9876543210\n\n    # A group's recent completions\n    gv log --group gv-aaaabbbbcccc"
    )]
    Log(cmd::log::LogArgs),

    #[command(
        about = "Show leaderboards",
        after_help = "EXAMPLES:\n    # Top users by points\n    gv top users\n\n    # Top 3 groups\n    gv top groups --limit 3"
    )]
    Top(cmd::top::TopArgs),

    #[command(about = "Show aggregate stats for a user")]
    Stats(cmd::stats::StatsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GROVE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "grove=debug,info"
        } else {
            "grove=info,warn"
        })
    });

    let format = env::var("GROVE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry.with(fmt::layer().json().with_ansi(false)).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = std::env::current_dir()?;
    let config = grove_core::config::resolve_config(&project_root, cli.json)?;
    let mode = OutputMode::from_resolved(&config.resolved_output);

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, mode, &project_root),
        Commands::Task { ref command } => {
            cmd::task::run_task(command, mode, &project_root, &config)
        }
        Commands::User { ref command } => {
            cmd::user::run_user(command, mode, &project_root, &config)
        }
        Commands::Group { ref command } => {
            cmd::group::run_group(command, mode, &project_root, &config)
        }
        Commands::Complete(ref args) => {
            cmd::complete::run_complete(args, mode, &project_root, &config)
        }
        Commands::Log(ref args) => cmd::log::run_log(args, mode, &project_root, &config),
        Commands::Top(ref args) => cmd::top::run_top(args, mode, &project_root, &config),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, mode, &project_root, &config),
    }
}
