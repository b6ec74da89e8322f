//! CLI definition using clap derive.

use clap::{Parser, Subcommand};
use projmux_core::{LayoutMode, ShellKind};

#[derive(Parser)]
#[command(name = "projmux", about = "project/worktree-aware tmux pane navigator")]
pub struct Cli {
    /// Path to the projects file (default: $XDG_CONFIG_HOME/projmux/projects.json)
    #[arg(long, short = 'p', global = true)]
    pub projects: Option<String>,

    /// tmux socket path (falls back to PROJMUX_TMUX_SOCKET_PATH /
    /// PROJMUX_TMUX_SOCKET_NAME)
    #[arg(long, global = true)]
    pub tmux_socket: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one reconciliation cycle and list panes grouped by project
    Ls(LsOpts),
    /// Navigate to (or create) a project or worktree shell pane
    Attach(AttachOpts),
    /// Reconcile periodically and print topology updates
    Watch(WatchOpts),
}

#[derive(clap::Args, Default)]
pub struct LsOpts {
    /// Emit the topology as JSON instead of a tree
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct AttachOpts {
    /// Project name from the projects file
    pub project: String,

    /// Worktree id; omit for the project-level pane
    #[arg(long, short = 'w')]
    pub worktree: Option<String>,

    /// Shell kind to navigate to
    #[arg(long, short = 'k', default_value = "assistant", value_parser = parse_shell_kind)]
    pub kind: ShellKind,

    /// Window layout policy
    #[arg(long, default_value = "grouped", value_parser = parse_layout_mode)]
    pub layout: LayoutMode,
}

#[derive(clap::Args)]
pub struct WatchOpts {
    /// Reconciliation interval in milliseconds
    #[arg(long, default_value = "2000")]
    pub interval_ms: u64,

    /// Minimum gap between topology prints in milliseconds
    #[arg(long, default_value = "500")]
    pub debounce_ms: u64,
}

fn parse_shell_kind(s: &str) -> Result<ShellKind, String> {
    s.parse()
}

fn parse_layout_mode(s: &str) -> Result<LayoutMode, String> {
    s.parse()
}

/// Default projects-file location, per-user.
pub fn default_projects_path() -> String {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        return format!("{dir}/projmux/projects.json");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.config/projmux/projects.json")
}
