//! Window/pane allocation: ensure a window exists for a project or
//! worktree, and ensure a pane of a requested kind exists within it.
//!
//! Layout policy decides the window key:
//! - grouped: one window per project, named after the project; it only
//!   counts as the project window when every pane in it sits inside the
//!   project directory.
//! - unsplit: one window per (project, kind), named `project:kind`, so
//!   switching modes never collides with windows made under the other one.
//!
//! A window created here already runs the requested kind's command in pane
//! 0 — callers must not also split one in for the same request.

use std::path::Path;

use projmux_core::{LayoutMode, PaneTarget, Project, ShellKind, Worktree, classify, path_within};
use projmux_tmux::{
    TmuxCommandRunner, TmuxError, create_session, create_window, list_window_pane_paths,
    list_window_panes, list_windows, session_exists, split_pane,
};

use crate::config::EngineConfig;
use crate::error::AllocationError;

/// A window the allocator resolved or created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRef {
    pub session: String,
    pub index: u32,
    pub name: String,
}

impl WindowRef {
    pub fn pane_target(&self, pane: u32) -> PaneTarget {
        PaneTarget::new(self.session.clone(), self.index, pane)
    }
}

/// tmux-safe window/session name: path separators and spaces replaced.
pub fn sanitize_name(name: &str) -> String {
    name.replace('/', "-").replace(' ', "_")
}

/// Session hosting a project's windows, named after the project.
pub fn session_name(project: &Project) -> String {
    sanitize_name(&project.name)
}

fn project_window_name(project: &Project, kind: ShellKind, layout: LayoutMode) -> String {
    match layout {
        LayoutMode::Grouped => sanitize_name(&project.name),
        LayoutMode::Unsplit => sanitize_name(&format!("{}:{}", project.name, kind)),
    }
}

fn worktree_window_name(worktree: &Worktree, kind: ShellKind) -> String {
    sanitize_name(&format!("worktree-{}-{}", worktree.id, kind))
}

/// Create the project session if it does not exist yet.
pub fn ensure_session(
    runner: &impl TmuxCommandRunner,
    name: &str,
    start_path: &Path,
) -> Result<(), AllocationError> {
    if session_exists(runner, name) {
        return Ok(());
    }
    tracing::info!(session = name, "creating session");
    create_session(runner, name, start_path)?;
    if !session_exists(runner, name) {
        return Err(AllocationError::SessionUnavailable(name.to_string()));
    }
    Ok(())
}

/// Ensure a window exists for project-level shells of `kind`. Returns the
/// window and whether it was created by this call (in which case its pane 0
/// already runs the kind's command).
pub fn ensure_project_window(
    runner: &impl TmuxCommandRunner,
    project: &Project,
    kind: ShellKind,
    cfg: &EngineConfig,
) -> Result<(WindowRef, bool), AllocationError> {
    let session = session_name(project);
    ensure_session(runner, &session, &project.path)?;

    let name = project_window_name(project, kind, cfg.layout);
    for window in list_windows(runner, &session)? {
        if window.name != name {
            continue;
        }
        // In grouped mode the name alone is not proof: the user may have
        // renamed or repurposed a window. Every pane must still sit inside
        // the project directory.
        if cfg.layout == LayoutMode::Grouped
            && !window_is_rooted_at(runner, &session, window.index, &project.path)
        {
            continue;
        }
        tracing::debug!(%session, window = window.index, "found existing project window");
        return Ok((
            WindowRef {
                session,
                index: window.index,
                name,
            },
            false,
        ));
    }

    let command = cfg.commands.command_for(kind);
    let index = create_window(runner, &session, &name, Some(command), &project.path)?;
    tracing::info!(%session, window = index, command, "created project window");
    Ok((
        WindowRef {
            session,
            index,
            name,
        },
        true,
    ))
}

/// Worktree variant: the window keys on (worktree, kind) regardless of
/// layout mode and is rooted at the worktree path.
pub fn ensure_worktree_window(
    runner: &impl TmuxCommandRunner,
    project: &Project,
    worktree: &Worktree,
    kind: ShellKind,
    cfg: &EngineConfig,
) -> Result<(WindowRef, bool), AllocationError> {
    let session = session_name(project);
    ensure_session(runner, &session, &project.path)?;

    let name = worktree_window_name(worktree, kind);
    if let Some(window) = list_windows(runner, &session)?
        .into_iter()
        .find(|w| w.name == name)
    {
        return Ok((
            WindowRef {
                session,
                index: window.index,
                name,
            },
            false,
        ));
    }

    let command = cfg.commands.command_for(kind);
    let index = create_window(runner, &session, &name, Some(command), &worktree.path)?;
    tracing::info!(%session, window = index, worktree = %worktree.id, "created worktree window");
    Ok((
        WindowRef {
            session,
            index,
            name,
        },
        true,
    ))
}

/// Look inside an existing window for a pane already running the requested
/// kind.
pub fn find_kind_pane_in_window(
    runner: &impl TmuxCommandRunner,
    window: &WindowRef,
    kind: ShellKind,
) -> Result<Option<PaneTarget>, TmuxError> {
    for pane in list_window_panes(runner, &window.session, window.index)? {
        if classify(&pane.title, &pane.current_command) == kind {
            return Ok(Some(window.pane_target(pane.index)));
        }
    }
    Ok(None)
}

/// Split exactly one new pane of `kind` into an existing window. The
/// returned target is gateway-confirmed; callers register it afterwards.
pub fn ensure_pane_in_window(
    runner: &impl TmuxCommandRunner,
    window: &WindowRef,
    kind: ShellKind,
    start_path: &Path,
    cfg: &EngineConfig,
) -> Result<PaneTarget, AllocationError> {
    let command = cfg.commands.command_for(kind);
    let target = split_pane(runner, &window.session, window.index, Some(command), start_path)?;
    tracing::info!(%target, command, "created pane in window");
    Ok(target)
}

/// True when every pane of the window works inside `root`. Gateway errors
/// count as "not valid" — the caller then creates a fresh window.
fn window_is_rooted_at(
    runner: &impl TmuxCommandRunner,
    session: &str,
    window_index: u32,
    root: &Path,
) -> bool {
    match list_window_pane_paths(runner, session, window_index) {
        Ok(paths) => !paths.is_empty() && paths.iter().all(|p| path_within(p, root)),
        Err(err) => {
            tracing::warn!(session, window = window_index, "pane path listing failed: {err}");
            false
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────
