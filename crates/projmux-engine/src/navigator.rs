//! Navigation requests: resolve or create the pane for a
//! (project, worktree, shell-kind) request and attach to it.
//!
//! One invocation walks a fixed sequence and never loops:
//! synchronous discovery → lookup existing → attach, or
//! ensure window → (new: attach its pane 0) → find kind pane → attach, or
//! create one pane → attach. At most one window and one pane come into
//! existence per request; created targets are registered immediately after
//! the gateway confirms them.

use chrono::{DateTime, Utc};

use projmux_core::{PaneOwner, Project, ShellKind, find_project_pane, find_worktree_pane};
use projmux_tmux::{TmuxCommandRunner, TmuxError};

use crate::allocate::{
    ensure_pane_in_window, ensure_project_window, ensure_worktree_window, find_kind_pane_in_window,
};
use crate::attach::{AttachOutcome, attach_or_fallback};
use crate::config::EngineConfig;
use crate::reconcile::Reconciler;
use crate::snapshot::PaneTopology;

/// Force one synchronous reconciliation cycle. Exposed to the host for
/// layout changes and manual refreshes; navigation requests call it
/// implicitly before deciding anything.
pub fn refresh_pane_mappings(
    reconciler: &mut Reconciler,
    runner: &impl TmuxCommandRunner,
    projects: &mut [Project],
    now: DateTime<Utc>,
) -> Result<PaneTopology, TmuxError> {
    reconciler.reconcile(runner, projects, now)
}

/// Navigate to (or create) the project-level pane of `kind`.
pub fn handle_attachment_request(
    reconciler: &mut Reconciler,
    runner: &impl TmuxCommandRunner,
    projects: &mut [Project],
    project_name: &str,
    kind: ShellKind,
    cfg: &EngineConfig,
    in_process: bool,
    now: DateTime<Utc>,
) -> AttachOutcome {
    // Close the race against the periodic tick: a pane the user created
    // moments ago must be visible before we decide to create anything.
    if let Err(err) = reconciler.reconcile(runner, projects, now) {
        tracing::warn!("discovery before attachment failed, using prior state: {err}");
    }

    let Some(project) = projects.iter().find(|p| p.name == project_name) else {
        return AttachOutcome::Failed {
            reason: format!("unknown project: {project_name}"),
        };
    };

    if let Some(pane) = find_project_pane(reconciler.registry(), reconciler.panes(), project, kind)
    {
        let target = pane.target.clone();
        tracing::info!(%target, project = project_name, %kind, "attaching to existing pane");
        return attach_or_fallback(runner, &target, in_process);
    }

    let (window, is_new) = match ensure_project_window(runner, project, kind, cfg) {
        Ok(result) => result,
        Err(err) => {
            return AttachOutcome::Failed {
                reason: err.to_string(),
            };
        }
    };

    let owner = PaneOwner::project(project_name);
    let project_path = project.path.clone();

    if is_new {
        // The fresh window already runs the kind's command in pane 0;
        // creating another pane here would double-allocate.
        let target = window.pane_target(0);
        reconciler.adopt_created_pane(target.clone(), kind, project_path, owner, now);
        return attach_or_fallback(runner, &target, in_process);
    }

    match find_kind_pane_in_window(runner, &window, kind) {
        Ok(Some(target)) => {
            // Present in the window but unmatched earlier (its cwd no
            // longer resolves to the project); associate it explicitly.
            reconciler.associate(&target, kind, &project_path, owner, now);
            attach_or_fallback(runner, &target, in_process)
        }
        Ok(None) => {
            match ensure_pane_in_window(runner, &window, kind, &project_path, cfg) {
                Ok(target) => {
                    reconciler.adopt_created_pane(target.clone(), kind, project_path, owner, now);
                    attach_or_fallback(runner, &target, in_process)
                }
                Err(err) => AttachOutcome::Failed {
                    reason: err.to_string(),
                },
            }
        }
        Err(err) => AttachOutcome::Failed {
            reason: err.to_string(),
        },
    }
}

/// Worktree variant: the pane must belong to this worktree by id; a
/// project-level pane never satisfies the request.
pub fn handle_worktree_attachment_request(
    reconciler: &mut Reconciler,
    runner: &impl TmuxCommandRunner,
    projects: &mut [Project],
    project_name: &str,
    worktree_id: &str,
    kind: ShellKind,
    cfg: &EngineConfig,
    in_process: bool,
    now: DateTime<Utc>,
) -> AttachOutcome {
    if let Err(err) = reconciler.reconcile(runner, projects, now) {
        tracing::warn!("discovery before attachment failed, using prior state: {err}");
    }

    let Some(project) = projects.iter().find(|p| p.name == project_name) else {
        return AttachOutcome::Failed {
            reason: format!("unknown project: {project_name}"),
        };
    };
    let Some(worktree) = project.worktree(worktree_id) else {
        return AttachOutcome::Failed {
            reason: format!("unknown worktree {worktree_id:?} of project {project_name}"),
        };
    };

    if let Some(pane) =
        find_worktree_pane(reconciler.registry(), reconciler.panes(), project, worktree, kind)
    {
        let target = pane.target.clone();
        tracing::info!(%target, worktree = worktree_id, %kind, "attaching to existing worktree pane");
        return attach_or_fallback(runner, &target, in_process);
    }

    let (window, is_new) = match ensure_worktree_window(runner, project, worktree, kind, cfg) {
        Ok(result) => result,
        Err(err) => {
            return AttachOutcome::Failed {
                reason: err.to_string(),
            };
        }
    };

    let owner = PaneOwner::worktree(project_name, worktree_id);
    let worktree_path = worktree.path.clone();

    if is_new {
        let target = window.pane_target(0);
        reconciler.adopt_created_pane(target.clone(), kind, worktree_path, owner, now);
        return attach_or_fallback(runner, &target, in_process);
    }

    match find_kind_pane_in_window(runner, &window, kind) {
        Ok(Some(target)) => {
            reconciler.associate(&target, kind, &worktree_path, owner, now);
            attach_or_fallback(runner, &target, in_process)
        }
        Ok(None) => match ensure_pane_in_window(runner, &window, kind, &worktree_path, cfg) {
            Ok(target) => {
                reconciler.adopt_created_pane(target.clone(), kind, worktree_path, owner, now);
                attach_or_fallback(runner, &target, in_process)
            }
            Err(err) => AttachOutcome::Failed {
                reason: err.to_string(),
            },
        },
        Err(err) => AttachOutcome::Failed {
            reason: err.to_string(),
        },
    }
}

// ─── Tests ────────────────────────────────────────────────────────
