//! Project-pane matching: resolve "which live pane satisfies this
//! (project, worktree, shell-kind) request" against the registry and the
//! latest discovery snapshot.
//!
//! Registry order is authoritative: the most recently active entry wins.
//! Entries whose target died since the last discovery fall through to the
//! next candidate. Panes discovered moments ago and not yet registered are
//! caught by an exact-path fallback scan.

use std::collections::HashMap;

use crate::registry::PaneRegistry;
use crate::types::{Pane, Project, ShellKind, Worktree};

/// Best live pane for a project-level (non-worktree) shell of `kind`, or
/// `None` if the caller should create one. Panes associated with any
/// worktree are never returned here.
pub fn find_project_pane<'a>(
    registry: &PaneRegistry,
    panes: &'a HashMap<String, Pane>,
    project: &Project,
    kind: ShellKind,
) -> Option<&'a Pane> {
    for entry in registry.lookup(&project.name, None, kind) {
        let Some(pane) = panes.get(&entry.target.to_string()) else {
            // Target already closed by the multiplexer; try the next most
            // recently active entry.
            continue;
        };
        if pane.worktree.is_some() {
            continue;
        }
        return Some(pane);
    }

    fallback_scan(panes, |p| {
        p.kind == kind && p.worktree.is_none() && p.current_path == project.path
    })
}

/// Best live pane for a worktree shell of `kind`. The worktree must match
/// by id; project-level panes never satisfy a worktree query.
pub fn find_worktree_pane<'a>(
    registry: &PaneRegistry,
    panes: &'a HashMap<String, Pane>,
    project: &Project,
    worktree: &Worktree,
    kind: ShellKind,
) -> Option<&'a Pane> {
    for entry in registry.lookup(&project.name, Some(&worktree.id), kind) {
        if let Some(pane) = panes.get(&entry.target.to_string()) {
            return Some(pane);
        }
    }

    fallback_scan(panes, |p| {
        p.kind == kind
            && p.project.as_deref() == Some(project.name.as_str())
            && p.worktree.as_deref() == Some(worktree.id.as_str())
    })
}

/// Scan live panes for matches not yet in the registry, most recently
/// active first (target string breaks ties for determinism).
fn fallback_scan<'a>(
    panes: &'a HashMap<String, Pane>,
    accept: impl Fn(&Pane) -> bool,
) -> Option<&'a Pane> {
    panes
        .values()
        .filter(|p| accept(p))
        .max_by(|a, b| {
            a.last_activity
                .cmp(&b.last_activity)
                .then_with(|| b.target.to_string().cmp(&a.target.to_string()))
        })
}

// ─── Tests ────────────────────────────────────────────────────────
