//! Pane registry: process-lifetime map from pane identity to the project
//! (and worktree, if any) it belongs to.
//!
//! The registry is the source of truth for "this pane belongs to this
//! project" even after the pane's live working directory has drifted: once
//! a target is registered, re-observation never changes the owner. Only an
//! explicit `register` call re-points an entry.
//!
//! Entries whose target vanishes from a discovery pass are flagged stale
//! rather than deleted — kept for diagnostics, never returned by `lookup`.
//! A stale target that reappears is revived on the next `refresh`.
//!
//! All mutations take `now` explicitly; the registry never reads the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::types::{Pane, PaneOwner, PaneTarget, ShellKind};

// ─── Entry ────────────────────────────────────────────────────────

/// Durable association record between a pane identity and its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub target: PaneTarget,
    pub project: String,
    pub worktree: Option<String>,
    pub kind: ShellKind,
    /// Working directory observed when the pane was last registered or
    /// refreshed; drifts with the pane, unlike the owner.
    pub original_path: PathBuf,
    pub first_seen: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    /// Set by `prune` when the target is absent from the live set.
    pub stale: bool,
}

// ─── Registry ─────────────────────────────────────────────────────

/// In-memory pane → owner map, keyed by pane target string.
/// Created once at startup and passed explicitly to the matcher and
/// allocator; callers serialize writes (single-writer discipline).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PaneRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl PaneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a pane with an owner, creating the entry or explicitly
    /// re-registering an existing one. `first_seen` is preserved across
    /// re-registration; `last_active` is stamped with `now`.
    pub fn register(&mut self, pane: &Pane, owner: &PaneOwner, now: DateTime<Utc>) {
        let key = pane.target.to_string();
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.project = owner.project.clone();
                entry.worktree = owner.worktree.clone();
                entry.kind = pane.kind;
                entry.original_path = pane.current_path.clone();
                entry.last_active = now;
                entry.stale = false;
            }
            None => {
                self.entries.insert(
                    key,
                    RegistryEntry {
                        target: pane.target.clone(),
                        project: owner.project.clone(),
                        worktree: owner.worktree.clone(),
                        kind: pane.kind,
                        original_path: pane.current_path.clone(),
                        first_seen: now,
                        last_active: now,
                        stale: false,
                    },
                );
            }
        }
    }

    /// Re-observation path: update activity and path drift for a known
    /// target without touching the owner. `last_active` advances from the
    /// pane's own activity clock, so re-observing an unchanged pane is a
    /// no-op and back-to-back discovery cycles stay bit-identical.
    ///
    /// Returns `false` if the target is not registered.
    pub fn refresh(&mut self, pane: &Pane) -> bool {
        let Some(entry) = self.entries.get_mut(&pane.target.to_string()) else {
            return false;
        };
        entry.stale = false;
        if pane.last_activity > entry.last_active {
            entry.last_active = pane.last_activity;
        }
        if entry.original_path != pane.current_path {
            entry.original_path = pane.current_path.clone();
        }
        // A pane can keep its target while its kind changes (a shell pane
        // where an editor was launched); follow the classifier unless it
        // gave up — an Unknown re-classification must not shed a known kind
        // just because the title churned.
        if pane.kind != ShellKind::Unknown {
            entry.kind = pane.kind;
        }
        true
    }

    pub fn get(&self, target: &str) -> Option<&RegistryEntry> {
        self.entries.get(target)
    }

    /// Live entries for the given scope and kind, most-recent-first by
    /// `last_active` (ties broken by earlier `first_seen`, then target, for
    /// a deterministic order). A `None` worktree matches only project-level
    /// entries; `Some(id)` matches only that worktree's entries.
    pub fn lookup(
        &self,
        project: &str,
        worktree: Option<&str>,
        kind: ShellKind,
    ) -> Vec<&RegistryEntry> {
        let mut matches: Vec<&RegistryEntry> = self
            .entries
            .values()
            .filter(|e| {
                !e.stale
                    && e.project == project
                    && e.worktree.as_deref() == worktree
                    && e.kind == kind
            })
            .collect();
        matches.sort_by(|a, b| {
            b.last_active
                .cmp(&a.last_active)
                .then(a.first_seen.cmp(&b.first_seen))
                .then_with(|| a.target.to_string().cmp(&b.target.to_string()))
        });
        matches
    }

    /// Flag entries whose target is absent from the latest discovery.
    /// Stale entries stay queryable via `get` but never via `lookup`.
    pub fn prune(&mut self, live_targets: &HashSet<String>) {
        for (key, entry) in &mut self.entries {
            if !live_targets.contains(key) {
                entry.stale = true;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all entries, for diagnostics.
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("timestamp")
    }

    fn pane(target: &str, path: &str, kind: ShellKind, activity: i64) -> Pane {
        Pane {
            target: target.parse().expect("target"),
            title: String::new(),
            current_command: String::new(),
            current_path: path.into(),
            kind,
            active: false,
            last_activity: at(activity),
            project: None,
            worktree: None,
        }
    }

    #[test]
    fn register_then_lookup() {
        let mut reg = PaneRegistry::new();
        let p = pane("main:1.0", "/repo/tui", ShellKind::Assistant, 100);
        reg.register(&p, &PaneOwner::project("tui"), at(100));

        let found = reg.lookup("tui", None, ShellKind::Assistant);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target.to_string(), "main:1.0");
        assert_eq!(found[0].first_seen, at(100));
    }

    #[test]
    fn lookup_respects_kind_and_scope() {
        let mut reg = PaneRegistry::new();
        let shell = pane("main:1.0", "/repo/tui", ShellKind::Shell, 100);
        let wt = pane("main:2.0", "/repo/tui/wt/f", ShellKind::Shell, 100);
        reg.register(&shell, &PaneOwner::project("tui"), at(100));
        reg.register(&wt, &PaneOwner::worktree("tui", "f"), at(100));

        assert!(reg.lookup("tui", None, ShellKind::Assistant).is_empty());
        // Worktree entries never satisfy project-level queries or vice versa.
        let project_level = reg.lookup("tui", None, ShellKind::Shell);
        assert_eq!(project_level.len(), 1);
        assert_eq!(project_level[0].target.to_string(), "main:1.0");
        let worktree_level = reg.lookup("tui", Some("f"), ShellKind::Shell);
        assert_eq!(worktree_level.len(), 1);
        assert_eq!(worktree_level[0].target.to_string(), "main:2.0");
    }

    #[test]
    fn lookup_orders_most_recent_first() {
        let mut reg = PaneRegistry::new();
        // last_active: T-2h, T-30s, T-5min (registered out of order).
        let base = 10_000;
        for (target, act) in [
            ("main:1.0", base - 7200),
            ("main:2.0", base - 30),
            ("main:3.0", base - 300),
        ] {
            let p = pane(target, "/repo/tui", ShellKind::Assistant, act);
            reg.register(&p, &PaneOwner::project("tui"), at(act));
        }
        let found = reg.lookup("tui", None, ShellKind::Assistant);
        let targets: Vec<String> = found.iter().map(|e| e.target.to_string()).collect();
        assert_eq!(targets, ["main:2.0", "main:3.0", "main:1.0"]);
    }

    #[test]
    fn refresh_is_noop_for_unchanged_pane() {
        let mut reg = PaneRegistry::new();
        let p = pane("main:1.0", "/repo/tui", ShellKind::Assistant, 100);
        reg.register(&p, &PaneOwner::project("tui"), at(100));
        let before = reg.get("main:1.0").expect("entry").clone();

        // Second discovery cycle, nothing changed in tmux.
        assert!(reg.refresh(&p));
        assert_eq!(reg.get("main:1.0").expect("entry"), &before);
    }

    #[test]
    fn refresh_keeps_owner_across_path_drift() {
        let mut reg = PaneRegistry::new();
        let p = pane("main:1.0", "/repo/feature", ShellKind::Assistant, 100);
        reg.register(&p, &PaneOwner::worktree("repo", "feature"), at(100));

        // User cd'd deeper; association must not move.
        let drifted = pane("main:1.0", "/repo/feature/src", ShellKind::Assistant, 200);
        assert!(reg.refresh(&drifted));

        let entry = reg.get("main:1.0").expect("entry");
        assert_eq!(entry.project, "repo");
        assert_eq!(entry.worktree.as_deref(), Some("feature"));
        assert_eq!(entry.original_path, PathBuf::from("/repo/feature/src"));
        assert_eq!(entry.last_active, at(200));
    }

    #[test]
    fn refresh_does_not_shed_kind_on_unknown() {
        let mut reg = PaneRegistry::new();
        let p = pane("main:1.0", "/repo", ShellKind::Assistant, 100);
        reg.register(&p, &PaneOwner::project("repo"), at(100));

        let churned = pane("main:1.0", "/repo", ShellKind::Unknown, 150);
        reg.refresh(&churned);
        assert_eq!(reg.get("main:1.0").expect("entry").kind, ShellKind::Assistant);
    }

    #[test]
    fn refresh_unknown_target_reports_false() {
        let mut reg = PaneRegistry::new();
        let p = pane("main:9.0", "/repo", ShellKind::Shell, 100);
        assert!(!reg.refresh(&p));
        assert!(reg.is_empty());
    }

    #[test]
    fn explicit_register_repoints_owner() {
        let mut reg = PaneRegistry::new();
        let p = pane("main:1.0", "/repo/a", ShellKind::Shell, 100);
        reg.register(&p, &PaneOwner::project("a"), at(100));
        reg.register(&p, &PaneOwner::project("b"), at(200));

        let entry = reg.get("main:1.0").expect("entry");
        assert_eq!(entry.project, "b");
        assert_eq!(entry.first_seen, at(100)); // preserved
        assert_eq!(entry.last_active, at(200));
    }

    #[test]
    fn prune_hides_dead_targets_from_lookup() {
        let mut reg = PaneRegistry::new();
        let p = pane("main:1.0", "/repo/tui", ShellKind::Assistant, 100);
        reg.register(&p, &PaneOwner::project("tui"), at(100));

        reg.prune(&HashSet::new());
        assert!(reg.lookup("tui", None, ShellKind::Assistant).is_empty());
        // Still visible for diagnostics.
        assert!(reg.get("main:1.0").is_some_and(|e| e.stale));
    }

    #[test]
    fn refresh_revives_stale_entry() {
        let mut reg = PaneRegistry::new();
        let p = pane("main:1.0", "/repo/tui", ShellKind::Assistant, 100);
        reg.register(&p, &PaneOwner::project("tui"), at(100));
        reg.prune(&HashSet::new());

        assert!(reg.refresh(&p));
        assert_eq!(reg.lookup("tui", None, ShellKind::Assistant).len(), 1);
    }

    #[test]
    fn prune_keeps_live_targets() {
        let mut reg = PaneRegistry::new();
        let p = pane("main:1.0", "/repo/tui", ShellKind::Assistant, 100);
        reg.register(&p, &PaneOwner::project("tui"), at(100));

        let live: HashSet<String> = ["main:1.0".to_string()].into();
        reg.prune(&live);
        assert_eq!(reg.lookup("tui", None, ShellKind::Assistant).len(), 1);
    }
}
