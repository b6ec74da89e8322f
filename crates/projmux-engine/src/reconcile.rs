//! The reconciliation cycle: discover every pane, classify it, resolve its
//! owner, and keep the registry in step with the live topology.
//!
//! Owner resolution is registry-first: an already-registered target keeps
//! its association no matter where its working directory has drifted
//! (sticky association). Only unregistered panes are resolved by path.
//!
//! A failed discovery pass returns the gateway error before any state is
//! touched — prior panes and registry contents stay in place until the
//! next cycle succeeds.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use projmux_core::{
    Pane, PaneOwner, PaneRegistry, PaneTarget, Project, ShellAssignment, ShellKind, classify,
    find_project_pane, resolve_owner,
};
use projmux_tmux::{TmuxCommandRunner, TmuxError, list_all_panes};

use crate::snapshot::{PaneTopology, ProjectPanes};

/// Holds the registry and the latest live pane map across cycles.
/// Created once at startup; callers serialize access (single writer).
#[derive(Debug, Default)]
pub struct Reconciler {
    registry: PaneRegistry,
    panes: HashMap<String, Pane>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &PaneRegistry {
        &self.registry
    }

    pub fn panes(&self) -> &HashMap<String, Pane> {
        &self.panes
    }

    /// Run one full discovery + classification + matching pass and return
    /// the resulting topology snapshot. Also rewrites each project's
    /// shell-assignment map.
    pub fn reconcile(
        &mut self,
        runner: &impl TmuxCommandRunner,
        projects: &mut [Project],
        now: DateTime<Utc>,
    ) -> Result<PaneTopology, TmuxError> {
        let records = list_all_panes(runner)?;

        let mut next: HashMap<String, Pane> = HashMap::with_capacity(records.len());
        for record in records {
            let target = record.target();
            let key = target.to_string();

            let mut kind = classify(&record.title, &record.current_command);
            let owner = match self.registry.get(&key) {
                Some(entry) => {
                    // Known pane: the registry owns the association, and a
                    // kind the classifier lost to title churn is kept.
                    if kind == ShellKind::Unknown {
                        kind = entry.kind;
                    }
                    Some(PaneOwner {
                        project: entry.project.clone(),
                        worktree: entry.worktree.clone(),
                    })
                }
                None => resolve_owner(&record.current_path, projects),
            };

            let pane = Pane {
                target,
                title: record.title,
                current_command: record.current_command,
                current_path: record.current_path,
                kind,
                active: record.active,
                last_activity: record.activity,
                project: owner.as_ref().map(|o| o.project.clone()),
                worktree: owner.as_ref().and_then(|o| o.worktree.clone()),
            };

            if !self.registry.refresh(&pane)
                && let Some(ref owner) = owner
            {
                self.registry.register(&pane, owner, now);
            }

            next.insert(key, pane);
        }

        let live: HashSet<String> = next.keys().cloned().collect();
        self.registry.prune(&live);
        self.panes = next;

        self.assign_project_shells(projects);
        Ok(self.topology(projects, now))
    }

    /// Record a pane the allocator just created. Called only after the
    /// gateway confirmed the target exists; the pane joins the live map
    /// immediately so a repeated request resolves to it even before the
    /// next discovery pass observes it.
    pub fn adopt_created_pane(
        &mut self,
        target: PaneTarget,
        kind: ShellKind,
        start_path: std::path::PathBuf,
        owner: PaneOwner,
        now: DateTime<Utc>,
    ) {
        let pane = Pane {
            target,
            title: String::new(),
            current_command: String::new(),
            current_path: start_path,
            kind,
            active: false,
            last_activity: now,
            project: Some(owner.project.clone()),
            worktree: owner.worktree.clone(),
        };
        self.registry.register(&pane, &owner, now);
        self.panes.insert(pane.target.to_string(), pane);
    }

    /// Explicitly associate an already-live pane with an owner — used when
    /// a window lookup surfaces a matching pane that discovery could not
    /// map by path.
    pub fn associate(
        &mut self,
        target: &PaneTarget,
        kind: ShellKind,
        fallback_path: &std::path::Path,
        owner: PaneOwner,
        now: DateTime<Utc>,
    ) {
        let key = target.to_string();
        if let Some(pane) = self.panes.get_mut(&key) {
            pane.kind = kind;
            pane.project = Some(owner.project.clone());
            pane.worktree = owner.worktree.clone();
            let pane = pane.clone();
            self.registry.register(&pane, &owner, now);
        } else {
            self.adopt_created_pane(target.clone(), kind, fallback_path.to_path_buf(), owner, now);
        }
    }

    /// Rewrite each project's project-level shell map from the current
    /// match results.
    fn assign_project_shells(&self, projects: &mut [Project]) {
        for project in projects.iter_mut() {
            for kind in ShellKind::ALLOCATABLE {
                match find_project_pane(&self.registry, &self.panes, project, kind) {
                    Some(pane) => {
                        let assignment = ShellAssignment {
                            target: pane.target.clone(),
                            title: pane.title.clone(),
                            last_active: pane.last_activity,
                        };
                        project.shells.insert(kind, assignment);
                    }
                    None => {
                        project.shells.remove(&kind);
                    }
                }
            }
        }
    }

    /// Group the live panes by owning project, in the order the projects
    /// were given; panes owned by nothing (or by a project that no longer
    /// exists) land in the other-sessions bucket.
    fn topology(&self, projects: &[Project], now: DateTime<Utc>) -> PaneTopology {
        let index: HashMap<&str, usize> = projects
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.as_str(), i))
            .collect();

        let mut groups: Vec<ProjectPanes> = projects
            .iter()
            .map(|p| ProjectPanes {
                project: p.name.clone(),
                panes: Vec::new(),
            })
            .collect();
        let mut other_sessions = Vec::new();

        let mut ordered: Vec<&Pane> = self.panes.values().collect();
        ordered.sort_by_key(|p| p.target.to_string());

        for pane in ordered {
            let slot = pane
                .project
                .as_deref()
                .and_then(|name| index.get(name).copied());
            match slot {
                Some(i) => groups[i].panes.push(pane.clone()),
                None => other_sessions.push(pane.clone()),
            }
        }

        PaneTopology {
            generated_at: now,
            projects: groups,
            other_sessions,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Runner whose `list-panes -a` output can be swapped between cycles.
    struct FakeTmux {
        listing: Mutex<String>,
    }

    impl FakeTmux {
        fn new(listing: &str) -> Self {
            Self {
                listing: Mutex::new(listing.to_string()),
            }
        }

        fn set_listing(&self, listing: &str) {
            *self.listing.lock().expect("lock") = listing.to_string();
        }
    }

    impl TmuxCommandRunner for FakeTmux {
        fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
            assert_eq!(args[0], "list-panes");
            Ok(self.listing.lock().expect("lock").clone())
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("timestamp")
    }

    fn projects() -> Vec<Project> {
        let mut tui = Project::new("tui", "/r/tui");
        tui.worktrees.push(projmux_core::Worktree {
            id: "feature".into(),
            path: "/r/tui/worktrees/feature".into(),
            branch: "feature".into(),
        });
        vec![tui, Project::new("log", "/r/log")]
    }

    #[test]
    fn discovers_and_registers_by_path() {
        let tmux = FakeTmux::new(
            "icf\t1\t0\t✳ idle\tnode\t/r/tui\t1\t100\n\
             icf\t2\t0\tzsh\tzsh\t/r/log\t0\t90\n",
        );
        let mut recon = Reconciler::new();
        let mut projs = projects();
        let topo = recon.reconcile(&tmux, &mut projs, at(1000)).expect("cycle");

        assert_eq!(topo.pane_count(), 2);
        assert_eq!(topo.projects[0].project, "tui");
        assert_eq!(topo.projects[0].panes.len(), 1);
        assert_eq!(topo.projects[0].panes[0].kind, ShellKind::Assistant);
        assert_eq!(topo.projects[1].panes.len(), 1);
        assert!(topo.other_sessions.is_empty());

        let entry = recon.registry().get("icf:1.0").expect("registered");
        assert_eq!(entry.project, "tui");
        assert_eq!(entry.worktree, None);
    }

    #[test]
    fn worktree_pane_maps_to_worktree() {
        let tmux = FakeTmux::new("icf\t3\t0\t✳ busy\tnode\t/r/tui/worktrees/feature\t0\t100\n");
        let mut recon = Reconciler::new();
        let mut projs = projects();
        recon.reconcile(&tmux, &mut projs, at(1000)).expect("cycle");

        let entry = recon.registry().get("icf:3.0").expect("registered");
        assert_eq!(entry.project, "tui");
        assert_eq!(entry.worktree.as_deref(), Some("feature"));
    }

    #[test]
    fn unmapped_panes_land_in_other_sessions() {
        let tmux = FakeTmux::new("scratch\t0\t0\thtop\thtop\t/tmp\t0\t100\n");
        let mut recon = Reconciler::new();
        let mut projs = projects();
        let topo = recon.reconcile(&tmux, &mut projs, at(1000)).expect("cycle");

        assert_eq!(topo.other_sessions.len(), 1);
        assert_eq!(topo.other_sessions[0].kind, ShellKind::Unknown);
        // Unmapped panes are surfaced but never registered.
        assert!(recon.registry().get("scratch:0.0").is_none());
    }

    #[test]
    fn two_identical_cycles_leave_registry_bit_identical() {
        let tmux = FakeTmux::new(
            "icf\t1\t0\t✳ idle\tnode\t/r/tui\t1\t100\n\
             icf\t2\t0\tzsh\tzsh\t/r/log\t0\t90\n",
        );
        let mut recon = Reconciler::new();
        let mut projs = projects();
        recon.reconcile(&tmux, &mut projs, at(1000)).expect("first");
        let registry_after_first = recon.registry().clone();

        recon.reconcile(&tmux, &mut projs, at(2000)).expect("second");
        assert_eq!(recon.registry(), &registry_after_first);
    }

    #[test]
    fn association_sticks_across_cwd_drift() {
        let tmux = FakeTmux::new("icf\t3\t0\t✳ x\tnode\t/r/tui/worktrees/feature\t0\t100\n");
        let mut recon = Reconciler::new();
        let mut projs = projects();
        recon.reconcile(&tmux, &mut projs, at(1000)).expect("first");

        // The pane cd'd to a path that on its own would resolve to the
        // project root, not the worktree.
        tmux.set_listing("icf\t3\t0\t✳ x\tnode\t/r/tui/src\t0\t200\n");
        recon.reconcile(&tmux, &mut projs, at(2000)).expect("second");

        let entry = recon.registry().get("icf:3.0").expect("entry");
        assert_eq!(entry.worktree.as_deref(), Some("feature"));
    }

    #[test]
    fn registry_kind_survives_title_churn() {
        let tmux = FakeTmux::new("icf\t1\t0\t✳ working\tnode\t/r/tui\t0\t100\n");
        let mut recon = Reconciler::new();
        let mut projs = projects();
        recon.reconcile(&tmux, &mut projs, at(1000)).expect("first");

        // Title lost the glyph; command alone classifies Unknown.
        tmux.set_listing("icf\t1\t0\tnode\tnode\t/r/tui\t0\t200\n");
        recon.reconcile(&tmux, &mut projs, at(2000)).expect("second");

        assert_eq!(
            recon.panes().get("icf:1.0").expect("pane").kind,
            ShellKind::Assistant
        );
    }

    #[test]
    fn vanished_pane_is_pruned_from_lookup() {
        let tmux = FakeTmux::new("icf\t1\t0\t✳ idle\tnode\t/r/tui\t0\t100\n");
        let mut recon = Reconciler::new();
        let mut projs = projects();
        recon.reconcile(&tmux, &mut projs, at(1000)).expect("first");

        tmux.set_listing("");
        recon.reconcile(&tmux, &mut projs, at(2000)).expect("second");

        assert!(
            recon
                .registry()
                .lookup("tui", None, ShellKind::Assistant)
                .is_empty()
        );
        // Retained as a stale diagnostic record.
        assert!(recon.registry().get("icf:1.0").is_some_and(|e| e.stale));
    }

    #[test]
    fn failed_discovery_leaves_prior_state() {
        let tmux = FakeTmux::new("icf\t1\t0\t✳ idle\tnode\t/r/tui\t0\t100\n");
        let mut recon = Reconciler::new();
        let mut projs = projects();
        recon.reconcile(&tmux, &mut projs, at(1000)).expect("first");

        struct Broken;
        impl TmuxCommandRunner for Broken {
            fn run(&self, _args: &[&str]) -> Result<String, TmuxError> {
                Err(TmuxError::CommandFailed("exit code 1: server crashed".into()))
            }
        }
        assert!(recon.reconcile(&Broken, &mut projs, at(2000)).is_err());
        assert_eq!(recon.panes().len(), 1);
        assert_eq!(recon.registry().lookup("tui", None, ShellKind::Assistant).len(), 1);
    }

    #[test]
    fn shell_map_written_and_cleared() {
        let tmux = FakeTmux::new("icf\t1\t0\t✳ idle\tnode\t/r/tui\t0\t100\n");
        let mut recon = Reconciler::new();
        let mut projs = projects();
        recon.reconcile(&tmux, &mut projs, at(1000)).expect("first");
        assert!(projs[0].shells.contains_key(&ShellKind::Assistant));
        assert!(!projs[0].shells.contains_key(&ShellKind::Shell));

        tmux.set_listing("");
        recon.reconcile(&tmux, &mut projs, at(2000)).expect("second");
        assert!(projs[0].shells.is_empty());
    }

    #[test]
    fn adopted_pane_resolves_before_next_discovery() {
        let mut recon = Reconciler::new();
        let target: PaneTarget = "icf:5.0".parse().expect("target");
        recon.adopt_created_pane(
            target,
            ShellKind::Assistant,
            "/r/log".into(),
            PaneOwner::project("log"),
            at(1000),
        );

        let log = Project::new("log", "/r/log");
        let found = find_project_pane(recon.registry(), recon.panes(), &log, ShellKind::Assistant)
            .expect("pane");
        assert_eq!(found.target.to_string(), "icf:5.0");
    }
}
