//! Pane topology snapshot pushed to the UI sink after each completed tick.

use chrono::{DateTime, Utc};
use projmux_core::Pane;
use serde::{Deserialize, Serialize};

/// Live panes of one project, worktree panes included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPanes {
    pub project: String,
    pub panes: Vec<Pane>,
}

/// One reconciliation cycle's view of the whole multiplexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneTopology {
    pub generated_at: DateTime<Utc>,
    pub projects: Vec<ProjectPanes>,
    /// Panes that map to no known project — still displayed, under an
    /// "other sessions" bucket.
    pub other_sessions: Vec<Pane>,
}

impl PaneTopology {
    pub fn pane_count(&self) -> usize {
        self.projects.iter().map(|p| p.panes.len()).sum::<usize>() + self.other_sessions.len()
    }
}

/// UI-facing sink; the host owns rendering.
pub trait PaneSink {
    fn on_panes_updated(&self, topology: &PaneTopology);
}
