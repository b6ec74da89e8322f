use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// ─── Shell Kind ───────────────────────────────────────────────────

/// Kind of interactive shell hosted by a pane.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    /// General interactive shell (zsh, bash, ...).
    Shell,
    /// AI-assistant shell.
    Assistant,
    /// Editor session.
    Editor,
    /// Anything we cannot classify; still surfaced, never discarded.
    #[default]
    Unknown,
}

impl ShellKind {
    pub const ALL: [Self; 4] = [Self::Shell, Self::Assistant, Self::Editor, Self::Unknown];

    /// The kinds a window is expected to host; `Unknown` panes are never
    /// allocated, only discovered.
    pub const ALLOCATABLE: [Self; 3] = [Self::Shell, Self::Assistant, Self::Editor];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Assistant => "assistant",
            Self::Editor => "editor",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shell" => Ok(Self::Shell),
            "assistant" => Ok(Self::Assistant),
            "editor" => Ok(Self::Editor),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("unknown shell kind: {s}")),
        }
    }
}

// ─── Layout Mode ──────────────────────────────────────────────────

/// How a project's panes are laid out across windows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// One window per project; shells share the window as split panes.
    #[default]
    Grouped,
    /// One window per (project, shell-kind) pair; no splits.
    Unsplit,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grouped => "grouped",
            Self::Unsplit => "unsplit",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grouped" => Ok(Self::Grouped),
            "unsplit" => Ok(Self::Unsplit),
            _ => Err(format!("unknown layout mode: {s}")),
        }
    }
}

// ─── Pane Identity ────────────────────────────────────────────────

/// Identity of a pane: `(session, window index, pane index)`, rendered as the
/// tmux target string `session:window.pane`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaneTarget {
    pub session: String,
    pub window: u32,
    pub pane: u32,
}

impl PaneTarget {
    pub fn new(session: impl Into<String>, window: u32, pane: u32) -> Self {
        Self {
            session: session.into(),
            window,
            pane,
        }
    }

    /// Target string of the enclosing window (`session:window`).
    pub fn window_target(&self) -> String {
        format!("{}:{}", self.session, self.window)
    }
}

impl fmt::Display for PaneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.session, self.window, self.pane)
    }
}

impl FromStr for PaneTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Session names may not contain ':' or '.', so split from the right.
        let (session, rest) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("pane target missing ':': {s}"))?;
        let (window, pane) = rest
            .split_once('.')
            .ok_or_else(|| format!("pane target missing '.': {s}"))?;
        if session.is_empty() {
            return Err(format!("pane target has empty session: {s}"));
        }
        let window = window
            .parse::<u32>()
            .map_err(|_| format!("invalid window index in pane target: {s}"))?;
        let pane = pane
            .parse::<u32>()
            .map_err(|_| format!("invalid pane index in pane target: {s}"))?;
        Ok(Self {
            session: session.to_string(),
            window,
            pane,
        })
    }
}

// ─── Project & Worktree ───────────────────────────────────────────

/// A git worktree of a project. Lifecycle owned by external discovery;
/// immutable input per reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worktree {
    /// Stable identifier, typically the branch name.
    pub id: String,
    pub path: PathBuf,
    pub branch: String,
}

/// Shell slot written into `Project::shells` by the engine after matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellAssignment {
    pub target: PaneTarget,
    pub title: String,
    pub last_active: DateTime<Utc>,
}

/// A software project with optional worktrees. Created by external project
/// discovery; the engine reads `name`/`path`/`worktrees` and writes `shells`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_repo_path: Option<PathBuf>,
    #[serde(default)]
    pub worktrees: Vec<Worktree>,
    /// Project-level (non-worktree) shell assignments, keyed by kind.
    #[serde(default)]
    pub shells: BTreeMap<ShellKind, ShellAssignment>,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            parent_repo_path: None,
            worktrees: Vec::new(),
            shells: BTreeMap::new(),
        }
    }

    pub fn worktree(&self, id: &str) -> Option<&Worktree> {
        self.worktrees.iter().find(|w| w.id == id)
    }
}

// ─── Pane Snapshot ────────────────────────────────────────────────

/// Owner of a pane, resolved by path matching or registry lookup.
/// Identity keys only — panes never hold owning references to projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneOwner {
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree: Option<String>,
}

impl PaneOwner {
    pub fn project(name: impl Into<String>) -> Self {
        Self {
            project: name.into(),
            worktree: None,
        }
    }

    pub fn worktree(project: impl Into<String>, worktree: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            worktree: Some(worktree.into()),
        }
    }
}

/// Per-cycle snapshot of a live pane. Rebuilt from scratch on every
/// discovery pass; value-like, not a long-lived object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pane {
    pub target: PaneTarget,
    pub title: String,
    pub current_command: String,
    pub current_path: PathBuf,
    pub kind: ShellKind,
    pub active: bool,
    pub last_activity: DateTime<Utc>,
    /// Owning project name, if mapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Owning worktree id, if mapped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree: Option<String>,
}

impl Pane {
    pub fn owner(&self) -> Option<PaneOwner> {
        self.project.as_ref().map(|p| PaneOwner {
            project: p.clone(),
            worktree: self.worktree.clone(),
        })
    }

    /// Display title, in priority order: meaningful pane title, current
    /// command, then the shell kind.
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() && !crate::classify::is_boring_title(&self.title) {
            return &self.title;
        }
        if !self.current_command.is_empty() {
            return &self.current_command;
        }
        self.kind.as_str()
    }
}

// ─── Collaborator Interfaces ──────────────────────────────────────

/// External project discovery. Called once per reconciliation cycle;
/// worktrees come embedded in each project record.
pub trait ProjectSource {
    fn list_projects(&self) -> Result<Vec<Project>, Box<dyn std::error::Error + Send + Sync>>;
}

// ─── Tests ────────────────────────────────────────────────────────
