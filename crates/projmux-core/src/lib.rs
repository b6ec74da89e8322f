//! projmux-core: pure domain logic for the project ⇄ pane mapping engine.
//! Types, pane classification, path matching, the pane registry, and the
//! project-pane matcher. No I/O — the tmux boundary lives in projmux-tmux.

pub mod classify;
pub mod matcher;
pub mod path;
pub mod registry;
pub mod types;

pub use classify::classify;
pub use matcher::{find_project_pane, find_worktree_pane};
pub use path::{path_within, resolve_owner};
pub use registry::{PaneRegistry, RegistryEntry};
pub use types::{
    LayoutMode, Pane, PaneOwner, PaneTarget, Project, ProjectSource, ShellAssignment, ShellKind,
    Worktree,
};
