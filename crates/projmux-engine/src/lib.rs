//! projmux-engine: reconciliation, allocation, and attachment on top of the
//! tmux gateway. Owns the pane registry across cycles and drives the
//! discover → classify → associate → match → allocate → attach pipeline.

pub mod allocate;
pub mod attach;
pub mod config;
pub mod debounce;
pub mod error;
pub mod navigator;
pub mod reconcile;
pub mod snapshot;

pub use allocate::{WindowRef, ensure_pane_in_window, ensure_project_window, ensure_worktree_window};
pub use attach::AttachOutcome;
pub use config::{EngineConfig, ShellCommands};
pub use debounce::UpdateDebouncer;
pub use error::AllocationError;
pub use navigator::{
    handle_attachment_request, handle_worktree_attachment_request, refresh_pane_mappings,
};
pub use reconcile::Reconciler;
pub use snapshot::{PaneSink, PaneTopology, ProjectPanes};
