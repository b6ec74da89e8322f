//! Attachment coordination: move the user's terminal to a pane.
//!
//! The common path is in-process: this program runs inside the same tmux
//! server, so `switch-client` changes the visible pane without interrupting
//! the process. When that is unavailable or fails, the outcome carries an
//! instruction for the host to exit and re-attach externally.

use projmux_core::PaneTarget;
use projmux_tmux::{TmuxCommandRunner, TmuxError, select_pane, switch_client};
use serde::Serialize;

/// Result of an attachment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttachOutcome {
    /// The controlling client now shows the target pane; the caller keeps
    /// running.
    AttachedInProcess,
    /// The caller should terminate and exec an external
    /// `attach-session` to this window (see `projmux_tmux::attach_args`).
    AttachExternally { session: String, window_index: u32 },
    /// Nothing was attached and nothing was created.
    Failed { reason: String },
}

/// Switch the client to the pane's window, then focus the pane.
pub fn attach_to_pane(
    runner: &impl TmuxCommandRunner,
    target: &PaneTarget,
) -> Result<(), TmuxError> {
    switch_client(runner, &target.session, target.window)?;
    select_pane(runner, target)?;
    Ok(())
}

/// In-process attach when available, external instruction otherwise. A
/// failed in-process switch degrades to the external instruction rather
/// than erroring out.
pub fn attach_or_fallback(
    runner: &impl TmuxCommandRunner,
    target: &PaneTarget,
    in_process: bool,
) -> AttachOutcome {
    if in_process {
        match attach_to_pane(runner, target) {
            Ok(()) => {
                tracing::info!(%target, "switched client to pane");
                return AttachOutcome::AttachedInProcess;
            }
            Err(err) => {
                tracing::warn!(%target, "in-process switch failed, falling back: {err}");
            }
        }
    }
    AttachOutcome::AttachExternally {
        session: target.session.clone(),
        window_index: target.window,
    }
}
