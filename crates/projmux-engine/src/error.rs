//! Engine error types.

use projmux_tmux::TmuxError;
use thiserror::Error;

/// Window or pane creation failed. Nothing is registered when this is
/// returned — allocation short-circuits before registration, so a failed
/// attachment attempt never leaves duplicate windows or panes behind.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("multiplexer refused the operation: {0}")]
    Gateway(#[from] TmuxError),

    #[error("session {0:?} could not be created")]
    SessionUnavailable(String),
}
