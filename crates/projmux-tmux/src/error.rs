//! Gateway error type. Every failure mode of the external multiplexer —
//! missing binary, non-zero exit, malformed listing output — surfaces as a
//! `TmuxError` carrying the raw diagnostic text. No retries at this layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TmuxError {
    #[error("tmux command failed: {0}")]
    CommandFailed(String),

    #[error("failed to parse tmux output line {line_num}: {detail}")]
    Parse { line_num: usize, detail: String },

    #[error("tmux io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TmuxError {
    /// True when the failure means the multiplexer server simply is not
    /// running — a recoverable state, not an error worth surfacing.
    pub fn server_not_running(&self) -> bool {
        match self {
            Self::CommandFailed(msg) => {
                msg.contains("no server running") || msg.contains("error connecting to")
            }
            _ => false,
        }
    }
}
