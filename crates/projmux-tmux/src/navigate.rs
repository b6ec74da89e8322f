//! Client navigation: in-process switching and the external attach argv.

use projmux_core::PaneTarget;

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

/// Move the controlling client to a window. Only works when the calling
/// process runs inside the same tmux server.
pub fn switch_client(
    runner: &impl TmuxCommandRunner,
    session: &str,
    window_index: u32,
) -> Result<(), TmuxError> {
    let target = format!("{session}:{window_index}");
    runner.run(&["switch-client", "-t", &target])?;
    Ok(())
}

/// Focus a specific pane within its window.
pub fn select_pane(runner: &impl TmuxCommandRunner, target: &PaneTarget) -> Result<(), TmuxError> {
    let target = target.to_string();
    runner.run(&["select-pane", "-t", &target])?;
    Ok(())
}

/// Argv for attaching to a window from outside tmux. The host execs this
/// after terminating itself — the fallback when in-process switching is
/// unavailable.
pub fn attach_args(session: &str, window_index: u32) -> Vec<String> {
    vec![
        "attach-session".to_string(),
        "-t".to_string(),
        format!("{session}:{window_index}"),
    ]
}
