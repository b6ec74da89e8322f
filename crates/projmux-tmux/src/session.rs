//! Session listing, existence checks, and creation.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

const LIST_SESSIONS_FORMAT: &str = "#{session_name}\t#{session_attached}";

/// Transient snapshot of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub name: String,
    pub attached: bool,
}

/// List all sessions; an absent server means no sessions, not an error.
pub fn list_sessions(runner: &impl TmuxCommandRunner) -> Result<Vec<SessionRecord>, TmuxError> {
    let output = match runner.run(&["list-sessions", "-F", LIST_SESSIONS_FORMAT]) {
        Ok(output) => output,
        Err(err) if err.server_not_running() => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut sessions = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, attached) = line.split_once('\t').unwrap_or((line, "0"));
        sessions.push(SessionRecord {
            name: name.to_string(),
            attached: attached.trim() == "1",
        });
    }
    Ok(sessions)
}

/// True if a session with exactly this name exists.
pub fn session_exists(runner: &impl TmuxCommandRunner, name: &str) -> bool {
    runner.run(&["has-session", "-t", name]).is_ok()
}

/// Create a detached session rooted at `start_path`.
pub fn create_session(
    runner: &impl TmuxCommandRunner,
    name: &str,
    start_path: &Path,
) -> Result<(), TmuxError> {
    let path = start_path.to_string_lossy();
    runner.run(&["new-session", "-d", "-s", name, "-c", path.as_ref()])?;
    Ok(())
}

/// Name of the session this process's client is attached to.
pub fn current_session_name(runner: &impl TmuxCommandRunner) -> Result<String, TmuxError> {
    let output = runner.run(&["display-message", "-p", "#{session_name}"])?;
    Ok(output.trim().to_string())
}

/// Working directory of a window's active pane, used as the session-level
/// CWD signal for project mapping.
pub fn session_cwd(
    runner: &impl TmuxCommandRunner,
    session: &str,
    window_index: u32,
) -> Result<String, TmuxError> {
    let target = format!("{session}:{window_index}");
    let output = runner.run(&[
        "display-message",
        "-t",
        &target,
        "-p",
        "#{pane_current_path}",
    ])?;
    Ok(output.trim().to_string())
}
