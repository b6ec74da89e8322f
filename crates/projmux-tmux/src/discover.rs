//! Pane discovery: `tmux list-panes -a` across all sessions, parsed into
//! `PaneRecord`s. Tolerates an absent server (no sessions yet) by
//! returning an empty list; malformed lines are a parse error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use projmux_core::PaneTarget;

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

/// Tab-delimited format for `list-panes -a -F`. `#{pane_activity}` is the
/// server's own per-pane activity clock (epoch seconds) — stable across
/// discovery passes when the pane is untouched.
pub const LIST_PANES_FORMAT: &str = "#{session_name}\t#{window_index}\t#{pane_index}\t#{pane_title}\t#{pane_current_command}\t#{pane_current_path}\t#{pane_active}\t#{pane_activity}";

/// Raw gateway snapshot of one pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneRecord {
    pub session_name: String,
    pub window_index: u32,
    pub pane_index: u32,
    pub title: String,
    pub current_command: String,
    pub current_path: PathBuf,
    pub active: bool,
    pub activity: DateTime<Utc>,
}

impl PaneRecord {
    pub fn target(&self) -> PaneTarget {
        PaneTarget::new(self.session_name.clone(), self.window_index, self.pane_index)
    }
}

/// List every pane in every session. A multiplexer that is not running is
/// a recoverable state and yields an empty list, not an error.
pub fn list_all_panes(runner: &impl TmuxCommandRunner) -> Result<Vec<PaneRecord>, TmuxError> {
    match runner.run(&["list-panes", "-a", "-F", LIST_PANES_FORMAT]) {
        Ok(output) => parse_pane_list(&output),
        Err(err) if err.server_not_running() => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}

/// Parse raw `list-panes -a -F <LIST_PANES_FORMAT>` output.
pub fn parse_pane_list(output: &str) -> Result<Vec<PaneRecord>, TmuxError> {
    let mut records = Vec::new();
    for (idx, line) in output.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(line, idx + 1)?);
    }
    Ok(records)
}

fn parse_line(line: &str, line_num: usize) -> Result<PaneRecord, TmuxError> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 8 {
        return Err(TmuxError::Parse {
            line_num,
            detail: format!("expected 8 tab-separated fields, got {}", parts.len()),
        });
    }

    let window_index = parse_index(parts[1], "window index", line_num)?;
    let pane_index = parse_index(parts[2], "pane index", line_num)?;
    let active = parts[6].trim() == "1";
    let activity_epoch: i64 = parts[7].trim().parse().unwrap_or(0);
    let activity =
        DateTime::<Utc>::from_timestamp(activity_epoch, 0).unwrap_or(DateTime::UNIX_EPOCH);

    Ok(PaneRecord {
        session_name: parts[0].to_string(),
        window_index,
        pane_index,
        title: parts[3].to_string(),
        current_command: parts[4].to_string(),
        current_path: PathBuf::from(parts[5]),
        active,
        activity,
    })
}

fn parse_index(field: &str, what: &str, line_num: usize) -> Result<u32, TmuxError> {
    field.trim().parse().map_err(|_| TmuxError::Parse {
        line_num,
        detail: format!("invalid {what}: {field:?}"),
    })
}
