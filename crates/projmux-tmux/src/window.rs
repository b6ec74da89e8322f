//! Window listing and window/pane creation.
//!
//! Creation uses `-P -F` so tmux prints the target it created; the parsed
//! result is the confirmation that the window/pane exists, which callers
//! require before registering anything.

use serde::{Deserialize, Serialize};
use std::path::Path;

use projmux_core::PaneTarget;

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

const LIST_WINDOWS_FORMAT: &str = "#{window_index}\t#{window_name}\t#{window_active}";
const LIST_WINDOW_PANES_FORMAT: &str = "#{pane_index}\t#{pane_current_command}\t#{pane_title}";
const NEW_WINDOW_PRINT: &str = "#{window_index}";
const SPLIT_PANE_PRINT: &str = "#{session_name}:#{window_index}.#{pane_index}";

/// Transient snapshot of one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub index: u32,
    pub name: String,
    pub active: bool,
}

/// One pane inside a specific window, as listed for kind matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPane {
    pub index: u32,
    pub current_command: String,
    pub title: String,
}

/// List the windows of a session. A session with no windows (or that just
/// disappeared) yields an empty list.
pub fn list_windows(
    runner: &impl TmuxCommandRunner,
    session: &str,
) -> Result<Vec<WindowRecord>, TmuxError> {
    let output = match runner.run(&["list-windows", "-t", session, "-F", LIST_WINDOWS_FORMAT]) {
        Ok(output) => output,
        Err(err) if err.server_not_running() => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut windows = Vec::new();
    for (idx, line) in output.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 3 {
            return Err(TmuxError::Parse {
                line_num: idx + 1,
                detail: format!("expected 3 tab-separated fields, got {}", parts.len()),
            });
        }
        let index = parts[0].trim().parse().map_err(|_| TmuxError::Parse {
            line_num: idx + 1,
            detail: format!("invalid window index: {:?}", parts[0]),
        })?;
        windows.push(WindowRecord {
            index,
            name: parts[1].to_string(),
            active: parts[2].trim() == "1",
        });
    }
    Ok(windows)
}

/// List the panes of one window with their commands and titles.
pub fn list_window_panes(
    runner: &impl TmuxCommandRunner,
    session: &str,
    window_index: u32,
) -> Result<Vec<WindowPane>, TmuxError> {
    let target = format!("{session}:{window_index}");
    let output = runner.run(&[
        "list-panes",
        "-t",
        &target,
        "-F",
        LIST_WINDOW_PANES_FORMAT,
    ])?;

    let mut panes = Vec::new();
    for (idx, line) in output.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 2 {
            return Err(TmuxError::Parse {
                line_num: idx + 1,
                detail: format!("expected at least 2 tab-separated fields, got {}", parts.len()),
            });
        }
        let index = parts[0].trim().parse().map_err(|_| TmuxError::Parse {
            line_num: idx + 1,
            detail: format!("invalid pane index: {:?}", parts[0]),
        })?;
        panes.push(WindowPane {
            index,
            current_command: parts[1].to_string(),
            title: parts.get(2).unwrap_or(&"").to_string(),
        });
    }
    Ok(panes)
}

/// Working directories of every pane in one window, for layout validity
/// checks (a project window is one where every pane sits in the project).
pub fn list_window_pane_paths(
    runner: &impl TmuxCommandRunner,
    session: &str,
    window_index: u32,
) -> Result<Vec<std::path::PathBuf>, TmuxError> {
    let target = format!("{session}:{window_index}");
    let output = runner.run(&["list-panes", "-t", &target, "-F", "#{pane_current_path}"])?;
    Ok(output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(std::path::PathBuf::from)
        .collect())
}

/// Create a detached window named `name` in `session`, rooted at
/// `start_path`, optionally running `command` in its first pane. Returns
/// the confirmed index of the new window.
pub fn create_window(
    runner: &impl TmuxCommandRunner,
    session: &str,
    name: &str,
    command: Option<&str>,
    start_path: &Path,
) -> Result<u32, TmuxError> {
    let path = start_path.to_string_lossy();
    let path: &str = path.as_ref();
    let mut args = vec![
        "new-window",
        "-d",
        "-t",
        session,
        "-n",
        name,
        "-c",
        path,
        "-P",
        "-F",
        NEW_WINDOW_PRINT,
    ];
    if let Some(cmd) = command {
        args.push(cmd);
    }
    let output = runner.run(&args)?;
    let printed = output.trim();
    printed.parse().map_err(|_| TmuxError::Parse {
        line_num: 1,
        detail: format!("new-window printed unexpected index: {printed:?}"),
    })
}

/// Split a new pane into an existing window, rooted at `start_path`,
/// optionally running `command`. Returns the confirmed target of the new
/// pane.
pub fn split_pane(
    runner: &impl TmuxCommandRunner,
    session: &str,
    window_index: u32,
    command: Option<&str>,
    start_path: &Path,
) -> Result<PaneTarget, TmuxError> {
    let target = format!("{session}:{window_index}");
    let path = start_path.to_string_lossy();
    let path: &str = path.as_ref();
    let mut args = vec![
        "split-window",
        "-d",
        "-h",
        "-t",
        target.as_str(),
        "-c",
        path,
        "-P",
        "-F",
        SPLIT_PANE_PRINT,
    ];
    if let Some(cmd) = command {
        args.push(cmd);
    }
    let output = runner.run(&args)?;
    let printed = output.trim();
    printed.parse().map_err(|detail| TmuxError::Parse {
        line_num: 1,
        detail: format!("split-window printed unexpected target: {detail}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(&'static str);
    impl TmuxCommandRunner for Scripted {
        fn run(&self, _args: &[&str]) -> Result<String, TmuxError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn parses_window_listing() {
        let windows = list_windows(&Scripted("0\ttui\t1\n1\ttui:assistant\t0\n"), "icf")
            .expect("list");
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].name, "tui");
        assert!(windows[0].active);
        assert_eq!(windows[1].name, "tui:assistant");
        assert_eq!(windows[1].index, 1);
    }

    #[test]
    fn window_listing_rejects_bad_index() {
        assert!(list_windows(&Scripted("x\ttui\t1\n"), "icf").is_err());
    }

    #[test]
    fn parses_window_panes() {
        let panes =
            list_window_panes(&Scripted("0\tzsh\tzsh\n1\tnode\t✳ busy\n"), "icf", 2).expect("list");
        assert_eq!(panes.len(), 2);
        assert_eq!(panes[1].current_command, "node");
        assert_eq!(panes[1].title, "✳ busy");
    }

    #[test]
    fn create_window_returns_printed_index() {
        struct Capture;
        impl TmuxCommandRunner for Capture {
            fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
                assert_eq!(args[0], "new-window");
                assert!(args.contains(&"-d"));
                assert!(args.contains(&"tui"));
                assert!(args.contains(&"/repo/tui"));
                assert_eq!(*args.last().expect("args"), "claude -c");
                Ok("3\n".into())
            }
        }
        let index = create_window(&Capture, "icf", "tui", Some("claude -c"), Path::new("/repo/tui"))
            .expect("create");
        assert_eq!(index, 3);
    }

    #[test]
    fn create_window_without_command_omits_it() {
        struct Capture;
        impl TmuxCommandRunner for Capture {
            fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
                assert_eq!(*args.last().expect("args"), NEW_WINDOW_PRINT);
                Ok("0".into())
            }
        }
        create_window(&Capture, "icf", "tui", None, Path::new("/repo")).expect("create");
    }

    #[test]
    fn create_window_garbage_print_is_error() {
        let err = create_window(&Scripted("??\n"), "icf", "tui", None, Path::new("/repo"))
            .expect_err("should fail");
        assert!(matches!(err, TmuxError::Parse { .. }));
    }

    #[test]
    fn split_pane_returns_confirmed_target() {
        let target = split_pane(&Scripted("icf:2.1\n"), "icf", 2, Some("zsh"), Path::new("/repo"))
            .expect("split");
        assert_eq!(target.to_string(), "icf:2.1");
        assert_eq!(target.window, 2);
        assert_eq!(target.pane, 1);
    }

    #[test]
    fn split_pane_garbage_print_is_error() {
        assert!(split_pane(&Scripted("nope"), "icf", 2, None, Path::new("/repo")).is_err());
    }
}
