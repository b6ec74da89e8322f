//! Plain-text rendering of topology snapshots for `ls` and `watch`.

use projmux_core::{Pane, ShellKind};
use projmux_engine::{PaneSink, PaneTopology};

/// Visual marker per shell kind; unknown panes show only their title.
fn kind_icon(kind: ShellKind) -> &'static str {
    match kind {
        ShellKind::Shell => "⚡",
        ShellKind::Assistant => "🤖",
        ShellKind::Editor => "✎",
        ShellKind::Unknown => " ",
    }
}

fn render_pane(pane: &Pane) -> String {
    format!(
        "  {} {}  [{}]  {}",
        kind_icon(pane.kind),
        pane.display_title(),
        pane.target,
        pane.current_path.display()
    )
}

/// Multi-line tree: one block per project, then the other-sessions bucket.
pub fn render_topology(topology: &PaneTopology) -> String {
    let mut out = String::new();
    for group in &topology.projects {
        out.push_str(&group.project);
        out.push('\n');
        if group.panes.is_empty() {
            out.push_str("  (no panes)\n");
        }
        for pane in &group.panes {
            out.push_str(&render_pane(pane));
            out.push('\n');
        }
    }
    if !topology.other_sessions.is_empty() {
        out.push_str("Other Sessions\n");
        for pane in &topology.other_sessions {
            out.push_str(&render_pane(pane));
            out.push('\n');
        }
    }
    out
}

/// Sink for watch mode: prints every debounced update to stdout.
pub struct PrintSink;

impl PaneSink for PrintSink {
    fn on_panes_updated(&self, topology: &PaneTopology) {
        println!(
            "── {} ({} panes) ──",
            topology.generated_at.format("%H:%M:%S"),
            topology.pane_count()
        );
        print!("{}", render_topology(topology));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use projmux_core::PaneTarget;
    use projmux_engine::ProjectPanes;

    fn sample() -> PaneTopology {
        PaneTopology {
            generated_at: Utc.timestamp_opt(0, 0).single().expect("timestamp"),
            projects: vec![
                ProjectPanes {
                    project: "tui".into(),
                    panes: vec![Pane {
                        target: PaneTarget::new("tui", 0, 0),
                        title: "✳ ready".into(),
                        current_command: "claude".into(),
                        current_path: "/r/tui".into(),
                        kind: ShellKind::Assistant,
                        active: true,
                        last_activity: Utc.timestamp_opt(0, 0).single().expect("ts"),
                        project: Some("tui".into()),
                        worktree: None,
                    }],
                },
                ProjectPanes {
                    project: "log".into(),
                    panes: vec![],
                },
            ],
            other_sessions: vec![Pane {
                target: PaneTarget::new("scratch", 0, 0),
                title: "htop".into(),
                current_command: "htop".into(),
                current_path: "/tmp".into(),
                kind: ShellKind::Unknown,
                active: false,
                last_activity: Utc.timestamp_opt(0, 0).single().expect("ts"),
                project: None,
                worktree: None,
            }],
        }
    }

    #[test]
    fn renders_projects_and_other_bucket() {
        let text = render_topology(&sample());
        assert!(text.contains("tui\n"));
        assert!(text.contains("🤖 ✳ ready"));
        assert!(text.contains("[tui:0.0]"));
        assert!(text.contains("(no panes)"));
        assert!(text.contains("Other Sessions"));
        assert!(text.contains("htop"));
    }
}
