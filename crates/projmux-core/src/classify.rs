//! Pane classification: infer a `ShellKind` from a pane's title and current
//! command. Pure, deterministic, total — every input maps to a kind and
//! `Unknown` is the default. No I/O, no process inspection.

use crate::types::ShellKind;

/// Activity glyph assistant shells put at the front of their pane title.
/// Recognised regardless of current path, because assistant titles change
/// dynamically with activity while the command may be a generic wrapper.
pub const ASSISTANT_TITLE_GLYPH: &str = "✳";

/// Command names that identify an assistant shell.
const ASSISTANT_COMMANDS: &[&str] = &["claude"];

/// Wrapper interpreters an assistant may run under; for these the title is
/// allowed to carry the identifying keyword instead of the command.
const WRAPPER_COMMANDS: &[&str] = &["node", "bun", "deno"];

/// Title keywords that identify an assistant when the command is a wrapper.
const ASSISTANT_TITLE_KEYWORDS: &[&str] = &["claude"];

/// Command names that identify an editor pane.
const EDITOR_COMMANDS: &[&str] = &["nvim", "vim", "vi"];

/// Command names that identify a general interactive shell.
const SHELL_COMMANDS: &[&str] = &["zsh", "bash", "fish", "sh", "tcsh", "csh"];

/// Titles that carry no information worth displaying (bare shell names,
/// hostname-like defaults).
const BORING_TITLES: &[&str] = &["bash", "zsh", "sh", "fish", "tcsh", "csh", "node"];

/// Classify a pane by its title and current command.
pub fn classify(title: &str, command: &str) -> ShellKind {
    // Assistant titles win over everything: the glyph marker survives
    // arbitrary command wrappers and path changes.
    if title.contains(ASSISTANT_TITLE_GLYPH) {
        return ShellKind::Assistant;
    }

    let command = command_base(command);

    if ASSISTANT_COMMANDS.contains(&command.as_str()) {
        return ShellKind::Assistant;
    }

    // Assistants launched through an interpreter report the wrapper as their
    // command; the title keyword is only trusted in that case. A title-only
    // match with an unrelated command is not enough — stale titles persist
    // after the process in the pane changes.
    if WRAPPER_COMMANDS.contains(&command.as_str()) {
        let title_lower = title.to_ascii_lowercase();
        if ASSISTANT_TITLE_KEYWORDS
            .iter()
            .any(|kw| title_lower.contains(kw))
        {
            return ShellKind::Assistant;
        }
    }

    if EDITOR_COMMANDS.contains(&command.as_str()) {
        return ShellKind::Editor;
    }

    if SHELL_COMMANDS.contains(&command.as_str()) {
        return ShellKind::Shell;
    }

    ShellKind::Unknown
}

/// True for pane titles that add nothing over the command name.
pub fn is_boring_title(title: &str) -> bool {
    if title.ends_with(".local") {
        return true;
    }
    BORING_TITLES.contains(&title)
}

/// Lower-cased final path component of a command string, arguments stripped.
fn command_base(command: &str) -> String {
    let first = command.split_whitespace().next().unwrap_or("");
    let base = first.rsplit('/').next().unwrap_or(first);
    base.to_ascii_lowercase()
}
