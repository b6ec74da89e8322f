//! Engine configuration: layout policy and per-kind launch commands.

use projmux_core::{LayoutMode, ShellKind};
use serde::{Deserialize, Serialize};

/// Commands used to start each shell kind in a new pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellCommands {
    pub shell: String,
    pub assistant: String,
    pub editor: String,
}

impl Default for ShellCommands {
    fn default() -> Self {
        Self {
            shell: "zsh".into(),
            assistant: "claude -c".into(),
            editor: "nvim".into(),
        }
    }
}

impl ShellCommands {
    /// Launch command for a kind. `Unknown` panes are never allocated; a
    /// request for one gets a plain shell.
    pub fn command_for(&self, kind: ShellKind) -> &str {
        match kind {
            ShellKind::Shell | ShellKind::Unknown => &self.shell,
            ShellKind::Assistant => &self.assistant,
            ShellKind::Editor => &self.editor,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutMode,
    pub commands: ShellCommands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_commands() {
        let cfg = ShellCommands::default();
        assert_eq!(cfg.command_for(ShellKind::Shell), "zsh");
        assert_eq!(cfg.command_for(ShellKind::Assistant), "claude -c");
        assert_eq!(cfg.command_for(ShellKind::Editor), "nvim");
        assert_eq!(cfg.command_for(ShellKind::Unknown), "zsh");
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"layout": "unsplit", "commands": {"assistant": "claude"}}"#)
                .expect("deserialize");
        assert_eq!(cfg.layout, LayoutMode::Unsplit);
        assert_eq!(cfg.commands.assistant, "claude");
        assert_eq!(cfg.commands.shell, "zsh");
    }
}
