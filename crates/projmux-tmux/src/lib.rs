//! projmux-tmux: the multiplexer gateway. Thin synchronous wrapper issuing
//! tmux commands and parsing their delimiter-separated output into typed
//! records. IO boundary only — no knowledge of projects beyond start paths.

pub mod discover;
pub mod error;
pub mod executor;
pub mod navigate;
pub mod session;
pub mod window;

pub use discover::{LIST_PANES_FORMAT, PaneRecord, list_all_panes, parse_pane_list};
pub use error::TmuxError;
pub use executor::{TmuxCommandRunner, TmuxExecutor, inside_tmux};
pub use navigate::{attach_args, select_pane, switch_client};
pub use session::{
    SessionRecord, create_session, current_session_name, list_sessions, session_cwd,
    session_exists,
};
pub use window::{
    WindowPane, WindowRecord, create_window, list_window_pane_paths, list_window_panes,
    list_windows, split_pane,
};
