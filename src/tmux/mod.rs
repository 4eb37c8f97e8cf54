mod manager;
mod session;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

pub use manager::TmuxManager;
pub use session::{
    active_pane_states, enrich, parse_panes, parse_sessions, strip_title_branding,
    ActivePaneState, AlertFlags, PaneInfo, Session,
};

/// Everything the UI needs from the terminal multiplexer.
///
/// Implementations must be cheap to share behind an `Arc`; each call runs on
/// its own task.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// All sessions; empty when no server is running
    async fn list_sessions(&self) -> Result<Vec<Session>>;

    /// All panes across every session; empty when no server is running
    async fn list_panes(&self) -> Result<Vec<PaneInfo>>;

    async fn new_session(&self, name: &str, cwd: &Path) -> Result<()>;

    /// Type `text` into the target followed by Enter
    async fn send_keys(&self, target: &str, text: &str) -> Result<()>;

    async fn rename_session(&self, from: &str, to: &str) -> Result<()>;

    async fn kill_session(&self, name: &str) -> Result<()>;

    /// Visible pane content including escape sequences
    async fn capture_pane(&self, name: &str) -> Result<String>;

    /// Foreground command that attaches the terminal to `name`
    fn attach_command(&self, name: &str) -> tokio::process::Command;
}
