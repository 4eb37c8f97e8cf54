use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

use super::session::{parse_panes, parse_sessions, PaneInfo, Session, PANE_FORMAT, SESSION_FORMAT};
use super::SessionGateway;

/// Talks to tmux through its CLI
#[derive(Debug, Clone, Default)]
pub struct TmuxManager {
    socket: Option<String>,
}

impl TmuxManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a dedicated server socket (`tmux -L <name>`)
    pub fn with_socket(socket: Option<String>) -> Self {
        Self { socket }
    }

    fn tmux_cmd(&self) -> Command {
        let mut cmd = Command::new("tmux");
        if let Some(socket) = &self.socket {
            cmd.args(["-L", socket]);
        }
        cmd
    }

    /// Run a tmux subcommand, mapping failure to an error that carries
    /// the subcommand and its trimmed output.
    async fn run(&self, subcommand: &str, args: &[&str]) -> Result<Output> {
        let output = self.tmux_cmd().arg(subcommand).args(args).output().await?;
        if !output.status.success() {
            return Err(Error::tmux(format!(
                "tmux {subcommand}: {} ({})",
                output.status,
                combined_output(&output)
            )));
        }
        Ok(output)
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_string()
}

fn no_server(output: &str, extra: &str) -> bool {
    output.contains("no server running") || output.contains(extra)
}

#[async_trait]
impl SessionGateway for TmuxManager {
    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let output = self
            .tmux_cmd()
            .args(["list-sessions", "-F", SESSION_FORMAT])
            .output()
            .await?;

        if !output.status.success() {
            let text = combined_output(&output);
            if no_server(&text, "error connecting to") {
                return Ok(Vec::new());
            }
            return Err(Error::tmux(format!(
                "tmux list-sessions: {} ({text})",
                output.status
            )));
        }

        Ok(parse_sessions(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn list_panes(&self) -> Result<Vec<PaneInfo>> {
        let output = self
            .tmux_cmd()
            .args(["list-panes", "-a", "-F", PANE_FORMAT])
            .output()
            .await?;

        if !output.status.success() {
            let text = combined_output(&output);
            if no_server(&text, "no current") {
                return Ok(Vec::new());
            }
            return Err(Error::tmux(format!(
                "tmux list-panes: {} ({text})",
                output.status
            )));
        }

        Ok(parse_panes(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn new_session(&self, name: &str, cwd: &Path) -> Result<()> {
        let cwd = cwd.to_string_lossy();
        self.run("new-session", &["-d", "-s", name, "-c", &cwd])
            .await?;
        Ok(())
    }

    async fn send_keys(&self, target: &str, text: &str) -> Result<()> {
        self.run("send-keys", &["-t", target, text, "C-m"]).await?;
        Ok(())
    }

    async fn rename_session(&self, from: &str, to: &str) -> Result<()> {
        self.run("rename-session", &["-t", from, to]).await?;
        Ok(())
    }

    async fn kill_session(&self, name: &str) -> Result<()> {
        self.run("kill-session", &["-t", name]).await?;
        Ok(())
    }

    async fn capture_pane(&self, name: &str) -> Result<String> {
        let output = self.run("capture-pane", &["-e", "-t", name, "-p"]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn attach_command(&self, name: &str) -> Command {
        let mut cmd = self.tmux_cmd();
        // Already inside tmux: nesting is refused, so move this client instead.
        if std::env::var_os("TMUX").is_some() && self.socket.is_none() {
            cmd.args(["switch-client", "-t", name]);
        } else {
            cmd.args(["attach", "-t", name]);
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_is_passed_first() {
        let manager = TmuxManager::with_socket(Some("work".into()));
        let cmd = manager.tmux_cmd();
        let args: Vec<_> = cmd.as_std().get_args().collect();
        assert_eq!(args, ["-L", "work"]);
    }

    #[test]
    fn test_attach_command_targets_session() {
        let manager = TmuxManager::with_socket(Some("work".into()));
        let cmd = manager.attach_command("api/one");
        let args: Vec<_> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(args, ["-L", "work", "attach", "-t", "api/one"]);
        assert_eq!(cmd.as_std().get_program(), "tmux");
    }

    #[test]
    fn test_no_server_detection() {
        assert!(no_server("no server running on /tmp/tmux-1000/default", "x"));
        assert!(no_server("error connecting to /tmp/tmux", "error connecting to"));
        assert!(!no_server("can't find session", "no current"));
    }
}
