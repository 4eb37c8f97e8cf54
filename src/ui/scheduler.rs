use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::config::{self, Folder};
use crate::error::Result;
use crate::tmux::{active_pane_states, enrich, SessionGateway};

use super::tree::{group_by_namespace, SessionMap};
use super::{ActionOutcome, Command, Message};

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(2);
pub const PREVIEW_INTERVAL: Duration = Duration::from_millis(200);
pub const STATUS_CLEAR_DELAY: Duration = Duration::from_millis(1500);

/// Runs background [`Command`]s on tokio tasks and reports back over `tx`
#[derive(Clone)]
pub struct Scheduler {
    gateway: Arc<dyn SessionGateway>,
    config_path: PathBuf,
    tx: UnboundedSender<Message>,
}

impl Scheduler {
    pub fn new(
        gateway: Arc<dyn SessionGateway>,
        config_path: PathBuf,
        tx: UnboundedSender<Message>,
    ) -> Self {
        Self {
            gateway,
            config_path,
            tx,
        }
    }

    pub fn gateway(&self) -> &Arc<dyn SessionGateway> {
        &self.gateway
    }

    /// Spawn the work for `command`. Foreground commands are not handled here.
    pub fn dispatch(&self, command: Command) {
        debug!(?command, "dispatch");
        let gateway = Arc::clone(&self.gateway);

        match command {
            Command::FetchSessions { folders } => self.spawn(async move {
                Message::SessionsLoaded(load_sessions(gateway.as_ref(), &folders).await)
            }),

            Command::CreateSession {
                full_name,
                dir,
                default_command,
            } => self.spawn_action(async move {
                gateway.new_session(&full_name, &dir).await?;
                if let Some(command) = default_command {
                    gateway.send_keys(&full_name, &command).await?;
                }
                Ok(ActionOutcome {
                    status: format!("created {full_name}"),
                    attach_target: Some(full_name),
                })
            }),

            Command::RenameSession { from, to } => self.spawn_action(async move {
                gateway.rename_session(&from, &to).await?;
                Ok(ActionOutcome::status(format!("renamed to {to}")))
            }),

            Command::SendKeys { target, text } => self.spawn_action(async move {
                gateway.send_keys(&target, &text).await?;
                Ok(ActionOutcome::status(format!("sent command to {target}")))
            }),

            Command::KillSession { name } => self.spawn_action(async move {
                gateway.kill_session(&name).await?;
                Ok(ActionOutcome::status(format!("killed {name}")))
            }),

            Command::CapturePane { target, seq } => self.spawn(async move {
                let content = gateway.capture_pane(&target).await;
                Message::PaneCaptured {
                    target,
                    seq,
                    content,
                }
            }),

            Command::AppendFolder(folder) => {
                let path = self.config_path.clone();
                self.spawn(async move {
                    let result = config::append_folder(&path, &folder).await.map(|()| folder);
                    if let Err(e) = &result {
                        warn!("append folder to {:?} failed: {e}", path);
                    }
                    Message::FolderAdded(result)
                })
            }

            Command::ScheduleRefresh => self.spawn_after(REFRESH_INTERVAL, Message::RefreshTick),
            Command::SchedulePreviewTick { seq } => {
                self.spawn_after(PREVIEW_INTERVAL, Message::PreviewTick { seq })
            }
            Command::ScheduleStatusClear { seq } => {
                self.spawn_after(STATUS_CLEAR_DELAY, Message::ClearStatus { seq })
            }

            Command::Attach { .. } | Command::OpenEditor { .. } => {
                warn!("foreground command sent to scheduler; ignoring");
            }
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            // Receiver is gone only during shutdown
            let _ = tx.send(task.await);
        });
    }

    fn spawn_action<F>(&self, task: F)
    where
        F: Future<Output = Result<ActionOutcome>> + Send + 'static,
    {
        self.spawn(async move {
            let result = task.await;
            if let Err(e) = &result {
                warn!("session action failed: {e}");
            }
            Message::ActionFinished(result)
        });
    }

    fn spawn_after(&self, delay: Duration, message: Message) {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            message
        });
    }
}

/// Fetch sessions and panes, enrich, and group under their folders.
///
/// With no folders the gateway is not called. A pane listing failure only
/// drops enrichment.
pub async fn load_sessions(gateway: &dyn SessionGateway, folders: &[Folder]) -> Result<SessionMap> {
    if folders.is_empty() {
        return Ok(SessionMap::new());
    }

    let (sessions, panes) = futures::join!(gateway.list_sessions(), gateway.list_panes());
    let mut sessions = sessions?;
    match panes {
        Ok(panes) => enrich(&mut sessions, &active_pane_states(&panes)),
        Err(e) => debug!("list panes failed, skipping enrichment: {e}"),
    }

    Ok(group_by_namespace(folders, sessions))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::mpsc;

    use super::*;
    use crate::error::Error;
    use crate::tmux::{AlertFlags, PaneInfo, Session};

    #[derive(Default)]
    struct FakeGateway {
        sessions: Vec<Session>,
        panes: Vec<PaneInfo>,
        fail_sessions: bool,
        fail_panes: bool,
        fail_new: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeGateway {
        fn record(&self, call: String) {
            self.calls.lock().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl SessionGateway for FakeGateway {
        async fn list_sessions(&self) -> Result<Vec<Session>> {
            self.record("list_sessions".into());
            if self.fail_sessions {
                return Err(Error::tmux("tmux list-sessions: boom"));
            }
            Ok(self.sessions.clone())
        }

        async fn list_panes(&self) -> Result<Vec<PaneInfo>> {
            self.record("list_panes".into());
            if self.fail_panes {
                return Err(Error::tmux("tmux list-panes: boom"));
            }
            Ok(self.panes.clone())
        }

        async fn new_session(&self, name: &str, cwd: &Path) -> Result<()> {
            self.record(format!("new_session {name} {}", cwd.display()));
            if self.fail_new {
                return Err(Error::tmux("duplicate session"));
            }
            Ok(())
        }

        async fn send_keys(&self, target: &str, text: &str) -> Result<()> {
            self.record(format!("send_keys {target} {text}"));
            Ok(())
        }

        async fn rename_session(&self, from: &str, to: &str) -> Result<()> {
            self.record(format!("rename_session {from} {to}"));
            Ok(())
        }

        async fn kill_session(&self, name: &str) -> Result<()> {
            self.record(format!("kill_session {name}"));
            Ok(())
        }

        async fn capture_pane(&self, name: &str) -> Result<String> {
            self.record(format!("capture_pane {name}"));
            Ok(format!("content of {name}"))
        }

        fn attach_command(&self, name: &str) -> tokio::process::Command {
            let mut cmd = tokio::process::Command::new("true");
            cmd.arg(name);
            cmd
        }
    }

    fn folders() -> Vec<Folder> {
        vec![Folder::new("api", "/tmp/api"), Folder::new("web", "/tmp/web")]
    }

    fn scheduler(gateway: FakeGateway) -> (Scheduler, Arc<FakeGateway>, mpsc::UnboundedReceiver<Message>) {
        let gateway = Arc::new(gateway);
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(gateway.clone(), PathBuf::from("unused.toml"), tx);
        (scheduler, gateway, rx)
    }

    #[tokio::test]
    async fn test_load_sessions_without_folders_skips_gateway() {
        let gateway = FakeGateway::default();
        let map = load_sessions(&gateway, &[]).await.unwrap();
        assert!(map.is_empty());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_sessions_groups_and_enriches() {
        let gateway = FakeGateway {
            sessions: vec![
                Session::new("api/one"),
                Session::new("web/two"),
                Session::new("other/skip"),
            ],
            panes: vec![PaneInfo {
                session_name: "api/one".into(),
                command: "cargo".into(),
                pane_active: true,
                window_active: true,
                alerts: AlertFlags {
                    activity: true,
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        };

        let map = load_sessions(&gateway, &folders()).await.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&0].len(), 1);
        assert_eq!(map[&0][0].current_command, "cargo");
        assert!(map[&0][0].alerts.activity);
        assert_eq!(map[&1][0].name, "web/two");
    }

    #[tokio::test]
    async fn test_load_sessions_degrades_without_panes() {
        let gateway = FakeGateway {
            sessions: vec![Session::new("api/one")],
            fail_panes: true,
            ..Default::default()
        };
        let map = load_sessions(&gateway, &folders()).await.unwrap();
        assert_eq!(map[&0][0].current_command, "");
    }

    #[tokio::test]
    async fn test_load_sessions_fails_on_list_error() {
        let gateway = FakeGateway {
            fail_sessions: true,
            ..Default::default()
        };
        let err = load_sessions(&gateway, &folders()).await.unwrap_err();
        assert!(err.to_string().contains("list-sessions"));
    }

    #[tokio::test]
    async fn test_create_session_sends_default_command() {
        let (scheduler, gateway, mut rx) = scheduler(FakeGateway::default());
        scheduler.dispatch(Command::CreateSession {
            full_name: "api/dev".into(),
            dir: "/tmp/api".into(),
            default_command: Some("make dev".into()),
        });

        let Some(Message::ActionFinished(Ok(outcome))) = rx.recv().await else {
            panic!("expected successful action");
        };
        assert_eq!(outcome.status, "created api/dev");
        assert_eq!(outcome.attach_target.as_deref(), Some("api/dev"));
        assert_eq!(
            gateway.calls(),
            ["new_session api/dev /tmp/api", "send_keys api/dev make dev"]
        );
    }

    #[tokio::test]
    async fn test_create_session_failure_skips_default_command() {
        let (scheduler, gateway, mut rx) = scheduler(FakeGateway {
            fail_new: true,
            ..Default::default()
        });
        scheduler.dispatch(Command::CreateSession {
            full_name: "api/dev".into(),
            dir: "/tmp/api".into(),
            default_command: Some("make dev".into()),
        });

        let Some(Message::ActionFinished(Err(e))) = rx.recv().await else {
            panic!("expected failed action");
        };
        assert_eq!(e.to_string(), "duplicate session");
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_kill_reports_exact_target() {
        let (scheduler, gateway, mut rx) = scheduler(FakeGateway::default());
        scheduler.dispatch(Command::KillSession {
            name: "api/two".into(),
        });

        let Some(Message::ActionFinished(Ok(outcome))) = rx.recv().await else {
            panic!("expected successful action");
        };
        assert_eq!(outcome, ActionOutcome::status("killed api/two"));
        assert_eq!(gateway.calls(), ["kill_session api/two"]);
    }

    #[tokio::test]
    async fn test_capture_carries_sequence() {
        let (scheduler, _gateway, mut rx) = scheduler(FakeGateway::default());
        scheduler.dispatch(Command::CapturePane {
            target: "api/one".into(),
            seq: 7,
        });

        let Some(Message::PaneCaptured {
            target,
            seq,
            content,
        }) = rx.recv().await
        else {
            panic!("expected capture");
        };
        assert_eq!(target, "api/one");
        assert_eq!(seq, 7);
        assert_eq!(content.unwrap(), "content of api/one");
    }

    #[tokio::test]
    async fn test_preview_tick_fires() {
        let (scheduler, _gateway, mut rx) = scheduler(FakeGateway::default());
        scheduler.dispatch(Command::SchedulePreviewTick { seq: 3 });
        assert!(matches!(rx.recv().await, Some(Message::PreviewTick { seq: 3 })));
    }

    #[tokio::test]
    async fn test_append_folder_writes_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let gateway = Arc::new(FakeGateway::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(gateway, path.clone(), tx);

        let folder = Folder::new("Docs", "/tmp/docs");
        scheduler.dispatch(Command::AppendFolder(folder.clone()));

        let Some(Message::FolderAdded(Ok(added))) = rx.recv().await else {
            panic!("expected folder added");
        };
        assert_eq!(added, folder);
        let loaded = config::Config::load(&path).await.unwrap();
        assert_eq!(loaded.folders, vec![folder]);
    }
}
