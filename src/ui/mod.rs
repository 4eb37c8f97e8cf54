mod app;
mod input;
mod prompt;
mod render;
mod runtime;
mod scheduler;
mod tree;
mod viewport;

use std::path::PathBuf;

pub use app::{App, Mode, Preview, PreviewContent};
pub use input::TextInput;
pub use prompt::{AddFolderStep, Prompt, PromptKind};
pub use runtime::run;
pub use scheduler::{load_sessions, Scheduler};
pub use tree::{build_rows, group_by_namespace, SessionMap, SessionRow, TreeRow};
pub use viewport::{window_around, Selection};

use crate::config::Folder;
use crate::error::Result;

/// Successful result of a mutating session operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub status: String,
    /// Session to attach to once the status is shown
    pub attach_target: Option<String>,
}

impl ActionOutcome {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            attach_target: None,
        }
    }
}

/// Results and timer ticks delivered to [`App::update`]
#[derive(Debug)]
pub enum Message {
    RefreshTick,
    SessionsLoaded(Result<SessionMap>),
    ActionFinished(Result<ActionOutcome>),
    Attached(Result<()>),
    PaneCaptured {
        target: String,
        seq: u64,
        content: Result<String>,
    },
    PreviewTick {
        seq: u64,
    },
    FolderAdded(Result<Folder>),
    ClearStatus {
        seq: u64,
    },
}

/// Side effects requested by [`App`]; each produces at most one [`Message`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchSessions {
        folders: Vec<Folder>,
    },
    CreateSession {
        full_name: String,
        dir: PathBuf,
        default_command: Option<String>,
    },
    RenameSession {
        from: String,
        to: String,
    },
    SendKeys {
        target: String,
        text: String,
    },
    KillSession {
        name: String,
    },
    CapturePane {
        target: String,
        seq: u64,
    },
    AppendFolder(Folder),
    Attach {
        target: String,
    },
    OpenEditor {
        command: String,
        dir: PathBuf,
    },
    ScheduleRefresh,
    SchedulePreviewTick {
        seq: u64,
    },
    ScheduleStatusClear {
        seq: u64,
    },
}

impl Command {
    /// Commands that take over the terminal and must run on the UI task
    pub fn is_foreground(&self) -> bool {
        matches!(self, Command::Attach { .. } | Command::OpenEditor { .. })
    }
}
