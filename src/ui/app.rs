use chrono::Local;
use crossterm::event::{KeyCode, KeyModifiers};

use crate::config::{slug, Action, Config, Folder};

use super::prompt::{
    complete_path, resolve_folder_path, sanitize_leaf, AddFolderStep, FolderDraft, Prompt,
    PromptKind,
};
use super::tree::{build_rows, SessionMap, SessionRow, TreeRow};
use super::viewport::Selection;
use super::{ActionOutcome, Command, Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    Loading,
    Ready(String),
    Failed(String),
}

/// Live capture of one session's pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub target: String,
    pub content: PreviewContent,
    pub seq: u64,
    pub zoomed: bool,
}

/// Exactly one mode owns key input at a time
#[derive(Debug, Clone)]
pub enum Mode {
    Navigate,
    Prompt(Prompt),
    KillConfirm { target: String },
    Preview(Preview),
}

/// Session tree state machine.
///
/// Keys go through [`App::handle_key`] and async results through
/// [`App::update`]. Both return the side effects to run; the app never
/// performs I/O itself.
#[derive(Debug)]
pub struct App {
    config: Config,
    sessions: SessionMap,
    rows: Vec<TreeRow>,
    selection: Selection,
    filter: String,
    mode: Mode,
    draft: FolderDraft,

    status: Option<String>,
    status_seq: u64,
    error: Option<String>,
    preview_seq: u64,

    editor_env: Option<String>,
    width: u16,
    height: u16,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let mut app = Self {
            config,
            sessions: SessionMap::new(),
            rows: Vec::new(),
            selection: Selection::default(),
            filter: String::new(),
            mode: Mode::Navigate,
            draft: FolderDraft::default(),
            status: None,
            status_seq: 0,
            error: None,
            preview_seq: 0,
            editor_env: std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()),
            width: 0,
            height: 0,
            should_quit: false,
        };
        app.rebuild();
        app
    }

    /// Commands to run once at startup
    pub fn init(&self) -> Vec<Command> {
        vec![self.fetch(), Command::ScheduleRefresh]
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Sessions owned by a folder, sorted by name
    pub fn folder_sessions(&self, folder: usize) -> Vec<&crate::tmux::Session> {
        let mut sessions: Vec<_> = self
            .sessions
            .get(&folder)
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        sessions.sort_by(|a, b| a.name.cmp(&b.name));
        sessions
    }

    pub fn total_sessions(&self) -> usize {
        self.sessions.values().map(Vec::len).sum()
    }

    pub fn selected_row(&self) -> Option<&TreeRow> {
        self.rows.get(self.selection.index())
    }

    pub fn selected_session(&self) -> Option<&SessionRow> {
        self.selected_row().and_then(TreeRow::as_session)
    }

    pub fn selected_folder(&self) -> Option<(usize, &Folder)> {
        let index = self.selected_row()?.folder_index();
        self.config.folders.get(index).map(|f| (index, f))
    }

    pub fn preview(&self) -> Option<&Preview> {
        match &self.mode {
            Mode::Preview(p) => Some(p),
            _ => None,
        }
    }

    /// Rows available to the tree and detail panes
    pub fn content_height(&self) -> usize {
        if self.height == 0 {
            return 18;
        }
        (self.height as usize).saturating_sub(3).max(8)
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
        match self.mode {
            Mode::Prompt(_) => self.handle_prompt_key(code, modifiers),
            Mode::KillConfirm { .. } => self.handle_kill_confirm_key(code),
            Mode::Preview(_) => self.handle_preview_key(code, modifiers),
            Mode::Navigate => self.handle_navigate_key(code, modifiers),
        }
    }

    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::RefreshTick => vec![self.fetch(), Command::ScheduleRefresh],

            Message::SessionsLoaded(Ok(sessions)) => {
                self.sessions = sessions;
                self.rebuild();
                self.error = None;
                Vec::new()
            }
            Message::SessionsLoaded(Err(e)) => {
                self.error = Some(e.to_string());
                Vec::new()
            }

            Message::ActionFinished(Ok(outcome)) => {
                let ActionOutcome {
                    status,
                    attach_target,
                } = outcome;
                let mut commands = vec![self.set_status(status), self.fetch()];
                if let Some(target) = attach_target {
                    commands.push(Command::Attach { target });
                }
                commands
            }
            Message::ActionFinished(Err(e)) => {
                self.error = Some(e.to_string());
                vec![self.fetch()]
            }

            Message::Attached(Ok(())) => {
                vec![self.set_status("detached from session"), self.fetch()]
            }
            Message::Attached(Err(e)) => {
                self.error = Some(e.to_string());
                vec![self.fetch()]
            }

            Message::PaneCaptured {
                target,
                seq,
                content,
            } => {
                if let Mode::Preview(preview) = &mut self.mode {
                    if preview.seq == seq && preview.target == target {
                        preview.content = match content {
                            Ok(text) => PreviewContent::Ready(text),
                            Err(e) => PreviewContent::Failed(e.to_string()),
                        };
                    }
                }
                Vec::new()
            }

            Message::PreviewTick { seq } => match &self.mode {
                Mode::Preview(preview) if preview.seq == seq => vec![
                    Command::CapturePane {
                        target: preview.target.clone(),
                        seq,
                    },
                    Command::SchedulePreviewTick { seq },
                ],
                _ => Vec::new(),
            },

            Message::FolderAdded(Ok(folder)) => {
                let status = format!("added folder: {}", folder.name);
                self.config.folders.push(folder);
                self.rebuild();
                vec![self.set_status(status), self.fetch()]
            }
            Message::FolderAdded(Err(e)) => {
                self.error = Some(e.to_string());
                Vec::new()
            }

            Message::ClearStatus { seq } => {
                if seq == self.status_seq {
                    self.status = None;
                }
                Vec::new()
            }
        }
    }

    fn handle_navigate_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
        if code == KeyCode::Esc {
            if self.filter.is_empty() {
                return Vec::new();
            }
            self.filter.clear();
            self.rebuild();
            return vec![self.set_status("filter cleared")];
        }

        let Some(action) = self.action_for(&code, modifiers) else {
            return Vec::new();
        };
        let len = self.rows.len();

        match action {
            Action::Quit => self.should_quit = true,
            Action::Up => self.selection.move_by(-1, len),
            Action::Down => self.selection.move_by(1, len),
            Action::Refresh => return vec![self.fetch()],
            Action::Filter => {
                let current = self.filter.clone();
                self.open_prompt(Prompt::new(
                    PromptKind::Filter,
                    &current,
                    "filter folders and sessions",
                ));
            }
            Action::PageDown => self.scroll_detail(1),
            Action::PageUp => self.scroll_detail(-1),
            Action::NewSession => {
                let Some((index, folder)) = self.selected_folder() else {
                    return self.fail("select a folder or one of its sessions");
                };
                let leaf = default_session_leaf(folder);
                self.open_prompt(Prompt::new(
                    PromptKind::NewSession { folder: index },
                    &leaf,
                    "new session name",
                ));
            }
            Action::Rename => {
                let Some(row) = self.selected_session() else {
                    return self.fail("select a session to rename");
                };
                let kind = PromptKind::Rename {
                    folder: row.folder,
                    session: row.name.clone(),
                };
                let leaf = row.leaf.clone();
                self.open_prompt(Prompt::new(kind, &leaf, "rename session"));
            }
            Action::RunCommand => {
                let Some(row) = self.selected_session() else {
                    return self.fail("select a session to run command");
                };
                let kind = PromptKind::RunCommand {
                    session: row.name.clone(),
                };
                self.open_prompt(Prompt::new(kind, "", "command to run"));
                return vec![self.set_status("run command in selected session")];
            }
            Action::Kill => {
                let Some(row) = self.selected_session() else {
                    return self.fail("select a session to kill");
                };
                self.mode = Mode::KillConfirm {
                    target: row.name.clone(),
                };
                self.status = None;
                self.error = None;
            }
            Action::AddFolder => {
                self.draft = FolderDraft::default();
                self.open_prompt(Prompt::add_folder(AddFolderStep::Name));
            }
            Action::Preview => {
                let Some(row) = self.selected_session() else {
                    return self.fail("select a session to preview");
                };
                let target = row.name.clone();
                return self.start_preview(target);
            }
            Action::Editor => return self.open_editor(),
            Action::Attach => {
                if let Some(row) = self.selected_session() {
                    let target = row.name.clone();
                    return self.attach(target);
                }
            }
            Action::Zoom => {}
        }
        Vec::new()
    }

    fn handle_prompt_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
        let Mode::Prompt(prompt) = &mut self.mode else {
            return Vec::new();
        };

        match code {
            KeyCode::Esc => {
                self.mode = Mode::Navigate;
                self.status = None;
                Vec::new()
            }
            KeyCode::Tab => {
                if prompt.completes_paths() {
                    if let Some(completed) = complete_path(prompt.input.text()) {
                        prompt.input.set_text(completed);
                    }
                }
                Vec::new()
            }
            KeyCode::Enter => self.submit_prompt(),
            _ => {
                prompt.input.handle_key(code, modifiers);
                Vec::new()
            }
        }
    }

    fn submit_prompt(&mut self) -> Vec<Command> {
        let Mode::Prompt(prompt) = &self.mode else {
            return Vec::new();
        };
        let kind = prompt.kind.clone();
        let value = prompt.value().to_string();

        match kind {
            PromptKind::NewSession { folder } => {
                if value.is_empty() {
                    return self.fail("session name is required");
                }
                let Some(folder) = self.config.folders.get(folder) else {
                    return self.fail("select a folder or one of its sessions");
                };
                let command = Command::CreateSession {
                    full_name: folder.session_name(&sanitize_leaf(&value)),
                    dir: folder.path.clone(),
                    default_command: folder.default_command.clone(),
                };
                self.mode = Mode::Navigate;
                vec![command]
            }

            PromptKind::Rename { folder, session } => {
                if value.is_empty() {
                    return self.fail("new session name is required");
                }
                let Some(folder) = self.config.folders.get(folder) else {
                    return self.fail("select a session to rename");
                };
                let to = folder.session_name(&sanitize_leaf(&value));
                self.mode = Mode::Navigate;
                vec![Command::RenameSession { from: session, to }]
            }

            PromptKind::RunCommand { session } => {
                if value.is_empty() {
                    return self.fail("command cannot be empty");
                }
                self.mode = Mode::Navigate;
                vec![Command::SendKeys {
                    target: session,
                    text: value,
                }]
            }

            PromptKind::Filter => {
                self.mode = Mode::Navigate;
                self.filter = value;
                self.rebuild();
                let status = if self.filter.is_empty() {
                    "filter cleared".to_string()
                } else {
                    format!("filter set: {}", self.filter)
                };
                vec![self.set_status(status)]
            }

            PromptKind::AddFolder { step } => self.submit_add_folder_step(step, value),
        }
    }

    fn submit_add_folder_step(&mut self, step: AddFolderStep, value: String) -> Vec<Command> {
        match step {
            AddFolderStep::Name => {
                if value.is_empty() {
                    return self.fail("folder name is required");
                }
                let namespace = slug(&value);
                if namespace.is_empty() {
                    return self.fail("folder name produced empty namespace");
                }
                if self.config.has_namespace(&namespace) {
                    return self.fail(format!("namespace {namespace:?} already exists"));
                }
                self.draft.name = value;
                self.draft.namespace = namespace;
                self.open_prompt(Prompt::add_folder(AddFolderStep::Path));
            }
            AddFolderStep::Path => {
                if value.is_empty() {
                    return self.fail("folder path is required");
                }
                match resolve_folder_path(&value) {
                    Ok(path) => self.draft.path = path,
                    Err(e) => return self.fail(e.to_string()),
                }
                self.open_prompt(Prompt::add_folder(AddFolderStep::DefaultCommand));
            }
            AddFolderStep::DefaultCommand => {
                self.draft.default_command = value;
                self.open_prompt(Prompt::add_folder(AddFolderStep::EditorCommand));
            }
            AddFolderStep::EditorCommand => {
                let folder = std::mem::take(&mut self.draft).finish(&value);
                self.mode = Mode::Navigate;
                return vec![Command::AppendFolder(folder)];
            }
        }
        Vec::new()
    }

    fn handle_kill_confirm_key(&mut self, code: KeyCode) -> Vec<Command> {
        let Mode::KillConfirm { target } = &self.mode else {
            return Vec::new();
        };

        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                let name = target.clone();
                self.mode = Mode::Navigate;
                vec![Command::KillSession { name }]
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = Mode::Navigate;
                vec![self.set_status("kill cancelled")]
            }
            _ => Vec::new(),
        }
    }

    fn handle_preview_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
        let action = self.action_for(&code, modifiers);
        let Mode::Preview(preview) = &mut self.mode else {
            return Vec::new();
        };

        if code == KeyCode::Esc {
            if preview.zoomed {
                preview.zoomed = false;
            } else {
                self.mode = Mode::Navigate;
            }
            return Vec::new();
        }

        match action {
            Some(Action::Quit) => self.should_quit = true,
            Some(Action::Zoom) => {
                preview.zoomed = !preview.zoomed;
                self.selection.reset_detail();
            }
            Some(Action::Refresh) => {
                return vec![Command::CapturePane {
                    target: preview.target.clone(),
                    seq: preview.seq,
                }];
            }
            Some(Action::Attach) => {
                let target = preview.target.clone();
                self.mode = Mode::Navigate;
                return self.attach(target);
            }
            _ => {}
        }
        Vec::new()
    }

    /// First action bound to the key, in [`Action::ALL`] order
    fn action_for(&self, code: &KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        Action::ALL
            .into_iter()
            .find(|a| self.config.keybindings.matches(*a, code, modifiers))
    }

    fn start_preview(&mut self, target: String) -> Vec<Command> {
        self.preview_seq += 1;
        let seq = self.preview_seq;
        self.mode = Mode::Preview(Preview {
            target: target.clone(),
            content: PreviewContent::Loading,
            seq,
            zoomed: false,
        });
        self.selection.reset_detail();
        vec![
            Command::CapturePane { target, seq },
            Command::SchedulePreviewTick { seq },
        ]
    }

    fn open_editor(&mut self) -> Vec<Command> {
        let Some((_, folder)) = self.selected_folder() else {
            return self.fail("select a folder or session");
        };
        let Some(command) = resolve_editor(
            folder.editor_command.as_deref(),
            self.config.editor_command.as_deref(),
            self.editor_env.as_deref(),
        ) else {
            return self.fail("no editor configured; set editor_command in config or $EDITOR");
        };

        let dir = match self.selected_session() {
            Some(row) if !row.current_path.is_empty() => row.current_path.clone().into(),
            _ => folder.path.clone(),
        };
        vec![Command::OpenEditor { command, dir }]
    }

    fn attach(&mut self, target: String) -> Vec<Command> {
        let clear = self.set_status(format!("attached to {target} (detach with Ctrl-b d)"));
        vec![clear, Command::Attach { target }]
    }

    fn open_prompt(&mut self, prompt: Prompt) {
        self.mode = Mode::Prompt(prompt);
        self.error = None;
        self.status = None;
    }

    fn fail(&mut self, message: impl Into<String>) -> Vec<Command> {
        self.error = Some(message.into());
        Vec::new()
    }

    fn set_status(&mut self, message: impl Into<String>) -> Command {
        self.status = Some(message.into());
        self.error = None;
        self.status_seq += 1;
        Command::ScheduleStatusClear {
            seq: self.status_seq,
        }
    }

    fn fetch(&self) -> Command {
        Command::FetchSessions {
            folders: self.config.folders.clone(),
        }
    }

    fn scroll_detail(&mut self, direction: isize) {
        let step = (self.content_height() / 2) as isize;
        let lines = super::render::detail_line_count(self);
        self.selection.scroll_detail(direction * step, lines);
    }

    fn rebuild(&mut self) {
        let previous = self.selected_row().map(TreeRow::key);
        self.rows = build_rows(&self.config.folders, &self.sessions, &self.filter);
        self.selection.clamp(self.rows.len());
        if self.selected_row().map(TreeRow::key) != previous {
            self.selection.reset_detail();
        }
    }
}

/// Editor precedence: folder override, then global override, then `$EDITOR`
pub fn resolve_editor(
    folder: Option<&str>,
    global: Option<&str>,
    env: Option<&str>,
) -> Option<String> {
    [folder, global, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

fn default_session_leaf(folder: &Folder) -> String {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    sanitize_leaf(&format!("{}-{stamp}", folder.namespace))
}
