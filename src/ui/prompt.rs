use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::config::{absolutize, expand_home_in, Folder};
use crate::error::{Error, Result};

use super::input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddFolderStep {
    Name,
    Path,
    DefaultCommand,
    EditorCommand,
}

impl AddFolderStep {
    pub fn number(&self) -> usize {
        match self {
            AddFolderStep::Name => 1,
            AddFolderStep::Path => 2,
            AddFolderStep::DefaultCommand => 3,
            AddFolderStep::EditorCommand => 4,
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            AddFolderStep::Name => "folder name",
            AddFolderStep::Path => "folder path",
            AddFolderStep::DefaultCommand => "default command (optional)",
            AddFolderStep::EditorCommand => "editor command (optional, e.g. code .)",
        }
    }
}

/// What a prompt edits. Targets are captured when the prompt opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    NewSession { folder: usize },
    Rename { folder: usize, session: String },
    RunCommand { session: String },
    Filter,
    AddFolder { step: AddFolderStep },
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: TextInput,
    pub placeholder: &'static str,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: &str, placeholder: &'static str) -> Self {
        Self {
            kind,
            input: TextInput::with_text(initial),
            placeholder,
        }
    }

    pub fn add_folder(step: AddFolderStep) -> Self {
        Self::new(PromptKind::AddFolder { step }, "", step.placeholder())
    }

    pub fn title(&self) -> String {
        match &self.kind {
            PromptKind::NewSession { .. } => "new session:".to_string(),
            PromptKind::Rename { .. } => "rename:".to_string(),
            PromptKind::RunCommand { .. } => "command:".to_string(),
            PromptKind::Filter => "filter:".to_string(),
            PromptKind::AddFolder { step } => format!("add folder ({}/4):", step.number()),
        }
    }

    pub fn value(&self) -> &str {
        self.input.text().trim()
    }

    pub fn completes_paths(&self) -> bool {
        matches!(
            self.kind,
            PromptKind::AddFolder {
                step: AddFolderStep::Path
            }
        )
    }
}

/// Fields collected across the add-folder steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderDraft {
    pub name: String,
    pub namespace: String,
    pub path: PathBuf,
    pub default_command: String,
}

impl FolderDraft {
    pub fn finish(self, editor_command: &str) -> Folder {
        Folder {
            name: self.name,
            path: self.path,
            namespace: self.namespace,
            default_command: Some(self.default_command).filter(|s| !s.is_empty()),
            editor_command: Some(editor_command.to_string()).filter(|s| !s.is_empty()),
        }
    }
}

/// Lowercase leaf name: `/` is dropped, other runs outside `[a-z0-9]` become
/// one `-`. Never empty.
pub fn sanitize_leaf(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_dash = false;
    for ch in input.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            last_dash = false;
        } else if ch != '/' && !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    let out = out.trim_matches('-');
    if out.is_empty() {
        "session".to_string()
    } else {
        out.to_string()
    }
}

/// Resolve a typed folder path: expand `~`, make absolute against the cwd,
/// and require an existing directory.
pub fn resolve_folder_path(value: &str) -> Result<PathBuf> {
    resolve_folder_path_in(value, dirs::home_dir().as_deref())
}

fn resolve_folder_path_in(value: &str, home: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| Error::invalid_input(format!("invalid path: {e}")))?;
    let path = absolutize(&expand_home_in(value, home), &cwd)
        .map_err(|e| Error::invalid_input(format!("invalid path: {e}")))?;

    let meta = std::fs::metadata(&path)
        .map_err(|e| Error::invalid_input(format!("path not found: {}: {e}", path.display())))?;
    if !meta.is_dir() {
        return Err(Error::invalid_input("path is not a directory"));
    }
    Ok(path)
}

/// Tab completion for a directory path.
///
/// Extends the last component to the longest common prefix of matching
/// directories, adding a separator when exactly one matches. A leading `~`
/// is kept. Returns `None` when nothing matches.
pub fn complete_path(raw: &str) -> Option<String> {
    complete_path_in(raw, dirs::home_dir().as_deref())
}

fn complete_path_in(raw: &str, home: Option<&Path>) -> Option<String> {
    if raw.is_empty() {
        return None;
    }

    let expanded = expand_home_in(raw, home).to_string_lossy().to_string();
    let (dir, prefix) = match expanded.rfind(MAIN_SEPARATOR) {
        Some(i) => (&expanded[..=i], &expanded[i + 1..]),
        None => ("", expanded.as_str()),
    };
    let read_from = if dir.is_empty() { Path::new(".") } else { Path::new(dir) };

    let mut matches: Vec<String> = std::fs::read_dir(read_from)
        .ok()?
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(prefix))
        .collect();
    if matches.is_empty() {
        return None;
    }
    matches.sort();

    let common = longest_common_prefix(&matches);
    let mut completed = format!("{dir}{common}");
    if matches.len() == 1 {
        completed.push(MAIN_SEPARATOR);
    }

    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = home {
            let home = home.to_string_lossy();
            if let Some(rest) = completed.strip_prefix(home.as_ref()) {
                if rest.is_empty() || rest.starts_with(MAIN_SEPARATOR) {
                    completed = format!("~{rest}");
                }
            }
        }
    }

    Some(completed)
}

fn longest_common_prefix(items: &[String]) -> &str {
    let Some(first) = items.first() else {
        return "";
    };
    let mut len = first.len();
    for item in &items[1..] {
        len = first
            .char_indices()
            .zip(item.chars())
            .take_while(|((_, a), b)| a == b)
            .map(|((i, a), _)| i + a.len_utf8())
            .last()
            .unwrap_or(0)
            .min(len);
    }
    &first[..len]
}
