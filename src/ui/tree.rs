use std::collections::HashMap;

use crate::config::Folder;
use crate::tmux::{AlertFlags, Session};

/// Sessions grouped by the index of the folder that owns them
pub type SessionMap = HashMap<usize, Vec<Session>>;

/// Session row data, copied out of [`Session`] when the tree is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub folder: usize,
    pub name: String,
    pub leaf: String,
    pub attached: bool,
    pub windows: usize,
    pub has_alerts: bool,
    pub alerts: AlertFlags,
    pub current_command: String,
    pub pane_title: String,
    pub current_path: String,
    pub last_activity: i64,
}

impl SessionRow {
    fn from_session(folder_index: usize, folder: &Folder, s: &Session) -> Self {
        Self {
            folder: folder_index,
            name: s.name.clone(),
            leaf: folder.leaf_name(&s.name).to_string(),
            attached: s.attached,
            windows: s.windows,
            has_alerts: s.has_alerts,
            alerts: s.alerts,
            current_command: s.current_command.clone(),
            pane_title: s.pane_title.clone(),
            current_path: s.current_path.clone(),
            last_activity: s.last_activity,
        }
    }

    pub fn status(&self) -> &'static str {
        status_label(self.attached)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeRow {
    Folder { folder: usize },
    Session(SessionRow),
}

impl TreeRow {
    pub fn folder_index(&self) -> usize {
        match self {
            TreeRow::Folder { folder } => *folder,
            TreeRow::Session(s) => s.folder,
        }
    }

    pub fn as_session(&self) -> Option<&SessionRow> {
        match self {
            TreeRow::Session(s) => Some(s),
            TreeRow::Folder { .. } => None,
        }
    }

    /// Identity used to tell whether the selection moved to a different row
    pub fn key(&self) -> RowKey {
        match self {
            TreeRow::Folder { folder } => RowKey::Folder(*folder),
            TreeRow::Session(s) => RowKey::Session(s.name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    Folder(usize),
    Session(String),
}

pub fn status_label(attached: bool) -> &'static str {
    if attached {
        "attached"
    } else {
        "detached"
    }
}

/// Flatten folders and their sessions into display rows.
///
/// Folders keep registry order, sessions sort by full name. With a filter, a
/// folder whose name/path/namespace matches keeps all of its sessions;
/// otherwise only matching sessions are kept and the folder is dropped if none
/// match.
pub fn build_rows(folders: &[Folder], sessions: &SessionMap, filter: &str) -> Vec<TreeRow> {
    let query = filter.trim().to_lowercase();
    let mut rows = Vec::new();

    for (index, folder) in folders.iter().enumerate() {
        let folder_matches = query.is_empty()
            || contains_any(
                &[
                    folder.name.as_str(),
                    folder.path.to_string_lossy().as_ref(),
                    folder.namespace.as_str(),
                ],
                &query,
            );

        let mut owned: Vec<&Session> = sessions
            .get(&index)
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        owned.sort_by(|a, b| a.name.cmp(&b.name));

        let matched: Vec<TreeRow> = owned
            .into_iter()
            .map(|s| SessionRow::from_session(index, folder, s))
            .filter(|row| {
                folder_matches
                    || contains_any(&[row.leaf.as_str(), row.name.as_str(), row.status()], &query)
            })
            .map(TreeRow::Session)
            .collect();

        if !folder_matches && matched.is_empty() {
            continue;
        }

        rows.push(TreeRow::Folder { folder: index });
        rows.extend(matched);
    }

    rows
}

/// Assign each session to the first folder whose `<namespace>/` prefixes its
/// name. Sessions without an owner are dropped.
pub fn group_by_namespace(folders: &[Folder], sessions: Vec<Session>) -> SessionMap {
    let mut grouped = SessionMap::new();
    for session in sessions {
        if let Some(index) = folders.iter().position(|f| f.owns(&session.name)) {
            grouped.entry(index).or_default().push(session);
        }
    }
    grouped
}

fn contains_any(haystacks: &[&str], needle: &str) -> bool {
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(needle))
}
