use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

const TEMPLATE: &str = r#"# Example canopy config
#
# editor_command = "code ."
#
# [[folder]]
# name = "Main API"
# path = "/Users/you/dev/main-api"
# default_command = "bin/dev"
# editor_command = "zed ."
"#;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    editor_command: Option<String>,
    #[serde(default)]
    tmux_socket: Option<String>,
    #[serde(default, rename = "folder")]
    folders: Vec<FolderEntry>,
    #[serde(default)]
    keybindings: HashMap<String, OneOrMany>,
}

/// On-disk shape of a `[[folder]]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FolderEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    editor_command: Option<String>,
}

#[derive(Serialize)]
struct AppendedFolder<'a> {
    folder: Vec<&'a FolderEntry>,
}

/// A configured project folder. Sessions named `<namespace>/<leaf>` belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub path: PathBuf,
    pub namespace: String,
    pub default_command: Option<String>,
    pub editor_command: Option<String>,
}

impl Folder {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let namespace = slug(&name);
        Self {
            name,
            path: path.into(),
            namespace,
            default_command: None,
            editor_command: None,
        }
    }

    pub fn with_default_command(mut self, command: impl Into<String>) -> Self {
        self.default_command = non_empty(command.into());
        self
    }

    pub fn with_editor_command(mut self, command: impl Into<String>) -> Self {
        self.editor_command = non_empty(command.into());
        self
    }

    /// Whether a tmux session name falls under this folder's namespace
    pub fn owns(&self, session_name: &str) -> bool {
        session_name
            .strip_prefix(self.namespace.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Session name with the `<namespace>/` prefix removed
    pub fn leaf_name<'a>(&self, session_name: &'a str) -> &'a str {
        session_name
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(session_name)
    }

    pub fn session_name(&self, leaf: &str) -> String {
        format!("{}/{}", self.namespace, leaf)
    }

    fn to_entry(&self) -> FolderEntry {
        FolderEntry {
            name: self.name.clone(),
            path: self.path.to_string_lossy().to_string(),
            default_command: self.default_command.clone(),
            editor_command: self.editor_command.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub editor_command: Option<String>,
    pub tmux_socket: Option<String>,
    pub folders: Vec<Folder>,
    pub keybindings: KeyBindings,
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::config(format!("read config {:?}: {e}", path)))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base_dir).map_err(|e| match e {
            Error::TomlDe(e) => Error::config(format!("decode config {:?}: {e}", path)),
            other => other,
        })
    }

    /// Parse and normalize config text; relative folder paths resolve against `base_dir`.
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;

        let mut folders: Vec<Folder> = Vec::with_capacity(file.folders.len());
        for (i, entry) in file.folders.into_iter().enumerate() {
            let name = entry.name.trim().to_string();
            let path = entry.path.trim();
            if name.is_empty() {
                return Err(Error::config(format!("folder[{i}] name is required")));
            }
            if path.is_empty() {
                return Err(Error::config(format!("folder[{i}] path is required")));
            }

            let namespace = slug(&name);
            if namespace.is_empty() {
                return Err(Error::config(format!(
                    "folder {name:?} produced empty namespace"
                )));
            }
            if folders.iter().any(|f| f.namespace == namespace) {
                return Err(Error::config(format!(
                    "folder {name:?} conflicts with another folder namespace {namespace:?}"
                )));
            }

            let path = absolutize(&expand_home(path), base_dir)?;
            folders.push(Folder {
                name,
                path,
                namespace,
                default_command: entry.default_command.and_then(non_empty),
                editor_command: entry.editor_command.and_then(non_empty),
            });
        }

        let mut keybindings = KeyBindings::default();
        keybindings.apply_overrides(file.keybindings);

        Ok(Self {
            editor_command: file.editor_command.and_then(non_empty),
            tmux_socket: file.tmux_socket.and_then(non_empty),
            folders,
            keybindings,
        })
    }

    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.folders.iter().any(|f| f.namespace == namespace)
    }
}

/// Default config location: `~/.config/canopy/config.toml`
pub fn default_config_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".config").join("canopy").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

/// Write a commented template if no config exists yet. Returns true when created.
pub async fn ensure_template(path: &Path) -> Result<bool> {
    if fs::try_exists(path)
        .await
        .map_err(|e| Error::config(format!("check config {:?}: {e}", path)))?
    {
        return Ok(false);
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::config(format!("create config directory {:?}: {e}", dir)))?;
    }

    fs::write(path, TEMPLATE)
        .await
        .map_err(|e| Error::config(format!("write config template {:?}: {e}", path)))?;
    Ok(true)
}

/// Append one `[[folder]]` table to the config file.
pub async fn append_folder(path: &Path, folder: &Folder) -> Result<()> {
    let entry = folder.to_entry();
    let block = toml::to_string(&AppendedFolder {
        folder: vec![&entry],
    })?;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| Error::config(format!("open config for append: {e}")))?;
    file.write_all(format!("\n{block}").as_bytes())
        .await
        .map_err(|e| Error::config(format!("write folder block: {e}")))?;
    file.flush().await?;
    Ok(())
}

/// Lowercase slug: runs outside `[a-z0-9]` collapse to one `-`, trimmed at both ends.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_dash = false;
    for ch in s.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

pub fn expand_home(path: &str) -> PathBuf {
    expand_home_in(path, dirs::home_dir().as_deref())
}

/// [`expand_home`] against an explicit home directory
pub fn expand_home_in(path: &str, home: Option<&Path>) -> PathBuf {
    let trimmed = path.trim();
    match (trimmed, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (_, Some(home)) => match trimmed.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            None => PathBuf::from(trimmed),
        },
        (_, None) => PathBuf::from(trimmed),
    }
}

/// Make `path` absolute against `base_dir` (and the cwd if that is relative too),
/// resolving `.` and `..` lexically.
pub fn absolutize(path: &Path, base_dir: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else if base_dir.is_absolute() {
        base_dir.join(path)
    } else {
        std::env::current_dir()?.join(base_dir).join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

fn non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Rebindable navigate/preview actions. Esc, Tab, and prompt editing keys are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Up,
    Down,
    Refresh,
    Filter,
    PageUp,
    PageDown,
    NewSession,
    Rename,
    RunCommand,
    Kill,
    AddFolder,
    Preview,
    Editor,
    Attach,
    Zoom,
}

impl Action {
    pub const ALL: [Action; 16] = [
        Action::Quit,
        Action::Up,
        Action::Down,
        Action::Refresh,
        Action::Filter,
        Action::PageUp,
        Action::PageDown,
        Action::NewSession,
        Action::Rename,
        Action::RunCommand,
        Action::Kill,
        Action::AddFolder,
        Action::Preview,
        Action::Editor,
        Action::Attach,
        Action::Zoom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Quit => "quit",
            Action::Up => "up",
            Action::Down => "down",
            Action::Refresh => "refresh",
            Action::Filter => "filter",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::NewSession => "new_session",
            Action::Rename => "rename",
            Action::RunCommand => "run_command",
            Action::Kill => "kill",
            Action::AddFolder => "add_folder",
            Action::Preview => "preview",
            Action::Editor => "editor",
            Action::Attach => "attach",
            Action::Zoom => "zoom",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Position in [`Action::ALL`]; lower ranks win shared keys
    fn rank(&self) -> usize {
        Self::ALL.iter().position(|a| a == self).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    /// Display label used by the help bar, e.g. `K` or `ctrl+r`.
    pub fn label(&self) -> String {
        let key = match self.code {
            KeyCode::Enter => "⏎".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::PageUp => "pgup".to_string(),
            KeyCode::PageDown => "pgdn".to_string(),
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            other => format!("{other:?}").to_lowercase(),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("ctrl+{key}")
        } else if self.modifiers.contains(KeyModifiers::ALT) {
            format!("alt+{key}")
        } else {
            key
        }
    }

    fn matches(&self, code: &KeyCode, modifiers: KeyModifiers) -> bool {
        // Terminals report uppercase letters with SHIFT; the char already encodes it.
        let strip = |c: &KeyCode, m: KeyModifiers| {
            if matches!(c, KeyCode::Char(_)) {
                m - KeyModifiers::SHIFT
            } else {
                m
            }
        };
        &self.code == code && strip(&self.code, self.modifiers) == strip(code, modifiers)
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<Action, Vec<KeySpec>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;

        let bindings = HashMap::from([
            (Quit, vec![KeySpec::char('q'), KeySpec::ctrl('c')]),
            (Up, vec![KeySpec::plain(KeyCode::Up), KeySpec::char('k')]),
            (Down, vec![KeySpec::plain(KeyCode::Down), KeySpec::char('j')]),
            (Refresh, vec![KeySpec::char('r')]),
            (Filter, vec![KeySpec::char('/')]),
            (
                PageUp,
                vec![KeySpec::plain(KeyCode::PageUp), KeySpec::ctrl('b')],
            ),
            (
                PageDown,
                vec![KeySpec::plain(KeyCode::PageDown), KeySpec::ctrl('f')],
            ),
            (NewSession, vec![KeySpec::char('n')]),
            (Rename, vec![KeySpec::char('R')]),
            (RunCommand, vec![KeySpec::char('c')]),
            (Kill, vec![KeySpec::char('K')]),
            (AddFolder, vec![KeySpec::char('A')]),
            (Preview, vec![KeySpec::char('v')]),
            (Editor, vec![KeySpec::char('e')]),
            (Attach, vec![KeySpec::plain(KeyCode::Enter)]),
            (Zoom, vec![KeySpec::char('z')]),
        ]);

        Self { bindings }
    }
}

impl KeyBindings {
    fn apply_overrides(&mut self, overrides: HashMap<String, OneOrMany>) {
        let mut overridden = Vec::new();
        for (name, spec) in overrides {
            let Some(action) = Action::from_name(name.trim()) else {
                tracing::warn!("ignoring keybinding for unknown action {name:?}");
                continue;
            };
            let parsed: Vec<KeySpec> = spec
                .into_vec()
                .iter()
                .filter_map(|s| parse_key_spec(s))
                .collect();
            if parsed.is_empty() {
                tracing::warn!("no valid keys for action {name:?}; keeping defaults");
                continue;
            }
            self.bindings.insert(action, parsed);
            overridden.push(action);
        }
        self.release_claimed_keys(&overridden);
    }

    /// Keys named in an override win over other actions' defaults. Two
    /// overrides sharing a key are left as is; the earlier action in
    /// [`Action::ALL`] handles it.
    fn release_claimed_keys(&mut self, overridden: &[Action]) {
        for &action in overridden {
            let claimed = self.bindings.get(&action).cloned().unwrap_or_default();
            let clashes = |k: &KeySpec| claimed.iter().any(|c| c.matches(&k.code, k.modifiers));

            for other in Action::ALL {
                if other == action {
                    continue;
                }
                let Some(keys) = self.bindings.get_mut(&other) else {
                    continue;
                };
                if overridden.contains(&other) {
                    if action.rank() < other.rank() && keys.iter().any(clashes) {
                        tracing::warn!(
                            "keybindings for {:?} and {:?} share a key; {:?} takes it",
                            action.name(),
                            other.name(),
                            action.name()
                        );
                    }
                    continue;
                }

                let before = keys.len();
                keys.retain(|k| !clashes(k));
                if keys.len() != before {
                    tracing::warn!(
                        "keybinding for {:?} replaces a default key of {:?}",
                        action.name(),
                        other.name()
                    );
                }
                if keys.is_empty() {
                    tracing::warn!("action {:?} has no keys left", other.name());
                }
            }
        }
    }

    pub fn matches(&self, action: Action, code: &KeyCode, modifiers: KeyModifiers) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|v| v.iter().any(|k| k.matches(code, modifiers)))
    }

    /// First key bound to `action`, for hints.
    pub fn label(&self, action: Action) -> String {
        self.bindings
            .get(&action)
            .and_then(|v| v.first())
            .map(KeySpec::label)
            .unwrap_or_default()
    }
}

fn parse_key_spec(s: &str) -> Option<KeySpec> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut modifiers = KeyModifiers::NONE;
    let parts: Vec<&str> = s.split('+').map(|p| p.trim()).collect();
    let (mods, key_part) = if parts.len() >= 2 && !parts[parts.len() - 1].is_empty() {
        (&parts[..parts.len() - 1], parts[parts.len() - 1])
    } else {
        (&[][..], s)
    };

    for m in mods {
        match m.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "alt" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    let code = match key_part.to_lowercase().as_str() {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "pgup" | "pageup" => KeyCode::PageUp,
        "pgdown" | "pgdn" | "pagedown" => KeyCode::PageDown,
        _ => {
            // Single-character fallback keeps case, so "K" and "k" differ
            let mut chars = key_part.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(c)
        }
    };

    Some(KeySpec { code, modifiers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Main API"), "main-api");
        assert_eq!(slug("  Hello_World  "), "hello-world");
        assert_eq!(slug("a---b___c"), "a-b-c");
        assert_eq!(slug("---"), "");
    }

    #[test]
    fn test_expand_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("~/projects/app"), home.join("projects").join("app"));
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
    }

    #[test]
    fn test_expand_home_in() {
        let home = Path::new("/home/dev");
        assert_eq!(expand_home_in("~", Some(home)), PathBuf::from("/home/dev"));
        assert_eq!(expand_home_in(" ~/src ", Some(home)), PathBuf::from("/home/dev/src"));
        assert_eq!(expand_home_in("~other", Some(home)), PathBuf::from("~other"));
        assert_eq!(expand_home_in("~/src", None), PathBuf::from("~/src"));
    }

    #[test]
    fn test_parse_normalizes_folders() {
        let base = tempfile::tempdir().unwrap();
        let content = r#"
editor_command = "  code .  "

[[folder]]
name = " Main API "
path = " ./api "
default_command = "  make dev  "
editor_command = "  zed .  "

[[folder]]
name = "Web"
path = "/srv/web"
"#;
        let cfg = Config::parse(content, base.path()).unwrap();

        assert_eq!(cfg.editor_command.as_deref(), Some("code ."));
        assert_eq!(cfg.folders.len(), 2);

        let f = &cfg.folders[0];
        assert_eq!(f.name, "Main API");
        assert_eq!(f.namespace, "main-api");
        assert_eq!(f.path, base.path().join("api"));
        assert_eq!(f.default_command.as_deref(), Some("make dev"));
        assert_eq!(f.editor_command.as_deref(), Some("zed ."));

        let web = &cfg.folders[1];
        assert_eq!(web.path, PathBuf::from("/srv/web"));
        assert_eq!(web.default_command, None);
    }

    #[test]
    fn test_parse_template_has_no_folders() {
        let cfg = Config::parse(TEMPLATE, Path::new("/tmp")).unwrap();
        assert!(cfg.folders.is_empty());
        assert!(cfg.editor_command.is_none());
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("[[folder]]\npath = \"./x\"\n", "name is required"),
            ("[[folder]]\nname = \"x\"\n", "path is required"),
            (
                "[[folder]]\nname = \"My App\"\npath = \"./a\"\n[[folder]]\nname = \"my-app\"\npath = \"./b\"\n",
                "conflicts with",
            ),
            (
                "[[folder]]\nname = \"---\"\npath = \"./a\"\n",
                "produced empty namespace",
            ),
        ];

        for (content, want) in cases {
            let err = Config::parse(content, Path::new("/tmp")).unwrap_err();
            assert!(
                err.to_string().contains(want),
                "error {:?} should contain {:?}",
                err.to_string(),
                want
            );
        }
    }

    #[test]
    fn test_absolutize_resolves_parent_components() {
        let p = absolutize(Path::new("../b/./c"), Path::new("/x/y")).unwrap();
        assert_eq!(p, PathBuf::from("/x/b/c"));
    }

    #[test]
    fn test_folder_namespace_helpers() {
        let f = Folder::new("API", "/tmp/api");
        assert_eq!(f.namespace, "api");
        assert!(f.owns("api/one"));
        assert!(!f.owns("apiary/one"));
        assert!(!f.owns("api"));
        assert_eq!(f.leaf_name("api/one"), "one");
        assert_eq!(f.session_name("two"), "api/two");
    }

    #[tokio::test]
    async fn test_ensure_template_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("canopy").join("config.toml");

        assert!(ensure_template(&path).await.unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Example canopy config"));
    }

    #[tokio::test]
    async fn test_ensure_template_keeps_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let existing = "editor_command = \"vim .\"\n";
        std::fs::write(&path, existing).unwrap();

        assert!(!ensure_template(&path).await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), existing);
    }

    #[tokio::test]
    async fn test_append_folder_is_loadable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "editor_command = \"code .\"\n").unwrap();

        let folder = Folder::new("Main API", "/tmp/main-api")
            .with_default_command("make dev")
            .with_editor_command("zed .");
        append_folder(&path, &folder).await.unwrap();
        append_folder(&path, &Folder::new("Web \"UI\"", "/tmp/web"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("editor_command = \"code .\"\n"));
        assert_eq!(content.matches("[[folder]]").count(), 2);

        let cfg = Config::load(&path).await.unwrap();
        assert_eq!(cfg.editor_command.as_deref(), Some("code ."));
        assert_eq!(cfg.folders[0], folder);
        assert_eq!(cfg.folders[1].name, "Web \"UI\"");
        assert_eq!(cfg.folders[1].default_command, None);
    }

    #[test]
    fn test_parse_key_spec() {
        assert_eq!(
            parse_key_spec("ctrl+r"),
            Some(KeySpec {
                code: KeyCode::Char('r'),
                modifiers: KeyModifiers::CONTROL
            })
        );
        assert_eq!(parse_key_spec("K"), Some(KeySpec::char('K')));
        assert_eq!(parse_key_spec("pgdn"), Some(KeySpec::plain(KeyCode::PageDown)));
        assert_eq!(parse_key_spec("+"), Some(KeySpec::char('+')));
        assert_eq!(parse_key_spec("hyper+x"), None);
        assert_eq!(parse_key_spec("abc"), None);
    }

    #[test]
    fn test_keybinding_overrides() {
        let cfg = Config::parse(
            "[keybindings]\nkill = [\"x\", \"ctrl+k\"]\nnope = \"y\"\nrename = \"\"\n",
            Path::new("/tmp"),
        )
        .unwrap();
        let kb = &cfg.keybindings;

        assert!(kb.matches(Action::Kill, &KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(kb.matches(Action::Kill, &KeyCode::Char('k'), KeyModifiers::CONTROL));
        assert!(!kb.matches(Action::Kill, &KeyCode::Char('K'), KeyModifiers::SHIFT));
        // invalid override keeps the default
        assert!(kb.matches(Action::Rename, &KeyCode::Char('R'), KeyModifiers::SHIFT));
    }

    #[test]
    fn test_override_takes_key_from_defaults() {
        let cfg = Config::parse("[keybindings]\nkill = \"q\"\n", Path::new("/tmp")).unwrap();
        let kb = &cfg.keybindings;

        assert!(kb.matches(Action::Kill, &KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(!kb.matches(Action::Quit, &KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(kb.matches(Action::Quit, &KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(kb.label(Action::Quit), "ctrl+c");
    }

    #[test]
    fn test_shared_override_keeps_both() {
        let cfg = Config::parse(
            "[keybindings]\nquit = \"x\"\nkill = \"x\"\n",
            Path::new("/tmp"),
        )
        .unwrap();
        let kb = &cfg.keybindings;
        assert!(kb.matches(Action::Quit, &KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(kb.matches(Action::Kill, &KeyCode::Char('x'), KeyModifiers::NONE));
    }

    #[test]
    fn test_shift_is_ignored_for_chars() {
        let kb = KeyBindings::default();
        assert!(kb.matches(Action::Kill, &KeyCode::Char('K'), KeyModifiers::SHIFT));
        assert!(kb.matches(Action::Kill, &KeyCode::Char('K'), KeyModifiers::NONE));
        assert!(!kb.matches(Action::Up, &KeyCode::Char('K'), KeyModifiers::SHIFT));
        assert!(kb.matches(Action::Quit, &KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!kb.matches(Action::RunCommand, &KeyCode::Char('c'), KeyModifiers::CONTROL));
    }
}
