use std::sync::OnceLock;

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::Action;
use crate::tmux::AlertFlags;

use super::app::{App, Mode, PreviewContent};
use super::prompt::{AddFolderStep, PromptKind};
use super::tree::{status_label, SessionRow, TreeRow};
use super::viewport::{visible_range, window_around};

const ACCENT: Color = Color::Cyan;
const DIM: Color = Color::DarkGray;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Panes
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    render_content(f, chunks[2], app);
    render_footer(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut meta = vec![
        format!("{} folders", app.config().folders.len()),
        format!("{} sessions", app.total_sessions()),
    ];
    if !app.filter().is_empty() {
        meta.push(format!("filter: {}", app.filter()));
    }

    let line = Line::from(vec![
        Span::styled(
            "▸ canopy",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ·  ", Style::default().fg(DIM)),
        Span::styled(meta.join(" · "), Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_content(f: &mut Frame, area: Rect, app: &App) {
    let dimmed = matches!(app.mode(), Mode::Prompt(_));

    if app.preview().is_some_and(|p| p.zoomed) {
        render_detail_pane(f, area, app, dimmed);
        return;
    }

    let direction = if area.width > 70 {
        Direction::Horizontal
    } else {
        Direction::Vertical
    };
    let constraints = if area.width > 70 {
        let left = (u32::from(area.width) * 30 / 100).clamp(30, 50) as u16;
        [Constraint::Length(left), Constraint::Min(20)]
    } else {
        [Constraint::Percentage(50), Constraint::Percentage(50)]
    };
    let panes = Layout::default()
        .direction(direction)
        .constraints(constraints)
        .split(area);

    render_tree_pane(f, panes[0], app, dimmed);
    render_detail_pane(f, panes[1], app, dimmed);
}

fn pane_block(title: impl Into<Line<'static>>, dimmed: bool) -> Block<'static> {
    let border = if dimmed { DIM } else { Color::Gray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

fn render_tree_pane(f: &mut Frame, area: Rect, app: &App, dimmed: bool) {
    let block = pane_block(" Sessions ", dimmed);
    let inner_width = area.width.saturating_sub(2) as usize;
    let body_height = area.height.saturating_sub(2) as usize;

    let rows = app.rows();
    if rows.is_empty() {
        let (title, hint) = empty_tree_hint(app);
        let text = vec![
            Line::from(Span::styled(title, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(hint, Style::default().fg(DIM))),
        ];
        f.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let selected = app.selection().index();
    // Keep two lines for the "more" markers when rows overflow
    let max = if rows.len() > body_height {
        body_height.saturating_sub(2).max(1)
    } else {
        body_height
    };
    let (start, end) = window_around(selected, rows.len(), max);
    let kill_target = match app.mode() {
        Mode::KillConfirm { target } => Some(target.as_str()),
        _ => None,
    };

    let mut lines = Vec::with_capacity(end - start + 2);
    if start > 0 {
        lines.push(more_marker(format!("  ↑ {start} more")));
    }
    for (i, row) in rows.iter().enumerate().take(end).skip(start) {
        let is_selected = i == selected;
        let line = match row {
            TreeRow::Folder { folder } => {
                let name = app
                    .config()
                    .folders
                    .get(*folder)
                    .map(|f| f.name.as_str())
                    .unwrap_or("?");
                let count = app.folder_sessions(*folder).len();
                let text = truncate_right(&format!("▸ {name} ({count})"), inner_width.saturating_sub(2));
                if is_selected {
                    selected_line(format!("▎{text}"), inner_width)
                } else {
                    Line::from(vec![
                        Span::raw(" "),
                        Span::styled(text, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                    ])
                }
            }
            TreeRow::Session(s) => {
                let last_in_folder = !matches!(rows.get(i + 1), Some(TreeRow::Session(_)));
                session_line(
                    s,
                    last_in_folder,
                    is_selected,
                    kill_target == Some(s.name.as_str()),
                    inner_width,
                )
            }
        };
        lines.push(line);
    }
    if end < rows.len() {
        lines.push(more_marker(format!("  ↓ {} more", rows.len() - end)));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn session_line(
    row: &SessionRow,
    last_in_folder: bool,
    is_selected: bool,
    is_kill_target: bool,
    width: usize,
) -> Line<'static> {
    let connector = if last_in_folder { "└" } else { "├" };
    let dot = if row.attached { "●" } else { "○" };
    let windows = format!("({}w)", row.windows);
    let alerts = alert_indicator(&row.alerts);
    let suffix = if alerts.is_empty() {
        String::new()
    } else {
        format!(" {alerts}")
    };

    let name_max = width
        .saturating_sub(7 + windows.width() + suffix.width())
        .max(6);
    let name = truncate_right(&row.leaf, name_max);

    if is_selected {
        return selected_line(format!("▎{connector} {dot} {name} {windows}{suffix}"), width);
    }
    if is_kill_target {
        let text = format!("  {connector} {dot} {name} {windows}{suffix}");
        return Line::from(Span::styled(
            pad_right(&text, width),
            Style::default().fg(Color::White).bg(Color::Red),
        ));
    }

    let dot_color = if row.attached { ACCENT } else { Color::Yellow };
    Line::from(vec![
        Span::styled(format!("  {connector} "), Style::default().fg(DIM)),
        Span::styled(dot, Style::default().fg(dot_color)),
        Span::raw(format!(" {name} ")),
        Span::styled(windows, Style::default().fg(DIM)),
        Span::styled(suffix, Style::default().fg(Color::Magenta)),
    ])
}

fn selected_line(text: String, width: usize) -> Line<'static> {
    Line::from(Span::styled(
        pad_right(&text, width),
        Style::default()
            .fg(Color::Black)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD),
    ))
}

fn more_marker(text: String) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(DIM)))
}

fn empty_tree_hint(app: &App) -> (String, String) {
    let keys = &app.config().keybindings;
    if app.config().folders.is_empty() {
        (
            "no folders configured".to_string(),
            format!("press {} to add a folder", keys.label(Action::AddFolder)),
        )
    } else if !app.filter().is_empty() {
        (
            "no matches for filter".to_string(),
            format!("press {} to change filter", keys.label(Action::Filter)),
        )
    } else {
        (
            "no sessions yet".to_string(),
            format!("press {} to create a session", keys.label(Action::NewSession)),
        )
    }
}

fn render_detail_pane(f: &mut Frame, area: Rect, app: &App, dimmed: bool) {
    let title = match app.preview() {
        Some(p) => Line::from(vec![
            Span::styled(" Preview ", Style::default().fg(ACCENT)),
            Span::styled(format!("{} ", p.target), Style::default().fg(DIM)),
        ]),
        None => Line::from(" Details "),
    };
    let mut block = pane_block(title, dimmed);

    let width = area.width.saturating_sub(2) as usize;
    let height = area.height.saturating_sub(2) as usize;
    let lines = detail_lines(app, width);

    let (start, end) = visible_range(app.selection().detail_scroll(), lines.len(), height);
    if start > 0 {
        block = block.title_top(Line::from(format!(" ↑ {start} above ")).right_aligned());
    }
    if end < lines.len() {
        block = block.title_bottom(Line::from(format!(" ↓ {} below ", lines.len() - end)).right_aligned());
    }

    let visible: Vec<Line> = lines.into_iter().skip(start).take(end - start).collect();
    f.render_widget(Paragraph::new(visible).block(block), area);
}

/// Number of detail lines for the current selection, used to bound scrolling
pub fn detail_line_count(app: &App) -> usize {
    detail_lines(app, (app.width() as usize).max(40)).len()
}

/// Content of the detail pane: a folder or session card, or the live preview
pub fn detail_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let width = width.max(10);

    if let Some(preview) = app.preview() {
        return preview_lines(&preview.content, width, app.content_height());
    }

    match app.selected_row() {
        Some(TreeRow::Folder { folder }) => folder_card(app, *folder, width),
        Some(TreeRow::Session(row)) => session_card(app, row, width),
        None => vec![hint_line("select a folder or session")],
    }
}

fn preview_lines(content: &PreviewContent, width: usize, height: usize) -> Vec<Line<'static>> {
    match content {
        PreviewContent::Loading => vec![hint_line("capturing pane…")],
        PreviewContent::Failed(e) => vec![Line::from(Span::styled(
            format!("error: {e}"),
            Style::default().fg(Color::Red),
        ))],
        PreviewContent::Ready(text) => {
            let clean = strip_ansi(text);
            let all: Vec<&str> = clean.trim_end_matches('\n').split('\n').collect();
            // Keep the tail so the prompt line stays visible
            let keep = height.saturating_sub(2).max(1);
            let skip = all.len().saturating_sub(keep);
            all.into_iter()
                .skip(skip)
                .map(|l| Line::from(truncate_right(l, width)))
                .collect()
        }
    }
}

fn folder_card(app: &App, index: usize, width: usize) -> Vec<Line<'static>> {
    let Some(folder) = app.config().folders.get(index) else {
        return Vec::new();
    };
    let sessions = app.folder_sessions(index);

    let mut lines = vec![
        title_line(&folder.name),
        meta_line(format!("{} · {} sessions", folder.namespace, sessions.len())),
        Line::default(),
        kv("Path", truncate_middle(&folder.path.to_string_lossy(), width.saturating_sub(6))),
    ];
    if let Some(cmd) = &folder.default_command {
        lines.push(kv("Command", truncate_right(cmd, width.saturating_sub(10))));
    }
    if let Some(cmd) = &folder.editor_command {
        lines.push(kv("Editor", truncate_right(cmd, width.saturating_sub(9))));
    }

    if sessions.is_empty() {
        lines.push(Line::default());
        lines.push(hint_line(&format!(
            "press {} to create a session",
            app.config().keybindings.label(Action::NewSession)
        )));
        return lines;
    }

    let running = sessions
        .iter()
        .filter(|s| !s.current_command.is_empty() && !is_shell_command(&s.current_command))
        .count();
    let bell = sessions.iter().filter(|s| s.alerts.bell).count();
    let activity = sessions.iter().filter(|s| s.alerts.activity).count();
    let silence = sessions.iter().filter(|s| s.alerts.silence).count();
    let summary: Vec<String> = [
        (running, "running"),
        (bell, "bell"),
        (activity, "activity"),
        (silence, "silence"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{n} {label}"))
    .collect();
    if !summary.is_empty() {
        lines.push(meta_line(summary.join(", ")));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Sessions", Style::default().fg(DIM))));
    for s in sessions {
        let (dot, color) = if s.attached {
            ("●", ACCENT)
        } else {
            ("○", Color::Yellow)
        };
        let mut spans = vec![
            Span::styled(dot, Style::default().fg(color)),
            Span::raw(format!(
                " {}",
                truncate_right(folder.leaf_name(&s.name), width.saturating_sub(4))
            )),
        ];
        if !s.current_command.is_empty() && !is_shell_command(&s.current_command) {
            spans.push(Span::styled(
                format!(" {}", truncate_right(&s.current_command, 12)),
                Style::default().fg(DIM),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn session_card(app: &App, row: &SessionRow, width: usize) -> Vec<Line<'static>> {
    let folder = app.config().folders.get(row.folder);
    let (dot, color) = if row.attached {
        ("●", ACCENT)
    } else {
        ("○", Color::Yellow)
    };

    let mut lines = vec![
        title_line(&truncate_right(&row.leaf, width)),
        Line::from(vec![
            Span::styled(dot, Style::default().fg(color)),
            Span::styled(
                format!(" {} · {} windows", status_label(row.attached), row.windows),
                Style::default().fg(DIM),
            ),
        ]),
        Line::default(),
        kv("Full name", truncate_right(&row.name, width.saturating_sub(12))),
    ];
    if let Some(folder) = folder {
        lines.push(kv("Folder", truncate_right(&folder.name, width.saturating_sub(9))));
        lines.push(kv(
            "Path",
            truncate_middle(&folder.path.to_string_lossy(), width.saturating_sub(6)),
        ));
    }
    if !row.current_path.is_empty() {
        lines.push(kv("Cwd", truncate_middle(&row.current_path, width.saturating_sub(5))));
    }
    if !row.current_command.is_empty() {
        lines.push(kv("Running", truncate_right(&row.current_command, width.saturating_sub(10))));
    }
    if let Some(title) = pane_display_title(&row.pane_title) {
        lines.push(kv("Title", truncate_right(title, width.saturating_sub(8))));
    }
    if row.last_activity > 0 {
        let elapsed = chrono::Duration::seconds(Utc::now().timestamp() - row.last_activity);
        lines.push(kv("Last active", format_duration(elapsed)));
    }
    if row.has_alerts {
        let mut parts: Vec<&str> = Vec::new();
        if row.alerts.bell {
            parts.push("bell (!)");
        }
        if row.alerts.activity {
            parts.push("activity (#)");
        }
        if row.alerts.silence {
            parts.push("silence (~)");
        }
        if parts.is_empty() {
            parts.push("alerts pending");
        }
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", alert_indicator(&row.alerts)),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw(parts.join(", ")),
        ]));
    }
    lines
}

fn title_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ))
}

fn meta_line(text: String) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(DIM)))
}

fn hint_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(DIM).add_modifier(Modifier::ITALIC),
    ))
}

fn kv(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(DIM)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let line = match app.mode() {
        Mode::Prompt(prompt) => {
            let title = format!("{} ", prompt.title());
            let enter = match prompt.kind {
                PromptKind::AddFolder { step } if step != AddFolderStep::EditorCommand => {
                    "enter next"
                }
                _ => "enter confirm",
            };
            let tab = if prompt.completes_paths() {
                " · tab complete"
            } else {
                ""
            };

            let mut spans = vec![Span::styled(
                title.clone(),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )];
            if prompt.input.is_empty() {
                spans.push(Span::styled(prompt.placeholder, Style::default().fg(DIM)));
            } else {
                spans.push(Span::raw(prompt.input.text().to_string()));
            }
            spans.push(Span::styled(
                format!("  {enter} · esc cancel{tab}"),
                Style::default().fg(DIM),
            ));
            if let Some(err) = app.error() {
                spans.push(Span::styled(
                    format!("  ✗ {err}"),
                    Style::default().fg(Color::Red),
                ));
            }

            let x = area.x as usize + title.width() + prompt.input.cursor_width();
            let x = x.min(area.right().saturating_sub(1) as usize) as u16;
            f.set_cursor_position((x, area.y));
            Line::from(spans)
        }
        Mode::KillConfirm { target } => Line::from(vec![
            Span::styled(
                format!("kill {target}?"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  y/enter confirm · n cancel", Style::default().fg(DIM)),
        ]),
        _ => {
            if let Some(err) = app.error() {
                Line::from(Span::styled(
                    format!("error: {err}"),
                    Style::default().fg(Color::Red),
                ))
            } else if let Some(status) = app.status() {
                Line::from(Span::styled(status.to_string(), Style::default().fg(Color::Green)))
            } else {
                help_bar(app)
            }
        }
    };

    f.render_widget(Paragraph::new(line), area);
}

fn help_bar(app: &App) -> Line<'static> {
    let keys = &app.config().keybindings;
    let key = |a: Action| keys.label(a);

    let mut bindings: Vec<(String, &str)> = if let Some(p) = app.preview() {
        vec![
            (key(Action::Attach), "attach"),
            (key(Action::Zoom), if p.zoomed { "zoom out" } else { "zoom in" }),
            ("esc".to_string(), "back"),
            (key(Action::Quit), "quit"),
        ]
    } else if app.selected_session().is_some() {
        vec![
            (key(Action::Attach), "attach"),
            (key(Action::Preview), "preview"),
            (key(Action::Editor), "editor"),
            (key(Action::NewSession), "new"),
            (key(Action::Rename), "rename"),
            (key(Action::Kill), "kill"),
            (key(Action::RunCommand), "cmd"),
            (key(Action::AddFolder), "add folder"),
        ]
    } else {
        vec![
            (key(Action::NewSession), "new session"),
            (key(Action::Editor), "editor"),
            (key(Action::AddFolder), "add folder"),
            (format!("{}/{}", key(Action::Down), key(Action::Up)), "navigate"),
        ]
    };

    if app.preview().is_none() {
        if !app.filter().is_empty() {
            bindings.push(("esc".to_string(), "clear filter"));
        }
        bindings.push((key(Action::Filter), "filter"));
        bindings.push((key(Action::Refresh), "refresh"));
        bindings.push((key(Action::Quit), "quit"));
    }

    let mut spans = Vec::with_capacity(bindings.len() * 3);
    for (i, (k, desc)) in bindings.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", Style::default().fg(DIM)));
        }
        spans.push(Span::styled(k, Style::default().fg(ACCENT)));
        spans.push(Span::styled(format!(" {desc}"), Style::default().fg(Color::Gray)));
    }
    Line::from(spans)
}

/// `!`, `#`, `~` for bell, activity, silence
pub fn alert_indicator(flags: &AlertFlags) -> String {
    let mut s = String::new();
    if flags.bell {
        s.push('!');
    }
    if flags.activity {
        s.push('#');
    }
    if flags.silence {
        s.push('~');
    }
    s
}

/// Pane titles worth showing: paths, phrases, or file names. Bare hostnames
/// and shell defaults are hidden.
pub fn pane_display_title(title: &str) -> Option<&str> {
    let t = title.trim();
    if t.is_empty() {
        return None;
    }
    if t.contains('/') || t.contains(' ') {
        return Some(t);
    }
    match t.rfind('.') {
        Some(dot) if dot > 0 && dot < t.len() - 1 => Some(t),
        _ => None,
    }
}

pub fn is_shell_command(cmd: &str) -> bool {
    matches!(
        cmd.to_lowercase().as_str(),
        "zsh" | "bash" | "fish" | "sh" | "dash" | "ksh"
    )
}

pub fn format_duration(d: chrono::Duration) -> String {
    let secs = d.num_seconds().max(0);
    match secs {
        s if s < 30 => "just now".to_string(),
        s if s < 90 => "1 min ago".to_string(),
        s if s < 3600 => format!("{} mins ago", s / 60),
        s if s < 7200 => "1 hour ago".to_string(),
        s if s < 86400 => format!("{} hours ago", s / 3600),
        s => match s / 86400 {
            1 => "1 day ago".to_string(),
            days => format!("{days} days ago"),
        },
    }
}

/// Remove terminal escape sequences and control characters from captured pane text
pub fn strip_ansi(s: &str) -> String {
    static ESCAPES: OnceLock<Option<Regex>> = OnceLock::new();
    let re = ESCAPES.get_or_init(|| {
        Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]").ok()
    });
    let stripped = match re {
        Some(re) => re.replace_all(s, ""),
        None => s.into(),
    };
    stripped
        .chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            '\n' => Some('\n'),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Cut to `max` columns, ending with `…` when shortened
pub fn truncate_right(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.width() <= max {
        return s.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max.saturating_sub(1) {
            break;
        }
        out.push(ch);
        used += w;
    }
    if max > 1 {
        out.push('…');
    }
    out
}

/// Cut the middle out of `s` so it fits in `max` columns
pub fn truncate_middle(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return truncate_right(s, max);
    }

    let chars: Vec<char> = s.chars().collect();
    let head_budget = (max - 1) / 2;
    let tail_budget = max - 1 - head_budget;

    let mut head = String::new();
    let mut used = 0;
    for &ch in &chars {
        let w = ch.width().unwrap_or(0);
        if used + w > head_budget {
            break;
        }
        head.push(ch);
        used += w;
    }

    let mut tail: Vec<char> = Vec::new();
    let mut used = 0;
    for &ch in chars.iter().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > tail_budget {
            break;
        }
        tail.push(ch);
        used += w;
    }
    tail.reverse();

    format!("{head}…{}", tail.into_iter().collect::<String>())
}

fn pad_right(s: &str, width: usize) -> String {
    let w = s.width();
    if w >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - w))
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::config::{Config, Folder};
    use crate::tmux::Session;
    use crate::ui::tree::SessionMap;
    use crate::ui::Message;

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app_with_sessions() -> App {
        let config = Config {
            folders: vec![Folder::new("api", "/tmp/api").with_default_command("make dev")],
            ..Default::default()
        };
        let mut app = App::new(config);
        let mut sessions = SessionMap::new();
        sessions.insert(
            0,
            vec![
                Session {
                    attached: true,
                    current_command: "cargo".into(),
                    alerts: AlertFlags {
                        bell: true,
                        ..Default::default()
                    },
                    has_alerts: true,
                    ..Session::new("api/one")
                },
                Session::new("api/two"),
            ],
        );
        app.update(Message::SessionsLoaded(Ok(sessions)));
        app
    }

    #[test]
    fn test_format_duration() {
        let cases = [
            (-1, "just now"),
            (29, "just now"),
            (89, "1 min ago"),
            (600, "10 mins ago"),
            (90 * 60, "1 hour ago"),
            (5 * 3600, "5 hours ago"),
            (25 * 3600, "1 day ago"),
            (49 * 3600, "2 days ago"),
        ];
        for (secs, want) in cases {
            assert_eq!(format_duration(chrono::Duration::seconds(secs)), want, "{secs}s");
        }
    }

    #[test]
    fn test_pane_display_title() {
        assert_eq!(pane_display_title(""), None);
        assert_eq!(pane_display_title("my-host"), None);
        assert_eq!(pane_display_title("/Users/me/project"), Some("/Users/me/project"));
        assert_eq!(pane_display_title("Claude Code"), Some("Claude Code"));
        assert_eq!(pane_display_title("main.go"), Some("main.go"));
        assert_eq!(pane_display_title(".hidden"), None);
    }

    #[test]
    fn test_truncation() {
        assert_eq!(truncate_right("hello", 10), "hello");
        assert_eq!(truncate_right("hello world", 6), "hello…");
        assert_eq!(truncate_right("你好世界", 5), "你好…");
        assert_eq!(truncate_right("abc", 0), "");
        assert_eq!(truncate_middle("/very/long/path/to/project", 11), "/very…oject");
        assert_eq!(truncate_middle("short", 10), "short");
    }

    #[test]
    fn test_strip_ansi() {
        let input = "\x1b[31mred\x1b[0m \x1b[2Jclear\x1b]0;title\x07\tend\r";
        assert_eq!(strip_ansi(input), "red clear end");
    }

    #[test]
    fn test_shell_commands() {
        assert!(is_shell_command("zsh"));
        assert!(is_shell_command("BASH"));
        assert!(!is_shell_command("cargo"));
    }

    #[test]
    fn test_folder_card_summary() {
        let app = app_with_sessions();
        let text: Vec<String> = detail_lines(&app, 60)
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(text[0], "api");
        assert_eq!(text[1], "api · 2 sessions");
        assert!(text.contains(&"Path: /tmp/api".to_string()));
        assert!(text.contains(&"Command: make dev".to_string()));
        assert!(text.contains(&"1 running, 1 bell".to_string()));
        assert!(text.contains(&"● one cargo".to_string()));
        assert!(text.contains(&"○ two".to_string()));
    }

    #[test]
    fn test_draw_tree_and_footer() {
        let app = app_with_sessions();
        let screen = screen(&app, 100, 20);
        assert!(screen.contains("▸ canopy"));
        assert!(screen.contains("1 folders · 2 sessions"));
        assert!(screen.contains("▸ api (2)"));
        assert!(screen.contains("├ ● one (1w) !"));
        assert!(screen.contains("└ ○ two (1w)"));
        assert!(screen.contains("new session"));
    }

    #[test]
    fn test_draw_empty_state() {
        let app = App::new(Config::default());
        let screen = screen(&app, 80, 12);
        assert!(screen.contains("no folders configured"));
        assert!(screen.contains("press A to add a folder"));
    }
}
