use std::collections::HashMap;

/// Alert flags reported by tmux. Bell `!`, activity `#`, silence `~`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFlags {
    pub bell: bool,
    pub activity: bool,
    pub silence: bool,
}

impl AlertFlags {
    pub fn any(&self) -> bool {
        self.bell || self.activity || self.silence
    }

    fn parse(s: &str) -> Self {
        Self {
            bell: s.contains('!'),
            activity: s.contains('#'),
            silence: s.contains('~'),
        }
    }

    fn merge(&mut self, other: AlertFlags) {
        self.bell |= other.bell;
        self.activity |= other.activity;
        self.silence |= other.silence;
    }
}

/// A tmux session, optionally enriched with its active pane's state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub windows: usize,
    pub attached: bool,
    pub has_alerts: bool,
    pub alerts: AlertFlags,
    /// Unix seconds; 0 when unknown
    pub last_activity: i64,
    pub current_command: String,
    pub pane_title: String,
    pub current_path: String,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            windows: 1,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneInfo {
    pub session_name: String,
    pub window_index: u32,
    pub command: String,
    pub pane_active: bool,
    pub window_active: bool,
    pub alerts: AlertFlags,
    pub pane_title: String,
    pub current_path: String,
}

/// Per-session state folded from all of its panes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivePaneState {
    pub command: String,
    pub pane_title: String,
    pub current_path: String,
    pub alerts: AlertFlags,
}

pub const SESSION_FORMAT: &str = "#{session_name}:#{session_windows}:#{?session_attached,attached,detached}:#{session_alerts}:#{session_activity}";

pub const PANE_FORMAT: &str = "#{session_name}\t#{window_index}\t#{pane_current_command}\t#{?pane_active,1,0}\t#{?window_active,1,0}\t#{window_activity_flag}\t#{window_bell_flag}\t#{window_silence_flag}\t#{pane_title}\t#{pane_current_path}";

/// Parse `list-sessions` output in [`SESSION_FORMAT`]. Malformed lines are skipped.
pub fn parse_sessions(output: &str) -> Vec<Session> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.splitn(5, ':').collect();
            if parts.len() < 3 {
                return None;
            }

            let mut s = Session {
                name: parts[0].to_string(),
                windows: parts[1].parse().unwrap_or(0),
                attached: parts[2] == "attached",
                ..Default::default()
            };
            if let Some(alerts) = parts.get(3).map(|a| a.trim()) {
                s.has_alerts = !alerts.is_empty();
                s.alerts = AlertFlags::parse(alerts);
            }
            if let Some(ts) = parts.get(4).and_then(|t| t.trim().parse().ok()) {
                s.last_activity = ts;
            }
            Some(s)
        })
        .collect()
}

/// Parse `list-panes -a` output in [`PANE_FORMAT`].
pub fn parse_panes(output: &str) -> Vec<PaneInfo> {
    output
        .lines()
        .map(|l| l.trim_matches(|c| c == '\r' || c == '\n' || c == ' '))
        .filter(|l| !l.is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.splitn(10, '\t').collect();
            if parts.len() < 5 {
                return None;
            }

            let flag = |i: usize| parts.get(i).is_some_and(|v| *v == "1");
            let text = |i: usize| parts.get(i).map(|v| v.to_string()).unwrap_or_default();
            Some(PaneInfo {
                session_name: parts[0].to_string(),
                window_index: parts[1].parse().unwrap_or(0),
                command: parts[2].to_string(),
                pane_active: parts[3] == "1",
                window_active: parts[4] == "1",
                alerts: AlertFlags {
                    activity: flag(5),
                    bell: flag(6),
                    silence: flag(7),
                },
                pane_title: text(8),
                current_path: text(9),
            })
        })
        .collect()
}

/// Fold panes into per-session state.
///
/// Command, title and path come only from the pane that is active in the
/// active window. Alert flags are the union over every pane of the session,
/// in any listing order. A session whose active pane is never listed keeps
/// empty content fields.
pub fn active_pane_states(panes: &[PaneInfo]) -> HashMap<String, ActivePaneState> {
    let mut result: HashMap<String, ActivePaneState> = HashMap::new();
    for p in panes {
        let state = result.entry(p.session_name.clone()).or_default();
        if p.window_active && p.pane_active {
            state.command = p.command.clone();
            state.pane_title = strip_title_branding(p.pane_title.trim()).to_string();
            state.current_path = p.current_path.clone();
        }
        state.alerts.merge(p.alerts);
    }
    result
}

/// Drop app branding prefixes such as `✳ ` from a pane title
pub fn strip_title_branding(title: &str) -> &str {
    ["✳ ", "* "]
        .iter()
        .find_map(|prefix| title.strip_prefix(prefix))
        .unwrap_or(title)
}

/// Copy active-pane state onto sessions. Flags from panes are added to the
/// session's own alerts.
pub fn enrich(sessions: &mut [Session], states: &HashMap<String, ActivePaneState>) {
    for s in sessions.iter_mut() {
        let Some(state) = states.get(&s.name) else {
            continue;
        };
        s.current_command = state.command.clone();
        s.pane_title = state.pane_title.clone();
        s.current_path = state.current_path.clone();
        s.alerts.merge(state.alerts);
        s.has_alerts = s.has_alerts || s.alerts.any();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sessions() {
        let out = "api/one:2:attached:!#:1700000000\n\
                   web/two:1:detached::\n\
                   \n\
                   broken\n\
                   legacy:x:detached\n";
        let sessions = parse_sessions(out);
        assert_eq!(sessions.len(), 3);

        let one = &sessions[0];
        assert_eq!(one.name, "api/one");
        assert_eq!(one.windows, 2);
        assert!(one.attached);
        assert!(one.has_alerts);
        assert!(one.alerts.bell && one.alerts.activity && !one.alerts.silence);
        assert_eq!(one.last_activity, 1_700_000_000);

        let two = &sessions[1];
        assert!(!two.attached);
        assert!(!two.has_alerts);
        assert_eq!(two.last_activity, 0);

        assert_eq!(sessions[2].name, "legacy");
        assert_eq!(sessions[2].windows, 0);
    }

    #[test]
    fn test_parse_panes() {
        let out = "api/one\t0\tzsh\t1\t1\t0\t1\t0\t✳ Claude\t/tmp/api\n\
                   api/one\t1\tvim\t0\t0\n\
                   short\t1\n";
        let panes = parse_panes(out);
        assert_eq!(panes.len(), 2);

        assert_eq!(panes[0].command, "zsh");
        assert!(panes[0].pane_active && panes[0].window_active);
        assert!(panes[0].alerts.bell && !panes[0].alerts.activity);
        assert_eq!(panes[0].pane_title, "✳ Claude");
        assert_eq!(panes[0].current_path, "/tmp/api");

        assert_eq!(panes[1].window_index, 1);
        assert_eq!(panes[1].pane_title, "");
    }

    #[test]
    fn test_parse_panes_keeps_empty_title_field() {
        let out = "api/one\t0\tzsh\t1\t1\t0\t0\t0\t\t/tmp/api\n";
        let panes = parse_panes(out);
        assert_eq!(panes[0].pane_title, "");
        assert_eq!(panes[0].current_path, "/tmp/api");
    }

    #[test]
    fn test_strip_title_branding() {
        assert_eq!(strip_title_branding("✳ Claude Code"), "Claude Code");
        assert_eq!(strip_title_branding("* Claude"), "Claude");
        assert_eq!(strip_title_branding("plain"), "plain");
    }

    #[test]
    fn test_enrichment_aggregates_flags() {
        let panes = vec![
            PaneInfo {
                session_name: "api/one".into(),
                window_index: 0,
                command: "go".into(),
                pane_active: true,
                window_active: true,
                pane_title: "* Claude".into(),
                current_path: "/tmp/api".into(),
                ..Default::default()
            },
            PaneInfo {
                session_name: "api/one".into(),
                window_index: 1,
                command: "zsh".into(),
                pane_active: true,
                window_active: false,
                alerts: AlertFlags {
                    bell: true,
                    activity: true,
                    silence: false,
                },
                ..Default::default()
            },
        ];

        let states = active_pane_states(&panes);
        let state = &states["api/one"];
        assert_eq!(state.command, "go");
        assert_eq!(state.pane_title, "Claude");
        assert_eq!(state.current_path, "/tmp/api");
        assert!(state.alerts.bell && state.alerts.activity && !state.alerts.silence);

        let mut sessions = vec![Session::new("api/one"), Session::new("api/two")];
        enrich(&mut sessions, &states);
        assert_eq!(sessions[0].current_command, "go");
        assert!(sessions[0].has_alerts);
        assert!(sessions[0].alerts.bell);
        assert_eq!(sessions[1].current_command, "");
        assert!(!sessions[1].has_alerts);
    }

    #[test]
    fn test_flags_from_panes_listed_before_active() {
        let panes = vec![
            PaneInfo {
                session_name: "api/x".into(),
                window_index: 0,
                command: "zsh".into(),
                pane_active: true,
                window_active: false,
                alerts: AlertFlags {
                    bell: true,
                    ..Default::default()
                },
                ..Default::default()
            },
            PaneInfo {
                session_name: "api/x".into(),
                window_index: 1,
                command: "go".into(),
                pane_active: true,
                window_active: true,
                ..Default::default()
            },
        ];
        let states = active_pane_states(&panes);
        let state = &states["api/x"];
        assert_eq!(state.command, "go");
        assert!(state.alerts.bell);
    }

    #[test]
    fn test_session_without_active_pane_keeps_flags_only() {
        let panes = vec![PaneInfo {
            session_name: "api/y".into(),
            command: "vim".into(),
            pane_active: false,
            window_active: true,
            alerts: AlertFlags {
                silence: true,
                ..Default::default()
            },
            ..Default::default()
        }];
        let states = active_pane_states(&panes);
        let state = &states["api/y"];
        assert_eq!(state.command, "");
        assert!(state.alerts.silence);

        let mut sessions = vec![Session::new("api/y")];
        enrich(&mut sessions, &states);
        assert!(sessions[0].has_alerts);
        assert_eq!(sessions[0].current_command, "");
    }
}
