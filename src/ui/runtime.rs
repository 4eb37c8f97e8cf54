use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::tmux::SessionGateway;

use super::{ActionOutcome, App, Command, Message, Scheduler};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the session browser until the user quits
pub async fn run(config: Config, config_path: PathBuf, gateway: Arc<dyn SessionGateway>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.clear()?;

    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(gateway, config_path, tx);
    let mut app = App::new(config);

    let result = event_loop(&mut terminal, &mut app, &scheduler, rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Term,
    app: &mut App,
    scheduler: &Scheduler,
    mut rx: UnboundedReceiver<Message>,
) -> Result<()> {
    let mut queue: VecDeque<Command> = app.init().into();

    loop {
        while let Some(command) = queue.pop_front() {
            if command.is_foreground() {
                let message = run_foreground(terminal, scheduler, command).await?;
                queue.extend(app.update(message));
            } else {
                scheduler.dispatch(command);
            }
        }

        terminal.draw(|f| {
            let area = f.area();
            app.set_size(area.width, area.height);
            super::render::draw(f, app);
        })?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    queue.extend(app.handle_key(key.code, key.modifiers));
                }
                CrosstermEvent::Resize(width, height) => app.set_size(width, height),
                _ => {}
            }
        }

        while let Ok(message) = rx.try_recv() {
            queue.extend(app.update(message));
        }

        if app.should_quit() {
            info!("quit requested");
            break;
        }
    }

    Ok(())
}

/// Hand the terminal to a child process and turn its exit into a message
async fn run_foreground(terminal: &mut Term, scheduler: &Scheduler, command: Command) -> Result<Message> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let message = match command {
        Command::Attach { target } => {
            info!(session = %target, "attaching");
            let cmd = scheduler.gateway().attach_command(&target);
            Message::Attached(wait_child(cmd, "attach").await)
        }
        Command::OpenEditor { command, dir } => {
            info!(%command, dir = %dir.display(), "opening editor");
            let result = wait_child(editor_command(&command, &dir), "editor")
                .await
                .map(|()| ActionOutcome::status("editor closed"));
            Message::ActionFinished(result)
        }
        other => {
            warn!(command = ?other, "not a foreground command");
            Message::ActionFinished(Err(Error::Other(format!("cannot run {other:?} in foreground"))))
        }
    };

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;

    Ok(message)
}

fn editor_command(command: &str, dir: &Path) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-lc").arg(command).current_dir(dir);
    cmd
}

async fn wait_child(mut cmd: tokio::process::Command, what: &str) -> Result<()> {
    let status = cmd
        .status()
        .await
        .map_err(|e| Error::Other(format!("{what}: {e}")))?;
    debug!(what, ?status, "child exited");
    if status.success() {
        Ok(())
    } else {
        Err(Error::Other(format!("{what} exited with {status}")))
    }
}
