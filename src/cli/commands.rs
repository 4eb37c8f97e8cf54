use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Args;
use crate::config::{absolutize, ensure_template, Config};
use crate::tmux::{SessionGateway, TmuxManager};

/// Route tracing output to `canopy.log` next to the config file, since the
/// terminal belongs to the UI. Falls back to stderr.
pub fn init_logging(config_path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_path = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("canopy.log");

    let file = log_path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| OpenOptions::new().create(true).append(true).open(&log_path));

    match file {
        Ok(file) => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(_) => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}

pub async fn run_cli(args: Args) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("could not read current directory")?;
    let config_path = absolutize(&args.config_path(), &cwd).context("invalid config path")?;

    if ensure_template(&config_path)
        .await
        .context("could not initialize config template")?
    {
        info!(path = %config_path.display(), "wrote config template");
    }

    let config = Config::load(&config_path).await.context("config error")?;
    info!(
        path = %config_path.display(),
        folders = config.folders.len(),
        "config loaded"
    );

    let gateway: Arc<dyn SessionGateway> =
        Arc::new(TmuxManager::with_socket(config.tmux_socket.clone()));

    crate::ui::run(config, config_path, gateway)
        .await
        .context("terminal error")?;
    Ok(())
}
