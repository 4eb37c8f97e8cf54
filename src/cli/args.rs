use std::path::PathBuf;

use clap::Parser;

use crate::config::default_config_path;

#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(version, about = "Browse and manage tmux sessions grouped by project folder", long_about = None)]
pub struct Args {
    /// Path to the config file
    #[arg(short, long, env = "CANOPY_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Explicit `--config`, else `~/.config/canopy/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}
