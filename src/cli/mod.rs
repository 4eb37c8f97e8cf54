mod args;
mod commands;

pub use args::Args;
pub use commands::{init_logging, run_cli};
