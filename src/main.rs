use canopy::cli::{init_logging, run_cli, Args};
use clap::Parser;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.config_path());

    if let Err(e) = run_cli(args).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
