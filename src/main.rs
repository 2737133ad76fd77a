//! mercado-e2e - End-to-end scenario runner for the mercado API
//!
//! Runs ordered groups of dependent HTTP steps against a deployed API and
//! exits non-zero when any step fails.

use clap::Parser;
use mercado_e2e::commands::Commands;
use mercado_e2e::{cli, common::logging};

#[derive(Parser)]
#[command(name = "mercado-e2e", about = "End-to-end scenario runner for the mercado API")]
#[command(version, long_about = None)]
struct Cli {
    /// Verbose output (captured values, debug logs)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose);

    if let Err(e) = cli::dispatch(cli.command, cli.verbose).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
