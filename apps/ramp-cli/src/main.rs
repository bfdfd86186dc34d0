//! ramp CLI - Command-line interface for the Ramp developer API
//!
//! This CLI lets operators:
//! - List users, following pagination
//! - Invite users and follow the resulting deferred task
//! - Check live API responses against the documented response shapes

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod output;

use config::GlobalArgs;
use error::CliResult;

/// ramp CLI - Ramp users management
#[derive(Parser)]
#[command(name = "ramp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    Users(commands::users::UsersArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.global.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "ramp_client=debug,ramp_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Users(args) => commands::users::execute(args, &cli.global).await,
    }
}
