mod cli;
mod components;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use keel_core::kernel::constants::{APP_NAME, APP_VERSION};
use log::debug;

use crate::cli::SystemArgs;

/// Keel: declarative component lifecycle orchestration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Print "pong" and exit
    #[arg(long)]
    ping: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a configuration and print its start order
    Check(SystemArgs),
    /// Start a system and stop it on SIGINT/SIGTERM
    Run(SystemArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }
    debug!("{} v{}", APP_NAME, APP_VERSION);

    let result = match &args.command {
        Some(Commands::Check(system)) => cli::check(system),
        Some(Commands::Run(system)) => cli::run(system).await,
        None => {
            println!("No command specified. Run `keel --help` for usage.");
            return ExitCode::SUCCESS;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
