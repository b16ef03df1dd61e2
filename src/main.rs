//! Stackplan CLI - environment-driven infrastructure planner
//!
//! Usage: stackplan <COMMAND>
//!
//! Commands:
//!   environments  List valid environments
//!   plan          Plan an environment without creating anything
//!   deploy        Plan, preflight and apply an environment
//!   exports       List published stack exports
//!   secrets       Show where an environment's secrets come from

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use stackplan::presentation::{Cli, Commands};
use stackplan::StackplanError;

use commands::Session;

/// Overrides the `-v` derived log filter
const LOG_ENV: &str = "STACKPLAN_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        let (category, code) = match err.downcast_ref::<StackplanError>() {
            Some(e) => (e.category().as_str(), e.category().exit_code()),
            None => ("error", 1),
        };
        eprintln!("✗ Error [{}]: {:#}", category, err);
        std::process::exit(code);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let session = Session::from_cli(&cli)?;

    match &cli.command {
        Commands::Environments => commands::environments::cmd_environments(&session),
        Commands::Plan { target, diff, save } => {
            commands::plan::cmd_plan(&session, target, *diff, *save)
        }
        Commands::Deploy { target, dry_run } => {
            commands::deploy::cmd_deploy(&session, target, *dry_run)
        }
        Commands::Exports { stack } => commands::exports::cmd_exports(&session, stack.as_deref()),
        Commands::Secrets {
            environment,
            secrets_dir,
        } => commands::secrets::cmd_secrets(&session, environment, secrets_dir.as_deref()),
    }
}
