//! MH Procurement command line
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use mh_procurement::cli::{commands, Cli, Commands};
use mh_procurement::config::{Config, ConfigManager};
use mh_procurement::error::ProcurementResult;
use mh_procurement::ui;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ProcurementResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    ui::init_theme();
    debug!("Using config {}", config_manager.path().display());

    ConfigManager::ensure_state_dirs(&config).await?;

    match cli.command {
        Commands::Cart(args) => commands::cart(args, &config).await,
        Commands::Catalog(args) => commands::catalog(args, &config).await,
        Commands::Contact(args) => commands::contact(args, &config).await,
        Commands::Export(args) => commands::export(args, &config).await,
        Commands::Offline(args) => commands::offline(args, &config).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `general.verbose` raises the floor to info
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose {
        0 if config.general.verbose => "info",
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::new(format!("mh_procurement={}", level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
