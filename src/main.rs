//! Mushaf - CLI entry point that dispatches to subcommands

use clap::Parser;
use console::style;
use mushaf::cli::{commands, Cli, Commands};
use mushaf::config::{Config, ConfigManager};
use mushaf::error::MushafResult;
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

async fn run() -> MushafResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions(args) = cli.command {
        return commands::completions(args);
    }

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config at {}", manager.path().display());

    if console::user_attended() {
        mushaf::ui::init_theme();
    }

    match cli.command {
        Commands::Completions(_) => Ok(()),
        Commands::Console(args) => commands::console(args, &config).await,
        Commands::Token(args) => commands::token(args, &config),
        Commands::Paginate(args) => commands::paginate(args, &config),
        Commands::Split(args) => commands::split(args, &config).await,
        Commands::Catalog(args) => commands::catalog(args, &config).await,
        Commands::Status(args) => commands::status(args, &config).await,
        Commands::Config(args) => commands::config(args, &config, &manager).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `general.verbose` counts as one `-v`
fn init_logging(verbose: u8, config: &Config) {
    let level = verbose.max(u8::from(config.general.verbose));
    let filter = match level {
        0 => EnvFilter::new("mushaf=warn"),
        1 => EnvFilter::new("mushaf=info"),
        _ => EnvFilter::new("mushaf=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
