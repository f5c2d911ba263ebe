//! Boreas - file-backed cache store
//!
//! CLI entry point that dispatches to subcommands.

use boreas::cli::{commands, Cli, Commands};
use boreas::config::ConfigManager;
use boreas::error::BoreasResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
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

fn run() -> BoreasResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions { shell } = cli.command {
        commands::completions(shell);
        return Ok(());
    }

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load()?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("boreas=warn"),
        1 => EnvFilter::new("boreas=info"),
        _ => EnvFilter::new("boreas=debug"),
    };
    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .init();
    }

    match cli.command {
        Commands::Completions { .. } => unreachable!("Completions handled above"),
        Commands::Set(args) => commands::set(args, &config),
        Commands::Get(args) => commands::get(args, &config),
        Commands::Has(args) => commands::has(args, &config),
        Commands::Remove(args) => commands::remove(args, &config),
        Commands::Find(args) => commands::find(args, &config),
        Commands::Flush(args) => commands::flush(args, &config),
        Commands::Gc(args) => commands::gc(args, &config),
        Commands::Freeze(args) => commands::freeze(args, &config),
        Commands::Status(args) => commands::status(args, &config),
        Commands::Config(args) => commands::config(args, &config, &config_manager),
    }
}
