//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::BoreasResult;
use console::style;

/// Execute the config command
pub fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> BoreasResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config),
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force)?,
    }

    Ok(())
}

fn show_config(config: &Config) {
    let toml =
        toml::to_string_pretty(config).unwrap_or_else(|_| "Error serializing config".to_string());
    println!("{}", toml);
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

fn init_config(manager: &ConfigManager, force: bool) -> BoreasResult<()> {
    if manager.path().exists() && !force {
        println!(
            "Configuration already exists at {} (use --force to overwrite)",
            manager.path().display()
        );
        return Ok(());
    }

    manager.save(&Config::default())?;
    println!(
        "{} Wrote default configuration to {}",
        style("✓").green(),
        manager.path().display()
    );
    Ok(())
}
