//! Maintenance commands - find, flush, gc, freeze, status

use crate::cli::args::{BackendArgs, FindArgs, FlushArgs, OutputFormat, StatusArgs};
use crate::cli::commands::open_backend;
use crate::config::Config;
use crate::error::BoreasResult;
use console::style;
use std::collections::BTreeSet;

/// Execute the find command
pub fn find(args: FindArgs, config: &Config) -> BoreasResult<()> {
    let backend = open_backend(&args.backend, config)?;
    let identifiers = backend.find_identifiers_by_tag(&args.tag)?;

    match args.format {
        OutputFormat::Table => print_find_table(&args.tag, &identifiers),
        OutputFormat::Json => print_json(&identifiers)?,
        OutputFormat::Plain => {
            for identifier in &identifiers {
                println!("{identifier}");
            }
        }
    }
    Ok(())
}

fn print_find_table(tag: &str, identifiers: &BTreeSet<String>) {
    if identifiers.is_empty() {
        println!("No entries carry tag \"{tag}\".");
        return;
    }
    println!("{:<40}", "IDENTIFIER");
    println!("{}", "-".repeat(40));
    for identifier in identifiers {
        println!("{identifier:<40}");
    }
    println!();
    println!("Total: {} entry(ies) tagged \"{tag}\"", identifiers.len());
}

fn print_json(identifiers: &BTreeSet<String>) -> BoreasResult<()> {
    println!("{}", serde_json::to_string_pretty(identifiers)?);
    Ok(())
}

/// Execute the flush command
pub fn flush(args: FlushArgs, config: &Config) -> BoreasResult<()> {
    let mut backend = open_backend(&args.backend, config)?;

    match args.tag {
        Some(tag) => {
            backend.flush_by_tag(&tag)?;
            println!(
                "{} Flushed entries tagged \"{}\" from cache \"{}\"",
                style("✓").green(),
                tag,
                args.backend.cache
            );
        }
        None => {
            backend.flush()?;
            println!(
                "{} Flushed cache \"{}\"",
                style("✓").green(),
                args.backend.cache
            );
        }
    }
    Ok(())
}

/// Execute the gc command
pub fn gc(args: BackendArgs, config: &Config) -> BoreasResult<()> {
    let backend = open_backend(&args, config)?;

    if backend.is_frozen() {
        println!("Cache \"{}\" is frozen; nothing to collect.", args.cache);
        return Ok(());
    }

    let before = backend.entry_count()?;
    backend.collect_garbage()?;
    let after = backend.entry_count()?;

    println!(
        "{} Collected {} expired entry(ies), {} remaining",
        style("✓").green(),
        before.saturating_sub(after),
        after
    );
    Ok(())
}

/// Execute the freeze command
pub fn freeze(args: BackendArgs, config: &Config) -> BoreasResult<()> {
    let mut backend = open_backend(&args, config)?;
    backend.freeze()?;

    println!(
        "{} Froze cache \"{}\" with {} entry(ies)",
        style("✓").green(),
        args.cache,
        backend.entry_count()?
    );
    Ok(())
}

/// Execute the status command
pub fn status(args: StatusArgs, config: &Config) -> BoreasResult<()> {
    let backend = open_backend(&args.backend, config)?;
    let entries = backend.entry_count()?;
    let state = if backend.is_frozen() { "frozen" } else { "live" };

    match args.format {
        OutputFormat::Json => {
            #[derive(serde::Serialize)]
            struct StatusJson<'a> {
                cache: &'a str,
                directory: String,
                state: &'a str,
                entries: usize,
            }
            let status = StatusJson {
                cache: backend.cache_identifier(),
                directory: backend.cache_directory().display().to_string(),
                state,
                entries,
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Table | OutputFormat::Plain => {
            let state_display = if backend.is_frozen() {
                style("frozen").cyan().to_string()
            } else {
                style("live").green().to_string()
            };
            println!("Cache:     {}", backend.cache_identifier());
            println!("Directory: {}", backend.cache_directory().display());
            println!("State:     {state_display}");
            println!("Entries:   {entries}");
        }
    }
    Ok(())
}
