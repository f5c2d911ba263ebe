//! Entry commands - set, get, has, remove

use crate::cli::args::{EntryArgs, GetArgs, SetArgs};
use crate::cli::commands::open_backend;
use crate::config::Config;
use crate::error::{BoreasError, BoreasResult};
use console::style;
use std::fs;
use std::io::{self, Read, Write};

/// Execute the set command
pub fn set(args: SetArgs, config: &Config) -> BoreasResult<()> {
    let backend = open_backend(&args.backend, config)?;
    let payload = read_payload(&args)?;

    backend.set(&args.identifier, &payload, &args.tags, args.lifetime)?;
    println!(
        "{} Stored {} ({} bytes) in cache \"{}\"",
        style("✓").green(),
        args.identifier,
        payload.len(),
        args.backend.cache
    );
    Ok(())
}

/// Execute the get command
pub fn get(args: GetArgs, config: &Config) -> BoreasResult<()> {
    let backend = open_backend(&args.backend, config)?;

    match backend.get(&args.identifier)? {
        Some(payload) => write_payload(&args, &payload),
        None => {
            eprintln!(
                "{} Entry not found: {}",
                style("✗").red(),
                args.identifier
            );
            Ok(())
        }
    }
}

/// Execute the has command
pub fn has(args: EntryArgs, config: &Config) -> BoreasResult<()> {
    let backend = open_backend(&args.backend, config)?;
    println!("{}", backend.has(&args.identifier)?);
    Ok(())
}

/// Execute the remove command
pub fn remove(args: EntryArgs, config: &Config) -> BoreasResult<()> {
    let backend = open_backend(&args.backend, config)?;

    if backend.remove(&args.identifier)? {
        println!("{} Removed {}", style("✓").green(), args.identifier);
    } else {
        println!("Nothing to remove: {}", args.identifier);
    }
    Ok(())
}

fn read_payload(args: &SetArgs) -> BoreasResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.clone().into_bytes());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|e| BoreasError::io(format!("reading payload from {}", path.display()), e));
    }
    let mut payload = Vec::new();
    io::stdin()
        .read_to_end(&mut payload)
        .map_err(|e| BoreasError::io("reading payload from stdin", e))?;
    Ok(payload)
}

fn write_payload(args: &GetArgs, payload: &[u8]) -> BoreasResult<()> {
    match &args.output {
        Some(path) => fs::write(path, payload)
            .map_err(|e| BoreasError::io(format!("writing payload to {}", path.display()), e)),
        None => io::stdout()
            .write_all(payload)
            .map_err(|e| BoreasError::io("writing payload to stdout", e)),
    }
}
