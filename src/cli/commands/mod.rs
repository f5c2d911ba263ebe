//! CLI command implementations

pub mod config;
pub mod entry;
pub mod maintain;

pub use config::execute as config;
pub use entry::{get, has, remove, set};
pub use maintain::{find, flush, freeze, gc, status};

use crate::backend::FileBackend;
use crate::cli::args::{BackendArgs, Cli};
use crate::config::Config;
use crate::error::BoreasResult;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io;

/// Bind a backend from the command-line selector and configuration
pub(crate) fn open_backend(args: &BackendArgs, config: &Config) -> BoreasResult<FileBackend> {
    let mut settings = config.cache.clone();
    if let Some(base_dir) = &args.base_dir {
        settings.base_dir = Some(base_dir.clone());
    }

    let backend = FileBackend::open(&settings.environment(), &args.cache, args.kind.into())?
        .with_default_lifetime(settings.default_lifetime_secs);
    Ok(backend)
}

/// Generate shell completions on stdout
pub fn completions(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
}
