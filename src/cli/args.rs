//! CLI argument definitions using clap derive

use crate::backend::CacheKind;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Boreas - file-backed cache store
///
/// Inspects and maintains cache directories holding tagged, expiring
/// entries, including frozen read-only snapshots.
#[derive(Parser, Debug)]
#[command(name = "boreas")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BOREAS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store an entry
    Set(SetArgs),

    /// Print an entry's payload
    Get(GetArgs),

    /// Check whether an entry exists
    Has(EntryArgs),

    /// Remove an entry
    Remove(EntryArgs),

    /// List identifiers carrying a tag
    Find(FindArgs),

    /// Remove all entries, or only those carrying a tag
    Flush(FlushArgs),

    /// Remove expired entries
    Gc(BackendArgs),

    /// Freeze the cache into an immutable snapshot
    Freeze(BackendArgs),

    /// Show cache state and entry count
    Status(StatusArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Selects the cache a command operates on
#[derive(Args, Debug)]
pub struct BackendArgs {
    /// Cache identifier
    pub cache: String,

    /// Treat the cache as executable code instead of opaque data
    #[arg(long, value_enum, default_value_t = KindArg::Data)]
    pub kind: KindArg,

    /// Cache base directory (overrides configuration)
    #[arg(long)]
    pub base_dir: Option<PathBuf>,
}

/// Cache kind as a CLI value
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Opaque data entries, no file extension
    Data,
    /// Executable-code entries with a fixed file extension
    Code,
}

impl From<KindArg> for CacheKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Data => CacheKind::Data,
            KindArg::Code => CacheKind::Code,
        }
    }
}

/// Arguments for the set command
#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Entry identifier
    pub identifier: String,

    /// Payload as a literal string
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,

    /// Read the payload from a file (stdin if neither is given)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Tag to attach (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Lifetime in seconds (0 = never expires; omitted = configured default)
    #[arg(short, long, allow_hyphen_values = true)]
    pub lifetime: Option<i64>,
}

/// Arguments for the get command
#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Entry identifier
    pub identifier: String,

    /// Write the payload to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for commands that address a single entry
#[derive(Args, Debug)]
pub struct EntryArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Entry identifier
    pub identifier: String,
}

/// Arguments for the find command
#[derive(Args, Debug)]
pub struct FindArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Tag to search for
    pub tag: String,

    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: OutputFormat,
}

/// Arguments for the flush command
#[derive(Args, Debug)]
pub struct FlushArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Only flush entries carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
