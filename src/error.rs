//! Error types for Boreas
//!
//! All modules use `BoreasResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Boreas operations
pub type BoreasResult<T> = Result<T, BoreasError>;

/// All errors that can occur in Boreas
#[derive(Error, Debug)]
pub enum BoreasError {
    // Configuration errors
    #[error("Failed to create cache directory {path}: {source}")]
    CacheDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file path {path} is {length} characters long and exceeds the maximum path length of {maximum}")]
    PathTooLong {
        path: PathBuf,
        length: usize,
        maximum: usize,
    },

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Identifier errors
    #[error("Entry identifier must not be empty")]
    EmptyIdentifier,

    #[error("Entry identifier {0:?} must not contain a path segment")]
    IdentifierContainsPathSegment(String),

    #[error("Entry identifier {0:?} is reserved for internal bookkeeping")]
    ReservedIdentifier(String),

    // Frozen-state errors
    #[error("Cannot add or modify entries because cache \"{0}\" is frozen")]
    Frozen(String),

    #[error("Cache \"{0}\" is already frozen")]
    AlreadyFrozen(String),

    #[error("Tag search is not supported while cache \"{0}\" is frozen")]
    TagScanWhileFrozen(String),

    // Storage errors
    #[error("Failed to write temporary cache file {path}: {source}")]
    TempFileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move cache entry into place at {path} after {attempts} attempts")]
    RenameExhausted { path: PathBuf, attempts: u32 },

    #[error("Cache entry {path} has an undecodable metadata trailer: {reason}")]
    CorruptTrailer { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl BoreasError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Frozen(_) | Self::AlreadyFrozen(_) | Self::TagScanWhileFrozen(_) => {
                Some("Run: boreas flush <cache> to thaw the cache")
            }
            Self::PathTooLong { .. } => {
                Some("Configure a shorter cache base directory in config.toml")
            }
            _ => None,
        }
    }
}
