//! Boreas - File-Backed Cache Store
//!
//! Stores one file per cache entry with expiry and tag metadata in a
//! self-describing trailer, and can freeze a whole cache into an
//! immutable, read-optimized snapshot.

pub mod backend;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;

pub use backend::{CacheKind, FileBackend};
pub use environment::CacheEnvironment;
pub use error::{BoreasError, BoreasResult};
