//! File-backed cache storage engine
//!
//! One file per entry, rooted at `<base>/Cache/<Data|Code>/<cache>/`. Live
//! entries carry a self-describing metadata trailer holding expiry time and
//! tags; a frozen cache strips the trailers, tracks existence through a
//! persisted identifier set, and serves reads without any metadata parsing.
//!
//! # Modes
//!
//! | State  | Mutations | Reads | Expiry |
//! |--------|-----------|-------|--------|
//! | Live   | allowed | trailer-delimited | enforced |
//! | Frozen | rejected | whole file, gated by identifier set | ignored |
//!
//! A frozen cache is thawed only by [`FileBackend::flush`].

mod codec;
mod entry;
mod scan;
mod snapshot;

use crate::environment::CacheEnvironment;
use crate::error::{BoreasError, BoreasResult};
use chrono::Utc;
use entry::EntryStore;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Entry lifetime applied when `set` is called without one, in seconds
const DEFAULT_LIFETIME: i64 = 3600;

/// Distinguishes executable-code caches from opaque-data caches.
///
/// Code caches get their own directory branch and a fixed entry file
/// extension so their payloads can be handed to an external execution
/// environment; data caches use bare identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Data,
    Code,
}

impl CacheKind {
    fn directory_component(self) -> &'static str {
        match self {
            Self::Data => "Data",
            Self::Code => "Code",
        }
    }

    fn entry_extension(self) -> &'static str {
        match self {
            Self::Data => "",
            Self::Code => ".code",
        }
    }
}

/// Frozen carries the identifier set that gates all reads
enum BackendState {
    Live,
    Frozen { identifiers: BTreeSet<String> },
}

/// A cache backend bound to one directory
pub struct FileBackend {
    cache_identifier: String,
    cache_directory: PathBuf,
    entry_extension: &'static str,
    default_lifetime: i64,
    store: EntryStore,
    state: BackendState,
    executed: HashSet<String>,
}

impl FileBackend {
    /// Bind a backend to `<base>/Cache/<Data|Code>/<cache_identifier>/`.
    ///
    /// Creates the directory recursively if needed. A directory containing
    /// a frozen-snapshot marker opens straight into Frozen state with the
    /// persisted identifier set loaded.
    pub fn open(
        environment: &CacheEnvironment,
        cache_identifier: &str,
        kind: CacheKind,
    ) -> BoreasResult<Self> {
        validate_identifier(cache_identifier)?;

        let cache_directory = environment
            .temporary_directory()
            .join("Cache")
            .join(kind.directory_component())
            .join(cache_identifier);
        let length = cache_directory.as_os_str().len();
        if length > environment.maximum_path_length() {
            return Err(BoreasError::PathTooLong {
                path: cache_directory,
                length,
                maximum: environment.maximum_path_length(),
            });
        }
        fs::create_dir_all(&cache_directory).map_err(|source| BoreasError::CacheDirCreate {
            path: cache_directory.clone(),
            source,
        })?;

        let state = match snapshot::load(&cache_directory)? {
            Some(identifiers) => BackendState::Frozen { identifiers },
            None => BackendState::Live,
        };
        debug!(
            cache = cache_identifier,
            directory = %cache_directory.display(),
            frozen = matches!(state, BackendState::Frozen { .. }),
            "opened cache backend"
        );

        Ok(Self {
            cache_identifier: cache_identifier.to_string(),
            store: EntryStore::new(cache_directory.clone(), environment.maximum_path_length()),
            cache_directory,
            entry_extension: kind.entry_extension(),
            default_lifetime: DEFAULT_LIFETIME,
            state,
            executed: HashSet::new(),
        })
    }

    /// Override the lifetime used when `set` is called without one
    pub fn with_default_lifetime(mut self, seconds: i64) -> Self {
        self.default_lifetime = seconds;
        self
    }

    /// The identifier this backend was bound with
    pub fn cache_identifier(&self) -> &str {
        &self.cache_identifier
    }

    /// The directory where this backend stores its entry files
    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.state, BackendState::Frozen { .. })
    }

    /// Store an entry, replacing any previous one under the same identifier.
    ///
    /// `lifetime` of `None` uses the configured default; `Some(0)` means the
    /// entry never expires. The payload and trailer land in a temp file that
    /// is renamed into place, so a reader never sees a torn entry.
    pub fn set(
        &self,
        identifier: &str,
        data: &[u8],
        tags: &[String],
        lifetime: Option<i64>,
    ) -> BoreasResult<()> {
        validate_identifier(identifier)?;
        if self.is_frozen() {
            return Err(BoreasError::Frozen(self.cache_identifier.clone()));
        }

        let path = self.entry_path(identifier);
        self.store.remove(&path)?;

        let expiry_time = match lifetime.unwrap_or(self.default_lifetime) {
            0 => 0,
            seconds => unix_now() + seconds,
        };
        self.store.write(&path, data, tags, expiry_time)?;
        debug!(
            cache = %self.cache_identifier,
            identifier,
            bytes = data.len(),
            expiry_time,
            "stored cache entry"
        );
        Ok(())
    }

    /// Fetch an entry's payload; expired and missing entries are `None`
    pub fn get(&self, identifier: &str) -> BoreasResult<Option<Vec<u8>>> {
        validate_identifier(identifier)?;
        match &self.state {
            BackendState::Frozen { identifiers } => {
                if !identifiers.contains(identifier) {
                    return Ok(None);
                }
                self.read_frozen_file(identifier)
            }
            BackendState::Live => {
                let path = self.entry_path(identifier);
                if self.store.is_expired(&path, unix_now())? {
                    return Ok(None);
                }
                self.store.read(&path)
            }
        }
    }

    /// Check entry existence without reading the payload
    pub fn has(&self, identifier: &str) -> BoreasResult<bool> {
        validate_identifier(identifier)?;
        match &self.state {
            BackendState::Frozen { identifiers } => Ok(identifiers.contains(identifier)),
            BackendState::Live => {
                let expired = self
                    .store
                    .is_expired(&self.entry_path(identifier), unix_now())?;
                Ok(!expired)
            }
        }
    }

    /// Delete an entry; reports whether something was removed
    pub fn remove(&self, identifier: &str) -> BoreasResult<bool> {
        validate_identifier(identifier)?;
        if self.is_frozen() {
            return Err(BoreasError::Frozen(self.cache_identifier.clone()));
        }
        self.store.remove(&self.entry_path(identifier))
    }

    /// Identifiers of all live entries carrying `tag`, in sorted order.
    ///
    /// Always a full directory scan. Frozen caches no longer carry the tag
    /// metadata (trailers are stripped at freeze time), so tag search is
    /// rejected outright rather than silently returning nothing.
    pub fn find_identifiers_by_tag(&self, tag: &str) -> BoreasResult<BTreeSet<String>> {
        if self.is_frozen() {
            return Err(BoreasError::TagScanWhileFrozen(self.cache_identifier.clone()));
        }
        scan::find_identifiers_by_tag(
            &self.store,
            &self.cache_directory,
            self.entry_extension,
            tag,
            unix_now(),
        )
    }

    /// Delete every entry and return to Live state
    pub fn flush(&mut self) -> BoreasResult<()> {
        fs::remove_dir_all(&self.cache_directory).map_err(|e| {
            BoreasError::io(
                format!("emptying cache directory {}", self.cache_directory.display()),
                e,
            )
        })?;
        fs::create_dir_all(&self.cache_directory).map_err(|source| {
            BoreasError::CacheDirCreate {
                path: self.cache_directory.clone(),
                source,
            }
        })?;
        self.state = BackendState::Live;
        self.executed.clear();
        debug!(cache = %self.cache_identifier, "flushed cache");
        Ok(())
    }

    /// Delete every entry carrying `tag`; zero matches is a no-op
    pub fn flush_by_tag(&self, tag: &str) -> BoreasResult<()> {
        if self.is_frozen() {
            return Err(BoreasError::Frozen(self.cache_identifier.clone()));
        }
        let identifiers = self.find_identifiers_by_tag(tag)?;
        let count = identifiers.len();
        for identifier in identifiers {
            self.remove(&identifier)?;
        }
        debug!(cache = %self.cache_identifier, tag, count, "flushed entries by tag");
        Ok(())
    }

    /// Sweep expired entries; a no-op while frozen.
    ///
    /// The sweep is best-effort: failures on individual entries are logged
    /// and do not abort the pass.
    pub fn collect_garbage(&self) -> BoreasResult<()> {
        if self.is_frozen() {
            return Ok(());
        }
        let now = unix_now();
        for scanned in scan::scan_entries(&self.cache_directory, self.entry_extension)? {
            let expired = match self.store.is_expired(&scanned.path, now) {
                Ok(expired) => expired,
                Err(e) => {
                    warn!(path = %scanned.path.display(), error = %e, "skipping entry during garbage collection");
                    continue;
                }
            };
            if !expired {
                continue;
            }
            match self.store.remove(&scanned.path) {
                Ok(true) => debug!(identifier = %scanned.identifier, "collected expired entry"),
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %scanned.path.display(), error = %e, "failed to remove expired entry")
                }
            }
        }
        Ok(())
    }

    /// Convert this cache into an immutable, read-optimized snapshot.
    ///
    /// Every live entry is rewritten to its raw payload (trailer discarded
    /// permanently) and recorded in the identifier set, which is persisted
    /// alongside the entries. Entries already expired at freeze time are
    /// dropped. Freezing requires exclusive access to the directory; the
    /// caller is responsible for that exclusivity.
    pub fn freeze(&mut self) -> BoreasResult<()> {
        if self.is_frozen() {
            return Err(BoreasError::AlreadyFrozen(self.cache_identifier.clone()));
        }

        let now = unix_now();
        let scanned: Vec<_> =
            scan::scan_entries(&self.cache_directory, self.entry_extension)?.collect();

        let mut identifiers = BTreeSet::new();
        for entry in scanned {
            if self.store.is_expired(&entry.path, now)? {
                self.store.remove(&entry.path)?;
                continue;
            }
            let Some(payload) = self.store.read(&entry.path)? else {
                continue;
            };
            fs::write(&entry.path, &payload).map_err(|e| {
                BoreasError::io(format!("rewriting frozen entry {}", entry.path.display()), e)
            })?;
            identifiers.insert(entry.identifier);
        }

        snapshot::persist(&self.cache_directory, &identifiers)?;
        debug!(
            cache = %self.cache_identifier,
            entries = identifiers.len(),
            "froze cache"
        );
        self.state = BackendState::Frozen { identifiers };
        Ok(())
    }

    /// Resolve an entry and run `execute` over its payload, at most once
    /// per identifier for the lifetime of this backend instance.
    ///
    /// Intended for code caches, where the payload is executable content
    /// and the caller owns the execution environment. Repeat calls for an
    /// already-executed identifier, and routine misses, return `None`.
    pub fn load_and_execute<T, F>(&mut self, identifier: &str, execute: F) -> BoreasResult<Option<T>>
    where
        F: FnOnce(&[u8]) -> T,
    {
        validate_identifier(identifier)?;
        if self.executed.contains(identifier) {
            return Ok(None);
        }
        let Some(payload) = self.get(identifier)? else {
            return Ok(None);
        };
        self.executed.insert(identifier.to_string());
        Ok(Some(execute(&payload)))
    }

    /// Number of entry files currently present (identifier-set size when frozen)
    pub fn entry_count(&self) -> BoreasResult<usize> {
        match &self.state {
            BackendState::Frozen { identifiers } => Ok(identifiers.len()),
            BackendState::Live => {
                Ok(scan::scan_entries(&self.cache_directory, self.entry_extension)?.count())
            }
        }
    }

    fn entry_path(&self, identifier: &str) -> PathBuf {
        self.cache_directory
            .join(format!("{identifier}{}", self.entry_extension))
    }

    /// Whole-file read; the identifier set is authoritative, so a missing
    /// file is an inconsistency worth logging but still a routine miss
    fn read_frozen_file(&self, identifier: &str) -> BoreasResult<Option<Vec<u8>>> {
        let path = self.entry_path(identifier);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "frozen identifier set references a missing file");
                Ok(None)
            }
            Err(e) => Err(BoreasError::io(format!("reading {}", path.display()), e)),
        }
    }
}

/// Reject identifiers that are empty, reserved, or not their own basename
fn validate_identifier(identifier: &str) -> BoreasResult<()> {
    if identifier.is_empty() {
        return Err(BoreasError::EmptyIdentifier);
    }
    if identifier == snapshot::FROZEN_SNAPSHOT_FILENAME {
        return Err(BoreasError::ReservedIdentifier(identifier.to_string()));
    }
    let is_basename = !identifier.contains('/')
        && !identifier.contains('\\')
        && identifier != "."
        && identifier != "..";
    if !is_basename {
        return Err(BoreasError::IdentifierContainsPathSegment(
            identifier.to_string(),
        ));
    }
    Ok(())
}

fn unix_now() -> i64 {
    Utc::now().timestamp()
}
