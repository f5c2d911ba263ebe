//! Directory scanning shared by tag search, freezing, and garbage collection
//!
//! Tag lookup has no persistent secondary index; it is always a full linear
//! scan over the live entries. Scans run without any directory lock, so an
//! entry removed mid-scan shows up as a routine miss, never as an error.

use crate::backend::entry::{EntryMetadata, EntryStore};
use crate::backend::snapshot::FROZEN_SNAPSHOT_FILENAME;
use crate::error::{BoreasError, BoreasResult};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One entry file found in a cache directory
#[derive(Debug)]
pub(crate) struct ScannedEntry {
    pub identifier: String,
    pub path: PathBuf,
}

/// Iterate the entry files of a cache directory.
///
/// Skips the frozen-snapshot marker, in-flight `.temp` files, and anything
/// that is not a regular file. When the cache uses an entry extension, files
/// without it are not entries and are skipped; the identifier is the file
/// name with the extension stripped.
pub(crate) fn scan_entries(
    directory: &Path,
    extension: &'static str,
) -> BoreasResult<impl Iterator<Item = ScannedEntry>> {
    let read_dir = fs::read_dir(directory)
        .map_err(|e| BoreasError::io(format!("scanning cache directory {}", directory.display()), e))?;

    Ok(read_dir.filter_map(move |dir_entry| {
        let dir_entry = dir_entry.ok()?;
        if !dir_entry.file_type().ok()?.is_file() {
            return None;
        }
        let file_name = dir_entry.file_name().into_string().ok()?;
        if file_name == FROZEN_SNAPSHOT_FILENAME || file_name.ends_with(".temp") {
            return None;
        }
        let identifier = if extension.is_empty() {
            file_name
        } else {
            file_name.strip_suffix(extension)?.to_string()
        };
        Some(ScannedEntry {
            identifier,
            path: dir_entry.path(),
        })
    }))
}

/// Decode one scanned entry's metadata, tolerating concurrent removal.
///
/// A file that vanished mid-scan or carries an undecodable trailer is
/// treated as "not found this pass".
pub(crate) fn tolerant_metadata(
    store: &EntryStore,
    entry: &ScannedEntry,
) -> BoreasResult<Option<EntryMetadata>> {
    match store.metadata(&entry.path) {
        Ok(found) => Ok(found),
        Err(BoreasError::CorruptTrailer { path, reason }) => {
            warn!(path = %path.display(), reason, "skipping entry with undecodable trailer");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Collect the identifiers of all live entries carrying `tag`.
///
/// Entries whose expiry time is non-zero and in the past are excluded.
pub(crate) fn find_identifiers_by_tag(
    store: &EntryStore,
    directory: &Path,
    extension: &'static str,
    tag: &str,
    now: i64,
) -> BoreasResult<BTreeSet<String>> {
    let mut identifiers = BTreeSet::new();
    for entry in scan_entries(directory, extension)? {
        let Some(metadata) = tolerant_metadata(store, &entry)? else {
            continue;
        };
        if metadata.is_expired(now) {
            continue;
        }
        if metadata.tags.iter().any(|candidate| candidate == tag) {
            identifiers.insert(entry.identifier);
        }
    }
    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populated_store(temp: &TempDir) -> EntryStore {
        EntryStore::new(temp.path().to_path_buf(), 4096)
    }

    fn write_entry(store: &EntryStore, dir: &Path, id: &str, tags: &[&str], expiry: i64) {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        store.write(&dir.join(id), b"data", &tags, expiry).unwrap();
    }

    #[test]
    fn scan_skips_bookkeeping_and_non_files() {
        let temp = TempDir::new().unwrap();
        let store = populated_store(&temp);

        write_entry(&store, temp.path(), "real", &[], 0);
        fs::write(temp.path().join(FROZEN_SNAPSHOT_FILENAME), b"{}").unwrap();
        fs::write(temp.path().join("abandoned.temp"), b"partial").unwrap();
        fs::create_dir(temp.path().join("subdir")).unwrap();

        let found: Vec<String> = scan_entries(temp.path(), "")
            .unwrap()
            .map(|e| e.identifier)
            .collect();
        assert_eq!(found, vec!["real".to_string()]);
    }

    #[test]
    fn scan_strips_the_entry_extension() {
        let temp = TempDir::new().unwrap();
        let store = populated_store(&temp);

        write_entry(&store, temp.path(), "compiled.code", &[], 0);
        write_entry(&store, temp.path(), "stray-data-file", &[], 0);

        let found: Vec<String> = scan_entries(temp.path(), ".code")
            .unwrap()
            .map(|e| e.identifier)
            .collect();
        assert_eq!(found, vec!["compiled".to_string()]);
    }

    #[test]
    fn tag_search_returns_only_matching_identifiers() {
        let temp = TempDir::new().unwrap();
        let store = populated_store(&temp);

        write_entry(&store, temp.path(), "a", &["x", "y"], 0);
        write_entry(&store, temp.path(), "b", &["x", "z"], 0);
        write_entry(&store, temp.path(), "c", &["x"], 0);

        let store_ref = &store;
        let by_tag = |tag: &str| {
            find_identifiers_by_tag(store_ref, temp.path(), "", tag, 1000).unwrap()
        };
        assert_eq!(by_tag("y").into_iter().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(by_tag("z").into_iter().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(by_tag("x").len(), 3);
        assert!(by_tag("unknown").is_empty());
    }

    #[test]
    fn tag_search_excludes_expired_entries() {
        let temp = TempDir::new().unwrap();
        let store = populated_store(&temp);

        write_entry(&store, temp.path(), "fresh", &["x"], 2000);
        write_entry(&store, temp.path(), "stale", &["x"], 500);

        let found = find_identifiers_by_tag(&store, temp.path(), "", "x", 1000).unwrap();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["fresh"]);
    }

    #[test]
    fn tag_search_skips_undecodable_files() {
        let temp = TempDir::new().unwrap();
        let store = populated_store(&temp);

        write_entry(&store, temp.path(), "good", &["x"], 0);
        fs::write(temp.path().join("mangled"), b"no trailer here").unwrap();

        let found = find_identifiers_by_tag(&store, temp.path(), "", "x", 1000).unwrap();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["good"]);
    }
}
