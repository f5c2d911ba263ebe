//! Frozen-snapshot persistence
//!
//! The presence of `FrozenCache.data` in a cache directory marks the cache
//! as frozen. The file holds a serialized identifier→presence map which
//! replaces per-file existence and expiry checks for the directory's whole
//! frozen lifetime.

use crate::error::{BoreasError, BoreasResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Marker file name; never a valid entry identifier
pub(crate) const FROZEN_SNAPSHOT_FILENAME: &str = "FrozenCache.data";

pub(crate) fn snapshot_path(directory: &Path) -> PathBuf {
    directory.join(FROZEN_SNAPSHOT_FILENAME)
}

/// Persist the identifier set captured at freeze time.
///
/// Written through a temp file and rename so a crash mid-freeze cannot
/// leave a half-written marker that would poison the next open.
pub(crate) fn persist(directory: &Path, identifiers: &BTreeSet<String>) -> BoreasResult<()> {
    let map: BTreeMap<&String, bool> = identifiers.iter().map(|id| (id, true)).collect();
    let bytes = serde_json::to_vec(&map)?;

    let temp_path = directory.join(format!("{}.temp", Uuid::new_v4()));
    fs::write(&temp_path, &bytes).map_err(|source| BoreasError::TempFileWrite {
        path: temp_path.clone(),
        source,
    })?;
    fs::rename(&temp_path, snapshot_path(directory)).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        BoreasError::io("moving frozen snapshot into place", e)
    })
}

/// Load the identifier set if the directory holds a snapshot marker
pub(crate) fn load(directory: &Path) -> BoreasResult<Option<BTreeSet<String>>> {
    let path = snapshot_path(directory);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(BoreasError::io(format!("reading {}", path.display()), e)),
    };
    let map: BTreeMap<String, bool> = serde_json::from_slice(&bytes)?;
    Ok(Some(map.into_keys().collect()))
}

/// Remove the snapshot marker; absence is not an error
pub(crate) fn delete(directory: &Path) -> BoreasResult<()> {
    match fs::remove_file(snapshot_path(directory)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BoreasError::io("removing frozen snapshot", e)),
    }
}
