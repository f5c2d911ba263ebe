//! Per-entry file operations
//!
//! Every write goes to a uniquely named temporary file in the cache
//! directory followed by an atomic rename, so concurrent readers never
//! observe a partially written entry. Reads use the self-locating trailer
//! to pull only the payload bytes, not the whole file.

use crate::backend::codec::{self, DATA_SIZE_DIGITS, MIN_TRAILER_LENGTH};
use crate::error::{BoreasError, BoreasResult};
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Rename attempts before a write is abandoned
const RENAME_ATTEMPTS: u32 = 5;

/// Decoded trailer metadata of a single entry
#[derive(Debug, Clone)]
pub(crate) struct EntryMetadata {
    pub expiry_time: i64,
    pub tags: Vec<String>,
}

impl EntryMetadata {
    /// An expiry time of zero means the entry never expires
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiry_time != 0 && self.expiry_time < now
    }
}

/// File operations on individual cache entries within one directory
pub(crate) struct EntryStore {
    directory: PathBuf,
    maximum_path_length: usize,
}

impl EntryStore {
    pub fn new(directory: PathBuf, maximum_path_length: usize) -> Self {
        Self {
            directory,
            maximum_path_length,
        }
    }

    /// Write `data ++ trailer` to a temp file, then rename into place.
    ///
    /// The rename is retried up to [`RENAME_ATTEMPTS`] times without delay
    /// and without rewriting the payload; exhausting the retries removes
    /// the temp file and surfaces a storage error, so the final path is
    /// only ever produced by a completed rename.
    pub fn write(
        &self,
        path: &Path,
        data: &[u8],
        tags: &[String],
        expiry_time: i64,
    ) -> BoreasResult<()> {
        self.check_path_length(path)?;
        let temp_path = self.directory.join(format!("{}.temp", Uuid::new_v4()));
        self.check_path_length(&temp_path)?;

        let trailer = codec::encode_trailer(expiry_time, tags, data.len());
        write_temp_file(&temp_path, data, &trailer).map_err(|source| {
            BoreasError::TempFileWrite {
                path: temp_path.clone(),
                source,
            }
        })?;

        let mut attempts = 0;
        while attempts < RENAME_ATTEMPTS {
            attempts += 1;
            match fs::rename(&temp_path, path) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!(
                        path = %path.display(),
                        attempt = attempts,
                        error = %e,
                        "rename of cache entry failed"
                    );
                }
            }
        }

        let _ = fs::remove_file(&temp_path);
        Err(BoreasError::RenameExhausted {
            path: path.to_path_buf(),
            attempts: RENAME_ATTEMPTS,
        })
    }

    /// Read the payload bytes as delimited by the trailing size field.
    ///
    /// Returns `None` if the file does not exist; a file that vanishes
    /// between existence check and read is a routine miss, not an error.
    pub fn read(&self, path: &Path) -> BoreasResult<Option<Vec<u8>>> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BoreasError::io(format!("opening {}", path.display()), e)),
        };

        let data_size = read_data_size(&mut file, path)?;
        let mut data = vec![0u8; data_size];
        file.seek(SeekFrom::Start(0))
            .and_then(|_| file.read_exact(&mut data))
            .map_err(|e| BoreasError::io(format!("reading payload of {}", path.display()), e))?;
        Ok(Some(data))
    }

    /// Decode the trailer of an entry without reading its payload.
    ///
    /// Returns `None` if the file does not exist.
    pub fn metadata(&self, path: &Path) -> BoreasResult<Option<EntryMetadata>> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BoreasError::io(format!("opening {}", path.display()), e)),
        };

        let file_length = file
            .metadata()
            .map_err(|e| BoreasError::io(format!("inspecting {}", path.display()), e))?
            .len() as usize;
        let data_size = read_data_size(&mut file, path)?;
        if data_size + MIN_TRAILER_LENGTH > file_length {
            return Err(BoreasError::CorruptTrailer {
                path: path.to_path_buf(),
                reason: format!(
                    "size field claims {} payload bytes but the file is {} bytes",
                    data_size, file_length
                ),
            });
        }

        let mut block = vec![0u8; file_length - data_size];
        file.seek(SeekFrom::Start(data_size as u64))
            .and_then(|_| file.read_exact(&mut block))
            .map_err(|e| BoreasError::io(format!("reading trailer of {}", path.display()), e))?;

        let (expiry_time, tags) =
            codec::decode_trailer(&block).map_err(|reason| BoreasError::CorruptTrailer {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(Some(EntryMetadata { expiry_time, tags }))
    }

    /// Delete the entry file; reports whether something was removed
    pub fn remove(&self, path: &Path) -> BoreasResult<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BoreasError::io(format!("removing {}", path.display()), e)),
        }
    }

    /// A missing file counts as expired
    pub fn is_expired(&self, path: &Path, now: i64) -> BoreasResult<bool> {
        Ok(match self.metadata(path)? {
            Some(metadata) => metadata.is_expired(now),
            None => true,
        })
    }

    fn check_path_length(&self, path: &Path) -> BoreasResult<()> {
        let length = path.as_os_str().len();
        if length > self.maximum_path_length {
            return Err(BoreasError::PathTooLong {
                path: path.to_path_buf(),
                length,
                maximum: self.maximum_path_length,
            });
        }
        Ok(())
    }
}

fn write_temp_file(temp_path: &Path, data: &[u8], trailer: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(data)?;
    file.write_all(trailer)?;
    file.sync_all()
}

/// Read the trailing size field; the value doubles as the trailer offset
fn read_data_size(file: &mut File, path: &Path) -> BoreasResult<usize> {
    let mut tail = [0u8; DATA_SIZE_DIGITS];
    file.seek(SeekFrom::End(-(DATA_SIZE_DIGITS as i64)))
        .and_then(|_| file.read_exact(&mut tail))
        .map_err(|_| BoreasError::CorruptTrailer {
            path: path.to_path_buf(),
            reason: format!("file is shorter than the {DATA_SIZE_DIGITS}-byte size field"),
        })?;
    codec::decode_data_length(&tail).map_err(|reason| BoreasError::CorruptTrailer {
        path: path.to_path_buf(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (EntryStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = EntryStore::new(temp.path().to_path_buf(), 4096);
        (store, temp)
    }

    #[test]
    fn write_then_read_returns_exact_payload() {
        let (store, temp) = test_store();
        let path = temp.path().join("entry");

        store
            .write(&path, b"payload bytes", &["a".to_string()], 0)
            .unwrap();

        assert_eq!(store.read(&path).unwrap().unwrap(), b"payload bytes");
    }

    #[test]
    fn read_missing_file_is_none() {
        let (store, temp) = test_store();
        assert!(store.read(&temp.path().join("absent")).unwrap().is_none());
    }

    #[test]
    fn metadata_decodes_tags_and_expiry() {
        let (store, temp) = test_store();
        let path = temp.path().join("entry");
        let tags = vec!["x".to_string(), "y".to_string()];

        store.write(&path, b"data", &tags, 9999999999).unwrap();

        let metadata = store.metadata(&path).unwrap().unwrap();
        assert_eq!(metadata.expiry_time, 9999999999);
        assert_eq!(metadata.tags, tags);
    }

    #[test]
    fn write_leaves_no_temp_files_behind() {
        let (store, temp) = test_store();
        store
            .write(&temp.path().join("entry"), b"data", &[], 0)
            .unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".temp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn expiry_in_the_past_is_expired() {
        let (store, temp) = test_store();
        let path = temp.path().join("entry");

        store.write(&path, b"data", &[], 100).unwrap();
        assert!(store.is_expired(&path, 101).unwrap());
        assert!(!store.is_expired(&path, 99).unwrap());
    }

    #[test]
    fn expiry_of_zero_never_expires() {
        let (store, temp) = test_store();
        let path = temp.path().join("entry");

        store.write(&path, b"data", &[], 0).unwrap();
        assert!(!store.is_expired(&path, i64::MAX).unwrap());
    }

    #[test]
    fn missing_file_counts_as_expired() {
        let (store, temp) = test_store();
        assert!(store.is_expired(&temp.path().join("absent"), 0).unwrap());
    }

    #[test]
    fn remove_reports_whether_a_file_existed() {
        let (store, temp) = test_store();
        let path = temp.path().join("entry");
        store.write(&path, b"data", &[], 0).unwrap();

        assert!(store.remove(&path).unwrap());
        assert!(!store.remove(&path).unwrap());
    }

    #[test]
    fn truncated_file_is_reported_corrupt() {
        let (store, temp) = test_store();
        let path = temp.path().join("entry");
        fs::write(&path, b"tiny").unwrap();

        assert!(matches!(
            store.metadata(&path),
            Err(BoreasError::CorruptTrailer { .. })
        ));
    }

    #[test]
    fn lying_size_field_is_reported_corrupt() {
        let (store, temp) = test_store();
        let path = temp.path().join("entry");
        // Size field claims more payload than the file holds.
        fs::write(&path, b"9999999999").unwrap();

        assert!(matches!(
            store.metadata(&path),
            Err(BoreasError::CorruptTrailer { .. })
        ));
    }

    #[test]
    fn overlong_path_is_rejected_before_any_io() {
        let temp = TempDir::new().unwrap();
        let store = EntryStore::new(temp.path().to_path_buf(), 5);
        let path = temp.path().join("entry");

        assert!(matches!(
            store.write(&path, b"data", &[], 0),
            Err(BoreasError::PathTooLong { .. })
        ));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
