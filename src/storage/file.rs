//! Directory-backed store: one `<slot>.json` file per slot.
//!
//! Writes land in a temp file next to the target and are renamed over it,
//! so a crash mid-write leaves the previous value intact. Each write holds an
//! exclusive lock on `<slot>.lock` while it runs.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use fs2::FileExt;
use tempfile::NamedTempFile;

use super::{validate_key, KeyValueStore, StorageError};

/// File-based slot store
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding the slot files
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        fs::create_dir_all(&dir).map_err(|source| StorageError::Directory {
            path: dir.clone(),
            source,
        })?;

        Ok(Self { dir })
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    /// Take the per-slot write lock. Released when the file is dropped.
    fn lock(&self, key: &str) -> Result<File, StorageError> {
        let lock_path = self.dir.join(format!("{}.lock", key));
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(io_err)?;
        file.lock_exclusive().map_err(io_err)?;

        Ok(file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;

        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let _lock = self.lock(key)?;
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(value.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;

        tmp.persist(&path).map_err(|err| StorageError::Persist {
            key: key.to_string(),
            source: err.error,
        })?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let _lock = self.lock(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_slot_reads_as_none() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        assert_eq!(store.get("libraryBooks").unwrap(), None);
    }

    #[test]
    fn test_set_writes_slot_file() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path().join("nested")).unwrap();

        store.set("libraryBooks", "[1,2]").unwrap();
        store.set("libraryBooks", "[3]").unwrap();

        let on_disk = std::fs::read_to_string(store.slot_path("libraryBooks").unwrap()).unwrap();
        assert_eq!(on_disk, "[3]");
        assert_eq!(store.get("libraryBooks").unwrap().as_deref(), Some("[3]"));
    }

    #[test]
    fn test_remove_slot() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        store.set("borrowedBooks", "[]").unwrap();
        store.remove("borrowedBooks").unwrap();
        assert_eq!(store.get("borrowedBooks").unwrap(), None);

        // Absent slot
        store.remove("borrowedBooks").unwrap();
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        store.set("libraryBooks", "[]").unwrap();

        let mut names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["libraryBooks.json", "libraryBooks.lock"]);
    }

    #[test]
    fn test_invalid_key_never_touches_disk() {
        let temp = TempDir::new().unwrap();
        let mut store = FileStore::open(temp.path()).unwrap();

        assert!(matches!(
            store.set("../outside", "[]"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(!temp.path().parent().unwrap().join("outside.json").exists());
    }
}
