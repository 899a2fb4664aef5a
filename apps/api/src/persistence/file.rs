use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::persistence::{PersistError, SlotStorage};

/// Stores each slot as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileSlotStorage {
    dir: PathBuf,
}

impl FileSlotStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistError::Unavailable(format!(
                "invalid slot key '{key}'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SlotStorage for FileSlotStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), PersistError> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write beside the target and rename over it, so readers never see a partial blob.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(blob.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| PersistError::Io(e.error))?;

        debug!("Wrote {} bytes to slot {}", blob.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slot_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSlotStorage::new(dir.path());
        assert!(storage.read("resume-storage").unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSlotStorage::new(dir.path().join("nested"));
        storage.write("resume-storage", "{\"a\":1}").unwrap();
        storage.write("resume-storage", "{\"a\":2}").unwrap();
        assert_eq!(
            storage.read("resume-storage").unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        assert!(dir.path().join("nested/resume-storage.json").exists());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSlotStorage::new(dir.path());
        storage.write("slot", "x").unwrap();
        storage.remove("slot").unwrap();
        storage.remove("slot").unwrap();
        assert!(storage.read("slot").unwrap().is_none());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSlotStorage::new(dir.path());
        assert!(matches!(
            storage.write("../escape", "x"),
            Err(PersistError::Unavailable(_))
        ));
        assert!(storage.read("").is_err());
    }
}
