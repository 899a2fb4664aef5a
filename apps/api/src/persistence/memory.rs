use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::persistence::{PersistError, SlotStorage};

/// In-process slot storage. Writes can be made to fail to exercise error paths.
#[derive(Debug, Default)]
pub struct MemorySlotStorage {
    slots: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    #[cfg(test)]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PersistError> {
        self.slots
            .lock()
            .map_err(|_| PersistError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn write(&self, key: &str, blob: &str) -> Result<(), PersistError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("quota exceeded".to_string()));
        }
        self.slots()?.insert(key.to_string(), blob.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.slots()?.remove(key);
        Ok(())
    }
}
