//! Named storage slots: each key holds one opaque text blob, read and written wholesale.
//!
//! `FileSlotStorage` is the durable backend; `MemorySlotStorage` keeps slots in
//! process memory and can be told to fail writes.

pub mod file;
pub mod memory;

use thiserror::Error;

pub use file::FileSlotStorage;
pub use memory::MemorySlotStorage;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable key → blob storage. Implementations must make `write` all-or-nothing:
/// a failed write leaves the previous blob readable.
pub trait SlotStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;

    fn write(&self, key: &str, blob: &str) -> Result<(), PersistError>;

    fn remove(&self, key: &str) -> Result<(), PersistError>;
}
