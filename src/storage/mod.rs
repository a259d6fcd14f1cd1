//! Storage module - async key-value persistence
//!
//! Values are opaque strings (the rentals snapshot is JSON). Two backends:
//!
//! - `file`: one file per key under the data directory, used by the app
//! - `memory`: in-process map, used by tests

mod file;
#[cfg(test)]
mod memory;

use async_trait::async_trait;

use crate::error::StoreError;

pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
