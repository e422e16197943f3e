//! Persistence backends and the collection codec
//!
//! Each collection is stored as a JSON array under a fixed key.

mod file;
#[cfg(target_arch = "wasm32")]
mod local;
mod memory;
mod traits;

pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use memory::MemoryStore;
pub use traits::{KeyValueStore, StorageError};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub const ARTWORKS_KEY: &str = "artworks";
pub const ARTISTS_KEY: &str = "artists";
pub const COMMENTS_KEY: &str = "comments";

/// Read a collection stored under `key`.
///
/// Returns `Ok(None)` when nothing is stored or the stored value is blank.
/// An unparseable value is an error.
pub fn read_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<Vec<T>>, StorageError> {
    match store.get_item(key)? {
        Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
        _ => Ok(None),
    }
}

/// Serialize `items` and store them under `key`
pub fn write_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let json = serde_json::to_string(items)?;
    store.set_item(key, &json)
}
