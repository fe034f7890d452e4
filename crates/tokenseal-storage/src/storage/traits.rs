//! The key-value surface the secure layer persists through.
//!
//! Mirrors the browser `Storage` interface (`localStorage` /
//! `sessionStorage`), so a wasm build can implement it over `web_sys::Storage`
//! while native builds use memory or SQLite.

use crate::error::Result;

/// String key-value store.
///
/// No `Send`/`Sync` bound: browser storage handles are single-threaded.
pub trait StorageBackend {
    /// Value stored under `key`, or `None`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every key.
    fn clear(&self) -> Result<()>;

    /// All keys currently stored.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<B> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}
