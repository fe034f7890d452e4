//! Encrypted items on top of a StorageBackend.
//!
//! Each item is stored as the JSON `SecureEnvelope` under `<prefix><name>`.
//! Entries that cannot be read back (bad JSON, unknown version, failed tag)
//! are treated as corrupted: removed from the backend and reported as absent.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tokenseal_crypto::{CryptoError, CryptoUtils, SecureEnvelope};

use crate::error::{Result, StorageError};
use crate::storage::StorageBackend;

/// Default key prefix for encrypted items.
pub const DEFAULT_SECURE_PREFIX: &str = "secure_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecureStorageOptions {
    /// Prefix prepended to every item name in the backend.
    pub prefix: String,
}

impl Default for SecureStorageOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_SECURE_PREFIX.to_string(),
        }
    }
}

pub struct SecureStorage<B: StorageBackend> {
    backend: B,
    crypto: Arc<CryptoUtils>,
    options: SecureStorageOptions,
}

impl<B: StorageBackend> SecureStorage<B> {
    pub fn new(backend: B, crypto: Arc<CryptoUtils>) -> Self {
        Self::with_options(backend, crypto, SecureStorageOptions::default())
    }

    pub fn with_options(backend: B, crypto: Arc<CryptoUtils>, options: SecureStorageOptions) -> Self {
        Self {
            backend,
            crypto,
            options,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn crypto(&self) -> &Arc<CryptoUtils> {
        &self.crypto
    }

    fn storage_key(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(format!("{}{}", self.options.prefix, name))
    }

    /// Encrypt `value` and store it under `name`, replacing any previous envelope.
    pub async fn set_secure_item(&self, name: &str, value: &str) -> Result<()> {
        let key = self.storage_key(name)?;
        let envelope = self.crypto.encrypt(value).await?;
        self.backend.set_item(&key, &envelope.to_json()?)
    }

    /// Decrypt the item stored under `name`.
    ///
    /// Returns `Ok(None)` when the item is missing or was corrupted (in which
    /// case it has been removed). `UnsupportedEnvironment` is returned as an
    /// error and leaves the entry in place.
    pub async fn get_secure_item(&self, name: &str) -> Result<Option<String>> {
        let key = self.storage_key(name)?;
        let Some(raw) = self.backend.get_item(&key)? else {
            return Ok(None);
        };

        match self.open(&raw).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_corruption() => {
                warn!(key = %key, error = %e, "discarding corrupted secure item");
                self.backend.remove_item(&key)?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn open(&self, raw: &str) -> std::result::Result<String, CryptoError> {
        let envelope = SecureEnvelope::from_json(raw)?;
        self.crypto.decrypt(&envelope).await
    }

    /// Serialize `value` as JSON and store it encrypted.
    pub async fn set_secure_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set_secure_item(name, &json).await
    }

    /// Decrypt and deserialize a JSON item. A payload that decrypts but does
    /// not match `T` is an error, not corruption.
    pub async fn get_secure_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.get_secure_item(name).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn remove_secure_item(&self, name: &str) -> Result<()> {
        let key = self.storage_key(name)?;
        self.backend.remove_item(&key)
    }

    pub fn has_secure_item(&self, name: &str) -> Result<bool> {
        let key = self.storage_key(name)?;
        Ok(self.backend.get_item(&key)?.is_some())
    }

    /// Names (without prefix) of all encrypted items in the backend.
    pub fn secure_item_names(&self) -> Result<Vec<String>> {
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(&self.options.prefix).map(str::to_string))
            .filter(|name| !name.is_empty())
            .collect())
    }

    /// Remove every prefixed item, leaving unrelated keys alone. Returns how
    /// many were removed.
    pub fn clear_secure_items(&self) -> Result<usize> {
        let names = self.secure_item_names()?;
        for name in &names {
            self.backend
                .remove_item(&format!("{}{}", self.options.prefix, name))?;
        }
        debug!(count = names.len(), "cleared secure items");
        Ok(names.len())
    }

    /// End the session: drop every encrypted item and the cached key.
    pub fn logout(&self) -> Result<usize> {
        let removed = self.clear_secure_items()?;
        self.crypto.clear_master_key();
        Ok(removed)
    }
}
