//! `window.localStorage` backend and the SecureStorage binding.

use std::rc::Rc;

use js_sys::Promise;
use tokenseal_storage::{Result, SecureStorage, StorageBackend, StorageError};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::crypto::build_crypto;
use crate::error::storage_to_js;

fn backend_error(e: JsValue) -> StorageError {
    StorageError::Backend(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// StorageBackend over a browser `Storage` object.
pub struct BrowserStorage {
    inner: web_sys::Storage,
}

impl BrowserStorage {
    pub fn new(inner: web_sys::Storage) -> Self {
        Self { inner }
    }

    /// The page's `localStorage`.
    pub fn local() -> std::result::Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let storage = window
            .local_storage()?
            .ok_or_else(|| JsValue::from_str("localStorage is unavailable"))?;
        Ok(Self::new(storage))
    }
}

impl StorageBackend for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key).map_err(backend_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set_item(key, value).map_err(backend_error)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.inner.remove_item(key).map_err(backend_error)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear().map_err(backend_error)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let len = self.inner.length().map_err(backend_error)?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = self.inner.key(i).map_err(backend_error)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

/// Encrypted items in `localStorage` under the `secure_` prefix.
#[wasm_bindgen(js_name = "SecureStorage")]
pub struct WasmSecureStorage {
    inner: Rc<SecureStorage<BrowserStorage>>,
}

#[wasm_bindgen(js_class = "SecureStorage")]
impl WasmSecureStorage {
    #[wasm_bindgen(constructor)]
    pub fn new(
        fingerprint: String,
        iterations: Option<u32>,
    ) -> std::result::Result<WasmSecureStorage, JsValue> {
        let crypto = build_crypto(fingerprint, iterations)?;
        let backend = BrowserStorage::local()?;
        Ok(Self {
            inner: Rc::new(SecureStorage::new(backend, crypto)),
        })
    }

    #[wasm_bindgen(js_name = "setItem")]
    pub fn set_item(&self, name: String, value: String) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner
                .set_secure_item(&name, &value)
                .await
                .map_err(storage_to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resolves to the string, or `null` when missing or discarded as corrupted.
    #[wasm_bindgen(js_name = "getItem")]
    pub fn get_item(&self, name: String) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let value = inner.get_secure_item(&name).await.map_err(storage_to_js)?;
            Ok(match value {
                Some(value) => JsValue::from_str(&value),
                None => JsValue::NULL,
            })
        })
    }

    #[wasm_bindgen(js_name = "removeItem")]
    pub fn remove_item(&self, name: String) -> std::result::Result<(), JsValue> {
        self.inner.remove_secure_item(&name).map_err(storage_to_js)
    }

    /// Removes only `secure_` items. Returns how many were removed.
    pub fn clear(&self) -> std::result::Result<u32, JsValue> {
        self.inner
            .clear_secure_items()
            .map(|n| n as u32)
            .map_err(storage_to_js)
    }

    /// Removes every secure item and forgets the cached key.
    pub fn logout(&self) -> std::result::Result<u32, JsValue> {
        self.inner
            .logout()
            .map(|n| n as u32)
            .map_err(storage_to_js)
    }
}
