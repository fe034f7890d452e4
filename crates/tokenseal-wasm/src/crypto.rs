//! WASM bindings for tokenseal-crypto.

use std::sync::Arc;

use js_sys::Promise;
use tokenseal_crypto::{
    secure_random_hex, CapabilityProbe, CryptoConfig, CryptoUtils, EnvelopeVersion, KeyDeriver,
    SecureEnvelope, DEFAULT_RANDOM_LENGTH, ENVELOPE_VERSION,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::error::{crypto_to_js, invalid_envelope, to_js_value};

// --- Constants ---

#[wasm_bindgen(js_name = "ENVELOPE_VERSION")]
pub fn envelope_version() -> u32 {
    ENVELOPE_VERSION
}

// --- Free functions ---

#[wasm_bindgen(js_name = "isSupported")]
pub fn wasm_is_supported() -> bool {
    host_capability().is_supported()
}

#[wasm_bindgen(js_name = "generateSecureRandom")]
pub fn wasm_generate_secure_random(length: Option<u32>) -> Result<String, JsValue> {
    let length = length.map_or(DEFAULT_RANDOM_LENGTH, |l| l as usize);
    secure_random_hex(length).map_err(crypto_to_js)
}

#[cfg(target_arch = "wasm32")]
fn host_capability() -> Arc<dyn CapabilityProbe> {
    Arc::new(crate::subtle::SubtleSupport)
}

#[cfg(not(target_arch = "wasm32"))]
fn host_capability() -> Arc<dyn CapabilityProbe> {
    Arc::new(tokenseal_crypto::PlatformProbe)
}

#[cfg(target_arch = "wasm32")]
fn host_deriver(config: &CryptoConfig) -> Arc<dyn KeyDeriver> {
    Arc::new(crate::subtle::SubtleCryptoDeriver::new(config.pbkdf2_iterations))
}

#[cfg(not(target_arch = "wasm32"))]
fn host_deriver(config: &CryptoConfig) -> Arc<dyn KeyDeriver> {
    Arc::new(tokenseal_crypto::Pbkdf2Deriver::from_config(config))
}

pub(crate) fn build_crypto(
    fingerprint: String,
    iterations: Option<u32>,
) -> Result<Arc<CryptoUtils>, JsValue> {
    let config = match iterations {
        Some(n) => CryptoConfig::with_iterations(n),
        None => CryptoConfig::default(),
    };
    config.validate().map_err(crypto_to_js)?;
    Ok(Arc::new(CryptoUtils::with_components(
        fingerprint,
        host_deriver(&config),
        host_capability(),
    )))
}

/// Read an envelope object, checking `version` before the other fields so a
/// foreign format is always `UnsupportedVersion`.
pub fn parse_envelope(value: JsValue) -> Result<SecureEnvelope, JsValue> {
    let tag: EnvelopeVersion =
        serde_wasm_bindgen::from_value(value.clone()).map_err(invalid_envelope)?;
    tag.check().map_err(crypto_to_js)?;
    serde_wasm_bindgen::from_value(value).map_err(invalid_envelope)
}

// --- CryptoUtils ---

/// Session-scoped encrypt/decrypt handle. Keep one per page.
#[wasm_bindgen(js_name = "CryptoUtils")]
pub struct WasmCryptoUtils {
    inner: Arc<CryptoUtils>,
}

#[wasm_bindgen(js_class = "CryptoUtils")]
impl WasmCryptoUtils {
    #[wasm_bindgen(constructor)]
    pub fn new(fingerprint: String, iterations: Option<u32>) -> Result<WasmCryptoUtils, JsValue> {
        Ok(Self {
            inner: build_crypto(fingerprint, iterations)?,
        })
    }

    /// Resolves to `{version, data, iv, salt}`.
    pub fn encrypt(&self, plaintext: String) -> Promise {
        let inner = Arc::clone(&self.inner);
        future_to_promise(async move {
            let envelope = inner.encrypt(&plaintext).await.map_err(crypto_to_js)?;
            to_js_value(&envelope)
        })
    }

    /// Accepts the envelope object produced by `encrypt`.
    pub fn decrypt(&self, envelope: JsValue) -> Promise {
        let envelope = match parse_envelope(envelope) {
            Ok(envelope) => envelope,
            Err(e) => return Promise::reject(&e),
        };
        let inner = Arc::clone(&self.inner);
        future_to_promise(async move {
            let plaintext = inner.decrypt(&envelope).await.map_err(crypto_to_js)?;
            Ok(JsValue::from_str(&plaintext))
        })
    }

    #[wasm_bindgen(js_name = "generateSecureRandom")]
    pub fn generate_secure_random(&self, length: Option<u32>) -> Result<String, JsValue> {
        let length = length.map_or(DEFAULT_RANDOM_LENGTH, |l| l as usize);
        self.inner
            .generate_secure_random(length)
            .map_err(crypto_to_js)
    }

    #[wasm_bindgen(js_name = "clearMasterKey")]
    pub fn clear_master_key(&self) {
        self.inner.clear_master_key();
    }

    #[wasm_bindgen(js_name = "hasCachedKey")]
    pub fn has_cached_key(&self) -> bool {
        self.inner.has_cached_key()
    }

    #[wasm_bindgen(js_name = "isSupported")]
    pub fn is_supported(&self) -> bool {
        self.inner.is_supported()
    }
}
