//! Key derivation and capability checks through the browser's `SubtleCrypto`.
//!
//! `deriveBits` runs off the main thread, so a cache miss suspends the
//! calling promise instead of freezing the page.

use async_trait::async_trait;
use js_sys::{Array, Object, Reflect, Uint8Array};
use tokenseal_crypto::{
    is_supported, CapabilityProbe, DerivedKey, KeyDeriver, PrimitiveError, AES_KEY_LENGTH,
    SALT_LENGTH,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use zeroize::Zeroize;

/// `globalThis.crypto.subtle`, present on windows and workers in secure contexts.
fn subtle() -> Result<web_sys::SubtleCrypto, JsValue> {
    let crypto = Reflect::get(&js_sys::global(), &JsValue::from_str("crypto"))?;
    let subtle = Reflect::get(&crypto, &JsValue::from_str("subtle"))?;
    if subtle.is_undefined() {
        return Err(JsValue::from_str("crypto.subtle is unavailable"));
    }
    subtle.dyn_into()
}

fn kdf_error(e: JsValue) -> PrimitiveError {
    PrimitiveError::Kdf(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// PBKDF2-HMAC-SHA256 via `importKey("raw")` + `deriveBits`. Produces the same
/// bytes as `tokenseal_crypto::derive_pbkdf2`.
#[derive(Debug, Clone)]
pub struct SubtleCryptoDeriver {
    iterations: u32,
}

impl SubtleCryptoDeriver {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }
}

#[async_trait(?Send)]
impl KeyDeriver for SubtleCryptoDeriver {
    async fn derive_key(&self, passphrase: &str, salt: &[u8]) -> Result<DerivedKey, PrimitiveError> {
        if salt.len() != SALT_LENGTH {
            return Err(PrimitiveError::InvalidLength {
                field: "salt",
                expected: SALT_LENGTH,
                got: salt.len(),
            });
        }
        let subtle = subtle().map_err(kdf_error)?;

        let usages = Array::of1(&JsValue::from_str("deriveBits"));
        let raw = Uint8Array::from(passphrase.as_bytes());
        let import = subtle
            .import_key_with_object("raw", &raw, "PBKDF2", false, &usages)
            .map_err(kdf_error)?;
        let base_key: web_sys::CryptoKey = JsFuture::from(import)
            .await
            .map_err(kdf_error)?
            .dyn_into()
            .map_err(kdf_error)?;
        raw.fill(0, 0, raw.length());

        let params = Object::new();
        for (name, value) in [
            ("name", JsValue::from_str("PBKDF2")),
            ("hash", JsValue::from_str("SHA-256")),
            ("salt", Uint8Array::from(salt).into()),
            ("iterations", JsValue::from(self.iterations)),
        ] {
            Reflect::set(&params, &JsValue::from_str(name), &value).map_err(kdf_error)?;
        }

        let derive = subtle
            .derive_bits_with_object(&params, &base_key, (AES_KEY_LENGTH * 8) as u32)
            .map_err(kdf_error)?;
        let bits = JsFuture::from(derive).await.map_err(kdf_error)?;

        let view = Uint8Array::new(&bits);
        let mut bytes = view.to_vec();
        view.fill(0, 0, view.length());
        let mut okm: [u8; AES_KEY_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| PrimitiveError::InvalidLength {
                    field: "derived key",
                    expected: AES_KEY_LENGTH,
                    got: bytes.len(),
                })?;
        bytes.zeroize();
        let key = DerivedKey::from_bytes(okm);
        okm.zeroize();
        Ok(key)
    }
}

/// CSPRNG plus `crypto.subtle`, checked on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubtleSupport;

impl CapabilityProbe for SubtleSupport {
    fn is_supported(&self) -> bool {
        is_supported() && subtle().is_ok()
    }
}
