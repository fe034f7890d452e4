//! Error conversion for WASM boundary.

use serde::Serialize;
use tokenseal_crypto::CryptoError;
use tokenseal_storage::StorageError;
use wasm_bindgen::JsValue;

/// Stable name for each crypto failure kind, exposed as `Error.name` in JS.
pub fn crypto_error_name(e: &CryptoError) -> &'static str {
    match e {
        CryptoError::UnsupportedEnvironment => "UnsupportedEnvironment",
        CryptoError::UnsupportedVersion(_) => "UnsupportedVersion",
        CryptoError::EncryptionFailed(_) => "EncryptionFailed",
        CryptoError::DecryptionFailed(_) => "DecryptionFailed",
        CryptoError::RandomFailed(_) => "RandomFailed",
        CryptoError::InvalidEnvelope(_) => "InvalidEnvelope",
        CryptoError::InvalidConfig(_) => "InvalidConfig",
    }
}

fn named_error(name: &str, message: &str) -> JsValue {
    let err = js_sys::Error::new(message);
    err.set_name(name);
    err.into()
}

/// JS `Error` whose `name` is the crypto failure kind.
pub fn crypto_to_js(e: CryptoError) -> JsValue {
    named_error(crypto_error_name(&e), &e.to_string())
}

pub fn storage_to_js(e: StorageError) -> JsValue {
    match e {
        StorageError::Crypto(inner) => crypto_to_js(inner),
        other => named_error("StorageError", &other.to_string()),
    }
}

/// Envelope object that does not have the expected shape.
pub fn invalid_envelope(e: impl std::fmt::Display) -> JsValue {
    named_error("InvalidEnvelope", &e.to_string())
}

/// Convert any error with Display into a plain JS error.
pub fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    named_error("Error", &e.to_string())
}

/// Serialize to a plain JS object (maps as objects, not `Map`).
pub fn to_js_value(value: &impl Serialize) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(to_js_error)
}
