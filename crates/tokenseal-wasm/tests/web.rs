//! Browser tests: `wasm-pack test --headless --chrome crates/tokenseal-wasm`.

#![cfg(target_arch = "wasm32")]

use js_sys::{Object, Reflect};
use tokenseal_crypto::{derive_pbkdf2, from_base64, KeyDeriver, AES_GCM_IV_LENGTH, SALT_LENGTH};
use tokenseal_storage::StorageBackend;
use tokenseal_wasm::crypto::{parse_envelope, WasmCryptoUtils};
use tokenseal_wasm::storage::{BrowserStorage, WasmSecureStorage};
use tokenseal_wasm::subtle::SubtleCryptoDeriver;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const ITERATIONS: u32 = 1_000;

fn crypto() -> WasmCryptoUtils {
    WasmCryptoUtils::new("test-fingerprint".into(), Some(ITERATIONS)).unwrap()
}

fn error_name(err: JsValue) -> String {
    err.dyn_into::<js_sys::Error>().unwrap().name().into()
}

fn field(obj: &JsValue, name: &str) -> JsValue {
    Reflect::get(obj, &JsValue::from_str(name)).unwrap()
}

// ============================================================================
// SubtleCrypto deriver
// ============================================================================

#[wasm_bindgen_test]
async fn subtle_deriver_matches_pbkdf2() {
    let salt = [7u8; SALT_LENGTH];
    let subtle = SubtleCryptoDeriver::new(ITERATIONS)
        .derive_key("test-fingerprint", &salt)
        .await
        .unwrap();
    let native = derive_pbkdf2("test-fingerprint", &salt, ITERATIONS).unwrap();
    assert_eq!(subtle.as_bytes(), native.as_bytes());
}

#[wasm_bindgen_test]
async fn subtle_deriver_rejects_short_salt() {
    let result = SubtleCryptoDeriver::new(ITERATIONS)
        .derive_key("test-fingerprint", &[0u8; 8])
        .await;
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn browser_reports_support() {
    assert!(tokenseal_wasm::crypto::wasm_is_supported());
}

// ============================================================================
// CryptoUtils bindings
// ============================================================================

#[wasm_bindgen_test]
async fn envelope_round_trips_through_js() {
    let crypto = crypto();
    let envelope = JsFuture::from(crypto.encrypt("hello world".into()))
        .await
        .unwrap();

    assert_eq!(field(&envelope, "version").as_f64(), Some(1.0));
    let iv = field(&envelope, "iv").as_string().unwrap();
    assert_eq!(from_base64(&iv).unwrap().len(), AES_GCM_IV_LENGTH);
    let salt = field(&envelope, "salt").as_string().unwrap();
    assert_eq!(from_base64(&salt).unwrap().len(), SALT_LENGTH);
    assert!(crypto.has_cached_key());

    let plaintext = JsFuture::from(crypto.decrypt(envelope)).await.unwrap();
    assert_eq!(plaintext.as_string().as_deref(), Some("hello world"));
}

#[wasm_bindgen_test]
async fn bare_foreign_version_is_unsupported() {
    let obj = Object::new();
    Reflect::set(&obj, &"version".into(), &JsValue::from(2)).unwrap();

    let err = JsFuture::from(crypto().decrypt(obj.into()))
        .await
        .unwrap_err();
    assert_eq!(error_name(err), "UnsupportedVersion");
}

#[wasm_bindgen_test]
fn envelope_without_version_is_invalid() {
    let obj = Object::new();
    Reflect::set(&obj, &"data".into(), &"AAAA".into()).unwrap();

    let err = parse_envelope(obj.into()).unwrap_err();
    assert_eq!(error_name(err), "InvalidEnvelope");
}

#[wasm_bindgen_test]
async fn tampered_envelope_rejects_with_decryption_failed() {
    let crypto = crypto();
    let envelope = JsFuture::from(crypto.encrypt("hello world".into()))
        .await
        .unwrap();
    Reflect::set(&envelope, &"data".into(), &"AAAAAAAAAAAAAAAAAAAAAAAA".into()).unwrap();

    let err = JsFuture::from(crypto.decrypt(envelope)).await.unwrap_err();
    assert_eq!(error_name(err), "DecryptionFailed");
}

// ============================================================================
// localStorage backend
// ============================================================================

#[wasm_bindgen_test]
fn browser_storage_lists_and_removes_keys() {
    let storage = BrowserStorage::local().unwrap();
    storage.set_item("tokenseal-web-b", "2").unwrap();
    storage.set_item("tokenseal-web-a", "1").unwrap();

    let keys = storage.keys().unwrap();
    assert!(keys.iter().any(|k| k == "tokenseal-web-a"));
    assert!(keys.iter().any(|k| k == "tokenseal-web-b"));
    assert_eq!(storage.get_item("tokenseal-web-a").unwrap().as_deref(), Some("1"));

    storage.remove_item("tokenseal-web-a").unwrap();
    storage.remove_item("tokenseal-web-b").unwrap();
    let keys = storage.keys().unwrap();
    assert!(!keys.iter().any(|k| k.starts_with("tokenseal-web-")));
    assert_eq!(storage.get_item("tokenseal-web-a").unwrap(), None);
}

#[wasm_bindgen_test]
async fn secure_storage_round_trips_and_discards_garbage() {
    let secure = WasmSecureStorage::new("test-fingerprint".into(), Some(ITERATIONS)).unwrap();
    JsFuture::from(secure.set_item("web_token".into(), "abc123".into()))
        .await
        .unwrap();
    let value = JsFuture::from(secure.get_item("web_token".into()))
        .await
        .unwrap();
    assert_eq!(value.as_string().as_deref(), Some("abc123"));

    let raw = BrowserStorage::local().unwrap();
    raw.set_item("secure_web_garbage", "not json").unwrap();
    let value = JsFuture::from(secure.get_item("web_garbage".into()))
        .await
        .unwrap();
    assert!(value.is_null());
    assert_eq!(raw.get_item("secure_web_garbage").unwrap(), None);

    secure.remove_item("web_token".into()).unwrap();
    assert_eq!(raw.get_item("secure_web_token").unwrap(), None);
}
