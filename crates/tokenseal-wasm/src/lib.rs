//! Browser bindings: `CryptoUtils` and a `localStorage`-backed `SecureStorage`.

pub mod crypto;
pub mod error;
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod subtle;

use wasm_bindgen::prelude::*;

/// Route Rust panics to `console.error`. Safe to call more than once.
#[wasm_bindgen(js_name = "initPanicHook")]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}
