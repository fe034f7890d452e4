//! Client-side encryption for tokens kept in browser-style key-value storage.
//!
//! Strings are sealed into versioned [`SecureEnvelope`]s with AES-256-GCM
//! under a key derived (PBKDF2-HMAC-SHA256) from a browser fingerprint. The
//! derived key is cached per [`CryptoUtils`] instance until
//! [`CryptoUtils::clear_master_key`].

pub mod aes_gcm;
pub mod base64;
pub mod capability;
pub mod crypto_utils;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod key_cache;
pub mod random;
pub mod types;

pub use crate::aes_gcm::{aes_gcm_decrypt, aes_gcm_encrypt, generate_iv};
pub use base64::{from_base64, to_base64};
pub use capability::{is_supported, CapabilityProbe, PlatformProbe};
pub use crypto_utils::CryptoUtils;
pub use envelope::{EnvelopeVersion, SecureEnvelope};
pub use error::{CryptoError, PrimitiveError};
pub use kdf::{derive_pbkdf2, DerivedKey, KeyDeriver, Pbkdf2Deriver};
pub use key_cache::KeyCache;
pub use random::{default_secure_random_hex, random_bytes, secure_random_hex};
pub use types::{
    CryptoConfig, AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH, DEFAULT_PBKDF2_ITERATIONS,
    DEFAULT_RANDOM_LENGTH, ENVELOPE_VERSION, SALT_LENGTH,
};
