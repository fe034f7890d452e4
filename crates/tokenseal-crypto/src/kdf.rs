//! PBKDF2-HMAC-SHA256 key derivation from the browser fingerprint.

use async_trait::async_trait;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::PrimitiveError;
use crate::types::{CryptoConfig, AES_KEY_LENGTH, SALT_LENGTH};

/// 256-bit AES key material. Zeroized on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; AES_KEY_LENGTH]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; AES_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// Turns a passphrase and salt into AES key material.
///
/// Async so hosts with an asynchronous crypto backend (the browser's
/// `SubtleCrypto`) can derive off the event loop, and so tests can inject a
/// counting or failing deriver. On wasm32 the returned future is not `Send`,
/// since JS promises are bound to their thread.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait KeyDeriver: Send + Sync {
    async fn derive_key(&self, passphrase: &str, salt: &[u8]) -> Result<DerivedKey, PrimitiveError>;
}

/// PBKDF2 with SHA-256 and a configurable iteration count.
///
/// Runs every round inline in `poll`: at the default count the calling task
/// is occupied for the whole derivation and nothing else on a single-threaded
/// executor makes progress. Browser builds use the `SubtleCrypto` deriver from
/// `tokenseal-wasm` instead; native callers that share an executor with
/// latency-sensitive work should run the first encrypt/decrypt of a session
/// on a blocking pool.
#[derive(Debug, Clone)]
pub struct Pbkdf2Deriver {
    iterations: u32,
}

impl Pbkdf2Deriver {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn from_config(config: &CryptoConfig) -> Self {
        Self::new(config.pbkdf2_iterations)
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for Pbkdf2Deriver {
    fn default() -> Self {
        Self::from_config(&CryptoConfig::default())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl KeyDeriver for Pbkdf2Deriver {
    async fn derive_key(&self, passphrase: &str, salt: &[u8]) -> Result<DerivedKey, PrimitiveError> {
        derive_pbkdf2(passphrase, salt, self.iterations)
    }
}

/// Derive a 256-bit key with PBKDF2-HMAC-SHA256.
///
/// # Arguments
/// * `passphrase` - Browser fingerprint string (never persisted)
/// * `salt` - 16-byte salt
/// * `iterations` - PBKDF2 round count, at least 1
pub fn derive_pbkdf2(
    passphrase: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<DerivedKey, PrimitiveError> {
    if salt.len() != SALT_LENGTH {
        return Err(PrimitiveError::InvalidLength {
            field: "salt",
            expected: SALT_LENGTH,
            got: salt.len(),
        });
    }
    if iterations == 0 {
        return Err(PrimitiveError::Kdf("iteration count must be at least 1".into()));
    }
    let mut okm = [0u8; AES_KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut okm);
    let key = DerivedKey(okm);
    okm.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: [u8; SALT_LENGTH] = [7u8; SALT_LENGTH];

    #[test]
    fn deterministic() {
        let a = derive_pbkdf2("fingerprint", &SALT, 10).unwrap();
        let b = derive_pbkdf2("fingerprint", &SALT, 10).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salts_different_keys() {
        let a = derive_pbkdf2("fingerprint", &[1u8; SALT_LENGTH], 10).unwrap();
        let b = derive_pbkdf2("fingerprint", &[2u8; SALT_LENGTH], 10).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_passphrases_different_keys() {
        let a = derive_pbkdf2("browser-a", &SALT, 10).unwrap();
        let b = derive_pbkdf2("browser-b", &SALT, 10).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn iterations_change_output() {
        let a = derive_pbkdf2("fingerprint", &SALT, 10).unwrap();
        let b = derive_pbkdf2("fingerprint", &SALT, 11).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn rfc7914_vector() {
        // PBKDF2-HMAC-SHA256("passwd", "salt", 1), first 32 bytes of the RFC 7914 vector
        let mut okm = [0u8; 32];
        pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut okm);
        assert_eq!(
            hex::encode(okm),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn rejects_wrong_salt_length() {
        let err = derive_pbkdf2("fingerprint", &[0u8; 8], 10).unwrap_err();
        assert!(err.to_string().contains("invalid salt length"));
    }

    #[test]
    fn rejects_zero_iterations() {
        assert!(derive_pbkdf2("fingerprint", &SALT, 0).is_err());
    }

    #[test]
    fn debug_does_not_leak() {
        let key = DerivedKey::from_bytes([0xab; AES_KEY_LENGTH]);
        assert_eq!(format!("{key:?}"), "DerivedKey(..)");
    }

    #[tokio::test]
    async fn trait_impl_uses_configured_iterations() {
        let deriver = Pbkdf2Deriver::new(10);
        let via_trait = deriver.derive_key("fingerprint", &SALT).await.unwrap();
        let direct = derive_pbkdf2("fingerprint", &SALT, 10).unwrap();
        assert_eq!(via_trait.as_bytes(), direct.as_bytes());
    }
}
