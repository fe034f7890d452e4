//! Encrypt/decrypt facade tying key derivation, AES-GCM and Base64 together.

use std::sync::Arc;

use tracing::debug;
use zeroize::Zeroizing;

use crate::aes_gcm::{aes_gcm_decrypt, aes_gcm_encrypt, generate_iv};
use crate::base64::{from_base64, to_base64};
use crate::capability::{CapabilityProbe, PlatformProbe};
use crate::envelope::SecureEnvelope;
use crate::error::{CryptoError, PrimitiveError};
use crate::kdf::{DerivedKey, KeyDeriver, Pbkdf2Deriver};
use crate::key_cache::KeyCache;
use crate::random::{random_array, secure_random_hex};
use crate::types::{CryptoConfig, AES_GCM_IV_LENGTH, ENVELOPE_VERSION, SALT_LENGTH};

/// Encrypts and decrypts strings into `SecureEnvelope`s under a key derived
/// from a browser fingerprint.
///
/// Each instance owns its own key cache. Share one instance (behind `Arc`)
/// per session so the derived key is reused across calls.
///
/// The fingerprint passphrase protects stored tokens against casual local
/// inspection; it does not hold up against code running on the same origin.
pub struct CryptoUtils {
    passphrase: Zeroizing<String>,
    deriver: Arc<dyn KeyDeriver>,
    probe: Arc<dyn CapabilityProbe>,
    cache: KeyCache,
}

impl CryptoUtils {
    /// PBKDF2 deriver and platform probe with the given config.
    pub fn new(fingerprint: impl Into<String>, config: &CryptoConfig) -> Result<Self, CryptoError> {
        config.validate()?;
        Ok(Self::with_components(
            fingerprint,
            Arc::new(Pbkdf2Deriver::from_config(config)),
            Arc::new(PlatformProbe),
        ))
    }

    /// Build with explicit collaborators (custom deriver or capability probe).
    pub fn with_components(
        fingerprint: impl Into<String>,
        deriver: Arc<dyn KeyDeriver>,
        probe: Arc<dyn CapabilityProbe>,
    ) -> Self {
        Self {
            passphrase: Zeroizing::new(fingerprint.into()),
            deriver,
            probe,
            cache: KeyCache::new(),
        }
    }

    /// Whether the host currently supports the required primitives.
    pub fn is_supported(&self) -> bool {
        self.probe.is_supported()
    }

    fn ensure_supported(&self) -> Result<(), CryptoError> {
        if self.probe.is_supported() {
            Ok(())
        } else {
            Err(CryptoError::UnsupportedEnvironment)
        }
    }

    /// Encrypt a string into a fresh envelope.
    ///
    /// Reuses the cached key and salt when present; the IV is always new.
    pub async fn encrypt(&self, plaintext: &str) -> Result<SecureEnvelope, CryptoError> {
        self.ensure_supported()?;
        self.seal(plaintext)
            .await
            .map_err(CryptoError::EncryptionFailed)
    }

    async fn seal(&self, plaintext: &str) -> Result<SecureEnvelope, PrimitiveError> {
        let (key, salt) = match self.cache.current() {
            Some(cached) => cached,
            None => {
                let salt: [u8; SALT_LENGTH] = random_array()?;
                let key = self.derive(&salt).await?;
                (key, salt)
            }
        };

        let iv = generate_iv()?;
        let ciphertext = aes_gcm_encrypt(&key, &iv, plaintext.as_bytes())?;

        Ok(SecureEnvelope {
            version: ENVELOPE_VERSION,
            data: to_base64(&ciphertext),
            iv: to_base64(&iv),
            salt: to_base64(&salt),
        })
    }

    /// Decrypt an envelope back to its string.
    ///
    /// `DecryptionFailed` means the stored data is corrupted or was tampered
    /// with; callers should discard it rather than retry.
    pub async fn decrypt(&self, envelope: &SecureEnvelope) -> Result<String, CryptoError> {
        self.ensure_supported()?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(CryptoError::UnsupportedVersion(envelope.version));
        }
        self.open(envelope)
            .await
            .map_err(CryptoError::DecryptionFailed)
    }

    async fn open(&self, envelope: &SecureEnvelope) -> Result<String, PrimitiveError> {
        let ciphertext = decode_field("data", &envelope.data)?;
        let iv = decode_field("iv", &envelope.iv)?;
        let salt = decode_field("salt", &envelope.salt)?;

        if iv.len() != AES_GCM_IV_LENGTH {
            return Err(PrimitiveError::InvalidLength {
                field: "iv",
                expected: AES_GCM_IV_LENGTH,
                got: iv.len(),
            });
        }
        let salt: [u8; SALT_LENGTH] = salt.as_slice().try_into().map_err(|_| {
            PrimitiveError::InvalidLength {
                field: "salt",
                expected: SALT_LENGTH,
                got: salt.len(),
            }
        })?;

        let key = match self.cache.key_for_salt(&salt) {
            Some(key) => key,
            None => self.derive(&salt).await?,
        };

        let plaintext = Zeroizing::new(aes_gcm_decrypt(&key, &iv, &ciphertext)?);
        Ok(String::from_utf8(plaintext.to_vec())?)
    }

    async fn derive(&self, salt: &[u8; SALT_LENGTH]) -> Result<Arc<DerivedKey>, PrimitiveError> {
        debug!("deriving storage encryption key");
        let key = Arc::new(self.deriver.derive_key(&self.passphrase, salt).await?);
        self.cache.store(Arc::clone(&key), *salt);
        Ok(key)
    }

    /// Random lowercase hex string of `length * 2` characters. Independent of
    /// the key cache.
    pub fn generate_secure_random(&self, length: usize) -> Result<String, CryptoError> {
        secure_random_hex(length)
    }

    /// Forget the cached key and salt. No-op when nothing is cached.
    pub fn clear_master_key(&self) {
        if self.cache.clear() {
            debug!("cleared cached storage encryption key");
        }
    }

    pub fn has_cached_key(&self) -> bool {
        self.cache.is_cached()
    }
}

impl std::fmt::Debug for CryptoUtils {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoUtils")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, PrimitiveError> {
    from_base64(value).map_err(|source| PrimitiveError::Base64 { field, source })
}
