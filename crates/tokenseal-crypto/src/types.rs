use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Envelope format version written by `encrypt` and the only one `decrypt` accepts.
pub const ENVELOPE_VERSION: u32 = 1;

/// AES-GCM IV length in bytes (96 bits per NIST recommendation).
pub const AES_GCM_IV_LENGTH: usize = 12;

/// AES-GCM tag length in bytes (128 bits).
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// AES key length in bytes (256 bits).
pub const AES_KEY_LENGTH: usize = 32;

/// PBKDF2 salt length in bytes (128 bits).
pub const SALT_LENGTH: usize = 16;

/// Default PBKDF2-HMAC-SHA256 iteration count.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// Default byte length for `generate_secure_random` (64 hex characters).
pub const DEFAULT_RANDOM_LENGTH: usize = 32;

/// Tunables for the key derivation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CryptoConfig {
    /// PBKDF2 iteration count. Must be at least 1.
    pub pbkdf2_iterations: u32,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl CryptoConfig {
    pub fn with_iterations(pbkdf2_iterations: u32) -> Self {
        Self { pbkdf2_iterations }
    }

    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.pbkdf2_iterations == 0 {
            return Err(CryptoError::InvalidConfig(
                "pbkdf2_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse a JSON config object. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CryptoError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CryptoError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
