use thiserror::Error;

/// Public failure kinds of the crypto layer.
///
/// Every cryptographic failure reaches the caller as one of these; nothing is
/// retried or swallowed here.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Required cryptographic primitives are not available in this environment")]
    UnsupportedEnvironment,

    #[error("Unsupported encryption version: {0}")]
    UnsupportedVersion(u32),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(#[source] PrimitiveError),

    #[error("Decryption failed - data may be corrupted or tampered with: {0}")]
    DecryptionFailed(#[source] PrimitiveError),

    #[error("Random number generation failed: {0}")]
    RandomFailed(#[source] getrandom::Error),

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CryptoError {
    /// True for failures that mean the stored data itself is unusable.
    ///
    /// A missing capability or a failed key derivation / RNG call says
    /// nothing about the record, so those are not corruption.
    pub fn is_corruption(&self) -> bool {
        match self {
            CryptoError::UnsupportedVersion(_) | CryptoError::InvalidEnvelope(_) => true,
            CryptoError::DecryptionFailed(cause) => !matches!(
                cause,
                PrimitiveError::Kdf(_) | PrimitiveError::Rng(_)
            ),
            _ => false,
        }
    }
}

/// Underlying cause carried by `EncryptionFailed` / `DecryptionFailed`.
#[derive(Debug, Error)]
pub enum PrimitiveError {
    #[error("random number generation failed: {0}")]
    Rng(getrandom::Error),

    #[error("invalid {field} length: expected {expected} bytes, got {got}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("AES-GCM operation failed")]
    Aead,

    #[error("invalid base64 in {field}: {source}")]
    Base64 {
        field: &'static str,
        source: base64ct::Error,
    },

    #[error("plaintext is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn decryption_message_mentions_tampering() {
        let err = CryptoError::DecryptionFailed(PrimitiveError::Aead);
        assert!(err.to_string().contains("may be corrupted or tampered with"));
    }

    #[test]
    fn cause_is_preserved() {
        let err = CryptoError::EncryptionFailed(PrimitiveError::Kdf("boom".into()));
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "key derivation failed: boom");
    }

    #[test]
    fn corruption_classification() {
        assert!(CryptoError::UnsupportedVersion(2).is_corruption());
        assert!(CryptoError::DecryptionFailed(PrimitiveError::Aead).is_corruption());
        assert!(!CryptoError::UnsupportedEnvironment.is_corruption());
        assert!(!CryptoError::EncryptionFailed(PrimitiveError::Aead).is_corruption());
        assert!(CryptoError::DecryptionFailed(PrimitiveError::Utf8(
            String::from_utf8(vec![0xff]).unwrap_err()
        ))
        .is_corruption());
    }

    #[test]
    fn derivation_failures_are_not_corruption() {
        assert!(!CryptoError::DecryptionFailed(PrimitiveError::Kdf("busy".into())).is_corruption());
        assert!(!CryptoError::DecryptionFailed(PrimitiveError::Rng(getrandom::Error::UNSUPPORTED))
            .is_corruption());
    }
}
