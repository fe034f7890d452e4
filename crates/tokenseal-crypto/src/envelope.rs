//! SecureEnvelope: the versioned record persisted to storage.
//!
//! Wire format (JSON, field order fixed):
//! `{"version":1,"data":"<base64>","iv":"<base64>","salt":"<base64>"}`

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::types::ENVELOPE_VERSION;

/// Ciphertext bundle. Immutable once produced by `CryptoUtils::encrypt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureEnvelope {
    /// Format version; only `ENVELOPE_VERSION` is readable.
    pub version: u32,
    /// Base64 of ciphertext with the GCM tag appended.
    pub data: String,
    /// Base64 of the 12-byte IV.
    pub iv: String,
    /// Base64 of the 16-byte PBKDF2 salt.
    pub salt: String,
}

impl SecureEnvelope {
    /// Serialize to the storage JSON form.
    pub fn to_json(&self) -> Result<String, CryptoError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the storage JSON form.
    ///
    /// The version is read on its own first, so a record in any other format
    /// is `UnsupportedVersion` even when it lacks the v1 fields.
    pub fn from_json(json: &str) -> Result<Self, CryptoError> {
        let tag: EnvelopeVersion = serde_json::from_str(json)?;
        tag.check()?;
        Ok(serde_json::from_str(json)?)
    }
}

/// Just the `version` field of a stored envelope; other fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EnvelopeVersion {
    pub version: u32,
}

impl EnvelopeVersion {
    /// `UnsupportedVersion` unless this is the readable format.
    pub fn check(self) -> Result<(), CryptoError> {
        if self.version == ENVELOPE_VERSION {
            Ok(())
        } else {
            Err(CryptoError::UnsupportedVersion(self.version))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SecureEnvelope {
        SecureEnvelope {
            version: 1,
            data: "AAEC".into(),
            iv: "AAAAAAAAAAAAAAAA".into(),
            salt: "AAAAAAAAAAAAAAAAAAAAAA==".into(),
        }
    }

    #[test]
    fn json_shape_is_exact() {
        let json = sample().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"version":1,"data":"AAEC","iv":"AAAAAAAAAAAAAAAA","salt":"AAAAAAAAAAAAAAAAAAAAAA=="}"#
        );
    }

    #[test]
    fn foreign_versions_are_unsupported() {
        let err =
            SecureEnvelope::from_json(r#"{"version":2,"data":"","iv":"","salt":""}"#).unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedVersion(2)));
    }

    #[test]
    fn bare_foreign_version_is_unsupported() {
        for json in [r#"{"version":2}"#, r#"{"version":0,"payload":[1,2]}"#] {
            let err = SecureEnvelope::from_json(json).unwrap_err();
            assert!(matches!(err, CryptoError::UnsupportedVersion(_)), "{json}: {err}");
        }
    }

    #[test]
    fn missing_version_is_invalid() {
        let err = SecureEnvelope::from_json(r#"{"data":"AAEC"}"#).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidEnvelope(_)));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = SecureEnvelope::from_json(r#"{"version":1,"data":"AAEC"}"#).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidEnvelope(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(SecureEnvelope::from_json("not json").is_err());
    }
}
