//! AES-256-GCM over raw byte buffers.
//!
//! Output layout is `ciphertext || tag` (tag is the trailing 16 bytes); the IV
//! travels separately in the envelope.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::error::PrimitiveError;
use crate::kdf::DerivedKey;
use crate::random::random_array;
use crate::types::{AES_GCM_IV_LENGTH, AES_GCM_TAG_LENGTH, AES_KEY_LENGTH};

/// Generate a random 12-byte IV for AES-GCM.
pub fn generate_iv() -> Result<[u8; AES_GCM_IV_LENGTH], PrimitiveError> {
    random_array()
}

fn check_iv(iv: &[u8]) -> Result<(), PrimitiveError> {
    if iv.len() != AES_GCM_IV_LENGTH {
        return Err(PrimitiveError::InvalidLength {
            field: "iv",
            expected: AES_GCM_IV_LENGTH,
            got: iv.len(),
        });
    }
    Ok(())
}

fn new_cipher(key: &DerivedKey) -> Result<Aes256Gcm, PrimitiveError> {
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| PrimitiveError::InvalidLength {
        field: "key",
        expected: AES_KEY_LENGTH,
        got: key.as_bytes().len(),
    })
}

/// Encrypt `plaintext` under `key` and `iv`. Returns ciphertext with the tag appended.
pub fn aes_gcm_encrypt(
    key: &DerivedKey,
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, PrimitiveError> {
    check_iv(iv)?;
    let cipher = new_cipher(key)?;
    cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| PrimitiveError::Aead)
}

/// Decrypt `ciphertext || tag`. Fails when the tag does not verify.
pub fn aes_gcm_decrypt(
    key: &DerivedKey,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, PrimitiveError> {
    check_iv(iv)?;
    if ciphertext.len() < AES_GCM_TAG_LENGTH {
        return Err(PrimitiveError::InvalidLength {
            field: "ciphertext",
            expected: AES_GCM_TAG_LENGTH,
            got: ciphertext.len(),
        });
    }
    let cipher = new_cipher(key)?;
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| PrimitiveError::Aead)
}
