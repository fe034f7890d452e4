//! CSPRNG-backed random bytes and hex strings.

use crate::error::{CryptoError, PrimitiveError};
use crate::types::DEFAULT_RANDOM_LENGTH;

fn map_rng_error(e: getrandom::Error) -> CryptoError {
    if e == getrandom::Error::UNSUPPORTED {
        CryptoError::UnsupportedEnvironment
    } else {
        CryptoError::RandomFailed(e)
    }
}

/// Fill a fixed-size array from the platform CSPRNG.
pub(crate) fn random_array<const N: usize>() -> Result<[u8; N], PrimitiveError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf).map_err(PrimitiveError::Rng)?;
    Ok(buf)
}

/// Return `n` cryptographically random bytes.
pub fn random_bytes(n: usize) -> Result<Vec<u8>, CryptoError> {
    let mut buf = vec![0u8; n];
    getrandom::getrandom(&mut buf).map_err(map_rng_error)?;
    Ok(buf)
}

/// Lowercase hex encoding of `length` random bytes (`length * 2` characters).
pub fn secure_random_hex(length: usize) -> Result<String, CryptoError> {
    Ok(hex::encode(random_bytes(length)?))
}

/// `secure_random_hex` with the default length of 32 bytes.
pub fn default_secure_random_hex() -> Result<String, CryptoError> {
    secure_random_hex(DEFAULT_RANDOM_LENGTH)
}
