//! Standard (padded) Base64, the text encoding used for every envelope field.

use base64ct::{Base64, Encoding};

/// Base64 encode bytes with padding.
pub fn to_base64(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Base64 decode a padded string to bytes.
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64ct::Error> {
    Base64::decode_vec(s)
}
