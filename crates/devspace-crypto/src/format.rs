//! Shared format utilities.

use crate::error::{CryptoError, CryptoResult};

/// Encode bytes as lowercase hex.
pub fn hex_encode(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a hex string to bytes, ignoring surrounding whitespace.
///
/// `what` names the value in the error message.
pub fn hex_decode(data: &str, what: &str) -> CryptoResult<Vec<u8>> {
    hex::decode(data.trim())
        .map_err(|e| CryptoError::InvalidInput(format!("Invalid hex {}: {}", what, e)))
}
