//! Error types for cryptographic operations.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The randomness source failed or was exhausted.
    #[error("Invalid source of randomness: {0}")]
    Randomness(String),

    /// Ciphertext has the wrong length or does not decode to group elements.
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Trapdoor has the wrong length or does not decode to group elements.
    #[error("Invalid trapdoor: {0}")]
    InvalidTrapdoor(String),

    /// Key bytes could not be decoded.
    #[error("Invalid key encoding: {0}")]
    InvalidEncoding(String),

    /// Hash-to-curve setup failed.
    #[error("Hash to group failed: {0}")]
    HashToGroup(String),

    /// Invalid keyfile format or contents.
    #[error("Invalid keyfile: {0}")]
    InvalidKeyfile(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

impl From<rand::Error> for CryptoError {
    fn from(err: rand::Error) -> Self {
        CryptoError::Randomness(err.to_string())
    }
}
