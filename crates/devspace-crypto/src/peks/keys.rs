//! PEKS key types and key generation.
//!
//! This module provides:
//! - Secret scalar keys, shared by users and the server
//! - User public keys in G2 and server public keys in GT
//! - The [`Key`] enum tying the three kinds to one byte-level contract
//! - Key pair generation over an injectable randomness source
//!
//! # Security
//!
//! - Secret keys are zeroized on drop
//! - Zero scalars and identity public keys are rejected on decode

use ark_ec::Group;
use ark_ff::{BigInteger, PrimeField};
use ark_std::Zero;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::peks::group::{decode, encode, random_scalar, Gt, Scalar, G2, SIZE_G2, SIZE_GT};

/// Secret scalar key.
///
/// Used both by users (paired with a [`UserPublicKey`]) and by the server
/// (paired with a [`ServerPublicKey`]).
pub struct SecretKey(Scalar);

impl SecretKey {
    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }

    /// Minimal big-endian encoding of the scalar.
    pub fn to_bytes(&self) -> Vec<u8> {
        let full = self.0.into_bigint().to_bytes_be();
        let start = full.iter().position(|b| *b != 0).unwrap_or(full.len());
        full[start..].to_vec()
    }

    /// Parse big-endian bytes of any length, reducing modulo the group order.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] if the value reduces to zero.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let scalar = Scalar::from_be_bytes_mod_order(bytes);
        if scalar.is_zero() {
            return Err(CryptoError::InvalidEncoding(
                "secret key must not be zero".to_string(),
            ));
        }
        Ok(Self(scalar))
    }

    /// Copy of another secret key.
    pub fn from_secret(secret: &SecretKey) -> Self {
        Self(secret.0)
    }

    /// Derive the matching user public key.
    pub fn user_public_key(&self) -> UserPublicKey {
        UserPublicKey::from_secret(self)
    }

    /// Derive the matching server public key.
    pub fn server_public_key(&self) -> ServerPublicKey {
        ServerPublicKey::from_secret(self)
    }
}

impl Clone for SecretKey {
    fn clone(&self) -> Self {
        Self::from_secret(self)
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretKey {}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// User public key, a G2 point.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPublicKey(G2);

impl UserPublicKey {
    pub(crate) fn point(&self) -> &G2 {
        &self.0
    }

    /// Fixed-width compressed encoding ([`SIZE_G2`] bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(&self.0)
    }

    /// Decode a compressed G2 point.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] if the length is not
    /// [`SIZE_G2`], the point is not on the curve or in the subgroup, or it
    /// is the identity.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SIZE_G2 {
            return Err(CryptoError::InvalidEncoding(format!(
                "user public key must be {} bytes, got {}",
                SIZE_G2,
                bytes.len()
            )));
        }
        let point: G2 = decode(bytes).map_err(CryptoError::InvalidEncoding)?;
        if point.is_zero() {
            return Err(CryptoError::InvalidEncoding(
                "user public key is the identity".to_string(),
            ));
        }
        Ok(Self(point))
    }

    /// generator * secret in G2.
    pub fn from_secret(secret: &SecretKey) -> Self {
        Self(G2::generator() * *secret.scalar())
    }
}

impl std::fmt::Debug for UserPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserPublicKey({})", hex::encode(&self.to_bytes()[..8]))
    }
}

/// Server public key, a GT element.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerPublicKey(Gt);

impl ServerPublicKey {
    pub(crate) fn element(&self) -> &Gt {
        &self.0
    }

    /// Fixed-width encoding ([`SIZE_GT`] bytes).
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(&self.0)
    }

    /// Decode a GT element.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] if the length is not
    /// [`SIZE_GT`], the element is outside the prime-order subgroup, or it is
    /// the identity.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SIZE_GT {
            return Err(CryptoError::InvalidEncoding(format!(
                "server public key must be {} bytes, got {}",
                SIZE_GT,
                bytes.len()
            )));
        }
        let element: Gt = decode(bytes).map_err(CryptoError::InvalidEncoding)?;
        if element.is_zero() {
            return Err(CryptoError::InvalidEncoding(
                "server public key is the identity".to_string(),
            ));
        }
        Ok(Self(element))
    }

    /// generator * secret in GT.
    pub fn from_secret(secret: &SecretKey) -> Self {
        Self(Gt::generator() * *secret.scalar())
    }
}

impl std::fmt::Debug for ServerPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ServerPublicKey({})", hex::encode(&self.to_bytes()[..8]))
    }
}

/// The three kinds of key the scheme handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Secret scalar (user or server).
    Secret,
    /// User public key in G2.
    User,
    /// Server public key in GT.
    Server,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Secret => write!(f, "secret"),
            Self::User => write!(f, "user"),
            Self::Server => write!(f, "server"),
        }
    }
}

impl std::str::FromStr for KeyKind {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "secret" => Ok(Self::Secret),
            "user" => Ok(Self::User),
            "server" => Ok(Self::Server),
            _ => Err(CryptoError::InvalidInput(format!("Invalid key kind: {}", s))),
        }
    }
}

/// A key of any kind, for code that handles keys by their byte contract
/// (key files, CLI input) without caring which group they live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Secret(SecretKey),
    User(UserPublicKey),
    Server(ServerPublicKey),
}

impl Key {
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Secret(_) => KeyKind::Secret,
            Self::User(_) => KeyKind::User,
            Self::Server(_) => KeyKind::Server,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Secret(k) => k.to_bytes(),
            Self::User(k) => k.to_bytes(),
            Self::Server(k) => k.to_bytes(),
        }
    }

    /// Decode bytes as a key of the given kind.
    pub fn from_bytes(kind: KeyKind, bytes: &[u8]) -> CryptoResult<Self> {
        match kind {
            KeyKind::Secret => SecretKey::from_bytes(bytes).map(Self::Secret),
            KeyKind::User => UserPublicKey::from_bytes(bytes).map(Self::User),
            KeyKind::Server => ServerPublicKey::from_bytes(bytes).map(Self::Server),
        }
    }

    /// Derive a key of the given kind from a secret key.
    pub fn derive_from_secret(kind: KeyKind, secret: &SecretKey) -> Self {
        match kind {
            KeyKind::Secret => Self::Secret(SecretKey::from_secret(secret)),
            KeyKind::User => Self::User(UserPublicKey::from_secret(secret)),
            KeyKind::Server => Self::Server(ServerPublicKey::from_secret(secret)),
        }
    }

    pub fn into_secret(self) -> CryptoResult<SecretKey> {
        match self {
            Self::Secret(k) => Ok(k),
            other => Err(kind_mismatch(KeyKind::Secret, other.kind())),
        }
    }

    pub fn into_user(self) -> CryptoResult<UserPublicKey> {
        match self {
            Self::User(k) => Ok(k),
            other => Err(kind_mismatch(KeyKind::User, other.kind())),
        }
    }

    pub fn into_server(self) -> CryptoResult<ServerPublicKey> {
        match self {
            Self::Server(k) => Ok(k),
            other => Err(kind_mismatch(KeyKind::Server, other.kind())),
        }
    }
}

fn kind_mismatch(expected: KeyKind, got: KeyKind) -> CryptoError {
    CryptoError::InvalidKeyfile(format!("expected a {} key, got a {} key", expected, got))
}

/// User key pair.
pub struct UserKeypair {
    /// The public key (can be shared).
    pub public: UserPublicKey,
    /// The secret key (must be kept secret).
    pub secret: SecretKey,
}

impl UserKeypair {
    /// Generate a new random key pair.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Randomness`] if the source fails.
    pub fn generate<R>(rng: &mut R) -> CryptoResult<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let secret = SecretKey(random_scalar(rng)?);
        let public = secret.user_public_key();
        debug!(kind = %KeyKind::User, "Generated key pair");
        Ok(Self { public, secret })
    }

    /// Create a key pair from an existing secret key.
    pub fn from_secret(secret: SecretKey) -> Self {
        let public = secret.user_public_key();
        Self { public, secret }
    }
}

impl std::fmt::Debug for UserKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserKeypair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Server key pair.
pub struct ServerKeypair {
    /// The public key (published by the server).
    pub public: ServerPublicKey,
    /// The secret key (held by the server only).
    pub secret: SecretKey,
}

impl ServerKeypair {
    /// Generate a new random key pair.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Randomness`] if the source fails.
    pub fn generate<R>(rng: &mut R) -> CryptoResult<Self>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let secret = SecretKey(random_scalar(rng)?);
        let public = secret.server_public_key();
        debug!(kind = %KeyKind::Server, "Generated key pair");
        Ok(Self { public, secret })
    }

    /// Create a key pair from an existing secret key.
    pub fn from_secret(secret: SecretKey) -> Self {
        let public = secret.server_public_key();
        Self { public, secret }
    }
}

impl std::fmt::Debug for ServerKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKeypair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Generate a user (secret, public) pair.
pub fn generate_user_keys<R>(rng: &mut R) -> CryptoResult<(SecretKey, UserPublicKey)>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let UserKeypair { public, secret } = UserKeypair::generate(rng)?;
    Ok((secret, public))
}

/// Generate a server (secret, public) pair.
pub fn generate_server_keys<R>(rng: &mut R) -> CryptoResult<(SecretKey, ServerPublicKey)>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let ServerKeypair { public, secret } = ServerKeypair::generate(rng)?;
    Ok((secret, public))
}
