//! Diffie-Hellman shared secret between two users.
//!
//! Both users hold a G2 key pair. Either side multiplies the other side's
//! public key by its own secret scalar; the two results are the same point
//! `g2 * (a * b)`, so each user can compute the shared secret independently.
//!
//! PEKS itself does not use this; it is offered on the same key material for
//! callers that need a pairwise secret.

use ark_ec::CurveGroup;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::peks::group::encode;
use crate::peks::keys::{SecretKey, UserPublicKey};

/// Shared secret, the compressed encoding of a G2 point.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Get the raw bytes of the shared secret.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Combine their public key with our secret key.
///
/// The result is the same whether computed as:
/// - derive_shared(their_public, our_secret)
/// - derive_shared(our_public, their_secret)
pub fn derive_shared(their_public: &UserPublicKey, our_secret: &SecretKey) -> SharedSecret {
    let point = (*their_public.point() * *our_secret.scalar()).into_affine();
    SharedSecret(encode(&point))
}
