//! BLS12-381 group aliases, encoding sizes, and the sampling and hashing
//! helpers shared by key generation and the PEKS engine.
//!
//! Roles of the three pairing groups:
//!
//! | Group | Used for                                   | Encoding |
//! |-------|--------------------------------------------|----------|
//! | G1    | keyword hash                               | 48 bytes |
//! | G2    | user public keys, shared secrets           | 96 bytes |
//! | GT    | server public keys, ciphertext halves      | 576 bytes|

use ark_bls12_381::{g1, Bls12_381, Fr, G1Affine, G1Projective, G2Projective};
use ark_ec::hashing::curve_maps::wb::WBMap;
use ark_ec::hashing::map_to_curve_hasher::MapToCurveBasedHasher;
use ark_ec::hashing::HashToCurve;
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ec::CurveGroup;
use ark_ff::field_hashers::DefaultFieldHasher;
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::Zero;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};

/// Scalar field of the pairing groups.
pub type Scalar = Fr;
/// Source group the keyword hash lives in.
pub type G1 = G1Projective;
/// Source group user public keys live in.
pub type G2 = G2Projective;
/// Pairing target group.
pub type Gt = PairingOutput<Bls12_381>;

/// Compressed encoding size of a G1 element.
pub const SIZE_G1: usize = 48;
/// Compressed encoding size of a G2 element (user public key).
pub const SIZE_G2: usize = 96;
/// Compressed encoding size of a GT element (server public key).
pub const SIZE_GT: usize = 576;
/// Maximum encoding size of a secret scalar.
pub const SIZE_SK: usize = 32;

/// Domain separation tag for hashing keywords into G1.
///
/// Sender and receiver must agree on it, so it is fixed.
pub const KEYWORD_DST: &[u8] = b"DEVSPACE-PEKS-V01-CS01-with-BLS12381G1_XMD:SHA-256_SSWU_RO_";

type KeywordHasher =
    MapToCurveBasedHasher<G1Projective, DefaultFieldHasher<Sha256, 128>, WBMap<g1::Config>>;

/// Draw a uniformly random non-zero scalar.
///
/// Reads 64 bytes and reduces them modulo the group order, which keeps the
/// bias negligible. Any failure of the source is reported as
/// [`CryptoError::Randomness`].
pub fn random_scalar<R>(rng: &mut R) -> CryptoResult<Scalar>
where
    R: RngCore + CryptoRng + ?Sized,
{
    loop {
        let mut wide = [0u8; 64];
        rng.try_fill_bytes(&mut wide)?;
        let scalar = Scalar::from_le_bytes_mod_order(&wide);
        wide.zeroize();
        if !scalar.is_zero() {
            return Ok(scalar);
        }
    }
}

/// Hash arbitrary keyword bytes into G1.
pub fn hash_to_g1(keyword: &[u8]) -> CryptoResult<G1Affine> {
    let hasher = KeywordHasher::new(KEYWORD_DST)
        .map_err(|e| CryptoError::HashToGroup(format!("{:?}", e)))?;
    hasher
        .hash(keyword)
        .map_err(|e| CryptoError::HashToGroup(format!("{:?}", e)))
}

/// Bilinear map e: G1 x G2 -> GT.
pub fn pair(h: &G1Affine, k: &G2) -> Gt {
    Bls12_381::pairing(*h, k.into_affine())
}

/// Compressed, canonical encoding of a group element.
pub(crate) fn encode<T: CanonicalSerialize>(value: &T) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.compressed_size());
    value
        .serialize_compressed(&mut out)
        .expect("compressed serialization into a Vec failed");
    out
}

/// Decode a compressed element, running the curve and subgroup checks.
///
/// Callers are responsible for checking the length first.
pub(crate) fn decode<T: CanonicalDeserialize>(bytes: &[u8]) -> Result<T, String> {
    T::deserialize_compressed(bytes).map_err(|e| e.to_string())
}
