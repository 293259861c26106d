//! Searchable ciphertext, trapdoor and matching test.
//!
//! # Construction
//!
//! With `g` the GT generator, `H` the keyword hash into G1 and `e` the
//! pairing, a sender with secret `a` writing to a receiver with public key
//! `B = g2 * b` under server public key `S = g * s` computes
//!
//! ```text
//! ct1 = g * r
//! ct2 = S * r + e(H(w), B * a)
//! ```
//!
//! and the receiver builds the trapdoor from the sender's public key
//! `A = g2 * a` with a fresh `r'`:
//!
//! ```text
//! t1 = g * r'
//! t2 = S * r' - e(H(w), A * b)
//! ```
//!
//! Both pairing terms equal `e(H(w), g2) * (a * b)`. They cancel in
//! `ct2 + t2` exactly when the keywords agree, leaving
//! `(ct1 + t1) * s == ct2 + t2`, which only the server can check.
//!
//! # Wire format
//!
//! Ciphertexts and trapdoors are two GT encodings back to back,
//! `2 * SIZE_GT` bytes, no separator or length prefix.

use ark_ec::Group;
use rand::{CryptoRng, RngCore};
use tracing::trace;

use crate::error::{CryptoError, CryptoResult};
use crate::peks::group::{decode, encode, hash_to_g1, pair, random_scalar, Gt, SIZE_GT};
use crate::peks::keys::{SecretKey, ServerPublicKey, UserPublicKey};

/// Byte length of a searchable ciphertext.
pub const CIPHERTEXT_SIZE: usize = 2 * SIZE_GT;

/// Byte length of a trapdoor.
pub const TRAPDOOR_SIZE: usize = 2 * SIZE_GT;

/// Terms shared by ciphertext and trapdoor construction.
struct Blinded {
    /// g * r
    blind: Gt,
    /// S * r
    server_term: Gt,
    /// e(H(w), other_public * my_secret)
    pairing_term: Gt,
}

fn encrypt_core<R>(
    keyword: &[u8],
    server: &ServerPublicKey,
    other: &UserPublicKey,
    mine: &SecretKey,
    rng: &mut R,
) -> CryptoResult<Blinded>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let r = random_scalar(rng)?;
    let blind = Gt::generator() * r;
    let h = hash_to_g1(keyword)?;
    let k = *other.point() * *mine.scalar();
    let pairing_term = pair(&h, &k);
    let server_term = *server.element() * r;

    Ok(Blinded {
        blind,
        server_term,
        pairing_term,
    })
}

fn concat(first: &Gt, second: &Gt) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 * SIZE_GT);
    out.extend_from_slice(&encode(first));
    out.extend_from_slice(&encode(second));
    out
}

/// Build the searchable ciphertext of a keyword (sender side).
///
/// # Arguments
///
/// * `keyword` - Keyword bytes
/// * `server` - Server public key
/// * `receiver` - Receiver's public key
/// * `sender` - Sender's own secret key
/// * `rng` - Randomness source for the blinding scalar
///
/// # Errors
///
/// Returns [`CryptoError::Randomness`] if the source fails.
pub fn peks<R>(
    keyword: &[u8],
    server: &ServerPublicKey,
    receiver: &UserPublicKey,
    sender: &SecretKey,
    rng: &mut R,
) -> CryptoResult<Vec<u8>>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let Blinded {
        blind,
        server_term,
        pairing_term,
    } = encrypt_core(keyword, server, receiver, sender, rng)?;

    let ct = concat(&blind, &(server_term + pairing_term));
    trace!(size = ct.len(), "Built searchable ciphertext");
    Ok(ct)
}

/// Build the trapdoor of a keyword (receiver side).
///
/// Same inputs as [`peks`] with the user roles swapped: the sender's public
/// key and the receiver's own secret key.
///
/// # Errors
///
/// Returns [`CryptoError::Randomness`] if the source fails.
pub fn trapdoor<R>(
    keyword: &[u8],
    server: &ServerPublicKey,
    sender: &UserPublicKey,
    receiver: &SecretKey,
    rng: &mut R,
) -> CryptoResult<Vec<u8>>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let Blinded {
        blind,
        server_term,
        pairing_term,
    } = encrypt_core(keyword, server, sender, receiver, rng)?;

    let td = concat(&blind, &(server_term - pairing_term));
    trace!(size = td.len(), "Built trapdoor");
    Ok(td)
}

/// Decoded halves of a ciphertext or trapdoor.
pub(crate) struct Halves(Gt, Gt);

fn split(bytes: &[u8], invalid: fn(String) -> CryptoError) -> CryptoResult<Halves> {
    // Length first, so slicing below stays in bounds
    if bytes.len() != 2 * SIZE_GT {
        return Err(invalid(format!(
            "expected {} bytes, got {}",
            2 * SIZE_GT,
            bytes.len()
        )));
    }
    let first: Gt = decode(&bytes[..SIZE_GT]).map_err(invalid)?;
    let second: Gt = decode(&bytes[SIZE_GT..]).map_err(invalid)?;
    Ok(Halves(first, second))
}

pub(crate) fn decode_ciphertext(bytes: &[u8]) -> CryptoResult<Halves> {
    split(bytes, CryptoError::InvalidCiphertext)
}

pub(crate) fn decode_trapdoor(bytes: &[u8]) -> CryptoResult<Halves> {
    split(bytes, CryptoError::InvalidTrapdoor)
}

pub(crate) fn test_decoded(ct: &Halves, td: &Halves, server: &SecretKey) -> bool {
    let s1 = ct.0 + td.0;
    let s2 = ct.1 + td.1;
    encode(&(s1 * *server.scalar())) == encode(&s2)
}

/// Test whether a ciphertext and a trapdoor carry the same keyword.
///
/// Only the server secret key is needed; the keyword is never recovered.
/// Pure function of its inputs, safe to call concurrently.
///
/// # Errors
///
/// - [`CryptoError::InvalidCiphertext`] if the ciphertext is not
///   [`CIPHERTEXT_SIZE`] bytes or does not decode
/// - [`CryptoError::InvalidTrapdoor`] likewise for the trapdoor
pub fn test(ciphertext: &[u8], trapdoor: &[u8], server: &SecretKey) -> CryptoResult<bool> {
    // Both lengths are checked before either side is decoded
    if ciphertext.len() != CIPHERTEXT_SIZE {
        return Err(CryptoError::InvalidCiphertext(format!(
            "expected {} bytes, got {}",
            CIPHERTEXT_SIZE,
            ciphertext.len()
        )));
    }
    if trapdoor.len() != TRAPDOOR_SIZE {
        return Err(CryptoError::InvalidTrapdoor(format!(
            "expected {} bytes, got {}",
            TRAPDOOR_SIZE,
            trapdoor.len()
        )));
    }
    let ct = decode_ciphertext(ciphertext)?;
    let td = decode_trapdoor(trapdoor)?;
    let matched = test_decoded(&ct, &td, server);
    trace!(matched, "Tested trapdoor");
    Ok(matched)
}
