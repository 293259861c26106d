//! Integration tests for the PEKS system.
//!
//! This test suite validates:
//! - Key generation and public key derivation
//! - Shared secret agreement
//! - Ciphertext/trapdoor matching and wire lengths
//! - Tag matching over a namespace
//! - Behavior when the randomness source fails
//! - Key file persistence

use devspace_crypto::peks::{
    derive_shared, find_matching_tag, generate_server_keys, generate_user_keys, load_key, peks,
    save_key, test, trapdoor, Key, KeyKind, SecretKey, ServerKeypair, ServerPublicKey, TagRecord,
    TagSet, UserKeypair, UserPublicKey, CIPHERTEXT_SIZE, DEFAULT_TAG, SIZE_G2, SIZE_GT, SIZE_SK,
    TRAPDOOR_SIZE,
};
use devspace_crypto::CryptoError;
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use tempfile::tempdir;

/// Randomness source that always fails.
struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        panic!("infallible draw from FailingRng")
    }

    fn next_u64(&mut self) -> u64 {
        panic!("infallible draw from FailingRng")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        panic!("infallible draw from FailingRng")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "entropy source unavailable",
        )))
    }
}

impl CryptoRng for FailingRng {}

struct World {
    rng: StdRng,
    server: ServerKeypair,
    alice: UserKeypair,
    bob: UserKeypair,
}

impl World {
    fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            server: ServerKeypair::generate(&mut rng).unwrap(),
            alice: UserKeypair::generate(&mut rng).unwrap(),
            bob: UserKeypair::generate(&mut rng).unwrap(),
            rng,
        }
    }

    /// Alice writes to Bob.
    fn ciphertext(&mut self, keyword: &[u8]) -> Vec<u8> {
        peks(
            keyword,
            &self.server.public,
            &self.bob.public,
            &self.alice.secret,
            &mut self.rng,
        )
        .unwrap()
    }

    /// Bob searches for Alice's messages.
    fn trapdoor(&mut self, keyword: &[u8]) -> Vec<u8> {
        trapdoor(
            keyword,
            &self.server.public,
            &self.alice.public,
            &self.bob.secret,
            &mut self.rng,
        )
        .unwrap()
    }
}

// ============================================================================
// Test Category 1: Keys
// ============================================================================

#[test]
fn test_generated_public_keys_match_derivation() {
    let mut rng = StdRng::seed_from_u64(100);

    let (sk, pk) = generate_user_keys(&mut rng).unwrap();
    assert_eq!(pk, UserPublicKey::from_secret(&sk));
    assert_eq!(pk.to_bytes().len(), SIZE_G2);

    let (sk, pk) = generate_server_keys(&mut rng).unwrap();
    assert_eq!(pk, ServerPublicKey::from_secret(&sk));
    assert_eq!(pk.to_bytes().len(), SIZE_GT);
    assert!(sk.to_bytes().len() <= SIZE_SK);
}

#[test]
fn test_key_bytes_roundtrip_through_kinds() {
    let mut rng = StdRng::seed_from_u64(101);
    let kp = UserKeypair::generate(&mut rng).unwrap();

    for kind in [KeyKind::Secret, KeyKind::User, KeyKind::Server] {
        let key = Key::derive_from_secret(kind, &kp.secret);
        let decoded = Key::from_bytes(kind, &key.to_bytes()).unwrap();
        assert_eq!(decoded, key);
    }
}

#[test]
fn test_zero_secret_rejected() {
    let result = SecretKey::from_bytes(&[0u8; SIZE_SK]);
    assert!(matches!(result, Err(CryptoError::InvalidEncoding(_))));
}

#[test]
fn test_shared_secret_agreement() {
    let w = World::new(102);

    let ab = derive_shared(&w.bob.public, &w.alice.secret);
    let ba = derive_shared(&w.alice.public, &w.bob.secret);
    assert_eq!(ab.as_bytes(), ba.as_bytes());
    assert_eq!(ab.as_bytes().len(), SIZE_G2);
}

// ============================================================================
// Test Category 2: Matching
// ============================================================================

#[test]
fn test_matching_and_non_matching_keywords() {
    let mut w = World::new(103);
    let ct = w.ciphertext(b"deploy");

    let td_same = w.trapdoor(b"deploy");
    let td_other = w.trapdoor(b"rollback");

    assert!(test(&ct, &td_same, &w.server.secret).unwrap());
    assert!(!test(&ct, &td_other, &w.server.secret).unwrap());
}

#[test]
fn test_keywords_are_raw_bytes() {
    let mut w = World::new(104);
    let ct = w.ciphertext(b"Deploy");
    let td = w.trapdoor(b"deploy");

    assert!(!test(&ct, &td, &w.server.secret).unwrap());

    let binary = [0u8, 159, 146, 150];
    let ct = w.ciphertext(&binary);
    let td = w.trapdoor(&binary);
    assert!(test(&ct, &td, &w.server.secret).unwrap());
}

#[test]
fn test_wire_lengths() {
    let mut w = World::new(105);
    assert_eq!(CIPHERTEXT_SIZE, 1152);
    assert_eq!(TRAPDOOR_SIZE, 1152);
    assert_eq!(w.ciphertext(b"x").len(), CIPHERTEXT_SIZE);
    assert_eq!(w.trapdoor(b"x").len(), TRAPDOOR_SIZE);
}

#[test]
fn test_user_roles_are_symmetric() {
    let mut w = World::new(106);
    let ct = w.ciphertext(b"deploy");

    // Built by Alice with Bob's public key instead of by Bob
    let td = trapdoor(
        b"deploy",
        &w.server.public,
        &w.bob.public,
        &w.alice.secret,
        &mut w.rng,
    )
    .unwrap();

    assert!(test(&ct, &td, &w.server.secret).unwrap());
}

#[test]
fn test_malformed_inputs_are_errors() {
    let mut w = World::new(107);
    let ct = w.ciphertext(b"deploy");
    let td = w.trapdoor(b"deploy");

    assert!(matches!(
        test(&ct[..CIPHERTEXT_SIZE - 1], &td, &w.server.secret),
        Err(CryptoError::InvalidCiphertext(_))
    ));
    assert!(matches!(
        test(&ct, &[td.as_slice(), &[0u8][..]].concat(), &w.server.secret),
        Err(CryptoError::InvalidTrapdoor(_))
    ));
    assert!(matches!(
        test(&[], &[], &w.server.secret),
        Err(CryptoError::InvalidCiphertext(_))
    ));
}

// ============================================================================
// Test Category 3: Tag matching
// ============================================================================

#[test]
fn test_tag_matching_is_deterministic() {
    let mut w = World::new(108);
    let tags = vec![
        TagRecord::new("A", w.trapdoor(b"w1")),
        TagRecord::new("B", w.trapdoor(b"w1")),
        TagRecord::new("C", w.trapdoor(b"w2")),
    ];

    let ct = w.ciphertext(b"w1");
    for _ in 0..3 {
        assert_eq!(find_matching_tag(&ct, &w.server.secret, &tags).unwrap(), "A");
    }

    let ct = w.ciphertext(b"w2");
    assert_eq!(find_matching_tag(&ct, &w.server.secret, &tags).unwrap(), "C");

    let ct = w.ciphertext(b"w3");
    assert_eq!(
        find_matching_tag(&ct, &w.server.secret, &tags).unwrap(),
        DEFAULT_TAG
    );
}

#[test]
fn test_scan_stops_at_first_match() {
    let mut w = World::new(113);
    let tags = vec![
        TagRecord::new("A", w.trapdoor(b"w1")),
        TagRecord::new("broken", vec![1, 2, 3]),
    ];

    let ct = w.ciphertext(b"w1");
    assert_eq!(find_matching_tag(&ct, &w.server.secret, &tags).unwrap(), "A");

    // A keyword that matches nothing reaches the malformed entry
    let ct = w.ciphertext(b"w2");
    assert!(matches!(
        find_matching_tag(&ct, &w.server.secret, &tags),
        Err(CryptoError::InvalidTrapdoor(_))
    ));
}

#[test]
fn test_tag_set_survives_json() {
    let mut w = World::new(109);
    let mut set = TagSet::new();
    set.register("alerts", w.trapdoor(b"pager")).unwrap();
    set.register("digest", w.trapdoor(b"weekly")).unwrap();

    let json = serde_json::to_string(&set).unwrap();
    let restored: TagSet = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, set);

    let ct = w.ciphertext(b"weekly");
    assert_eq!(
        restored.find_matching_tag(&ct, &w.server.secret).unwrap(),
        "digest"
    );
}

// ============================================================================
// Test Category 4: Randomness failure
// ============================================================================

#[test]
fn test_failing_rng_surfaces_error() {
    let w = World::new(110);

    assert!(matches!(
        UserKeypair::generate(&mut FailingRng),
        Err(CryptoError::Randomness(_))
    ));
    assert!(matches!(
        generate_server_keys(&mut FailingRng),
        Err(CryptoError::Randomness(_))
    ));
    assert!(matches!(
        peks(
            b"k",
            &w.server.public,
            &w.bob.public,
            &w.alice.secret,
            &mut FailingRng
        ),
        Err(CryptoError::Randomness(_))
    ));
    assert!(matches!(
        trapdoor(
            b"k",
            &w.server.public,
            &w.alice.public,
            &w.bob.secret,
            &mut FailingRng
        ),
        Err(CryptoError::Randomness(_))
    ));
}

// ============================================================================
// Test Category 5: Key persistence
// ============================================================================

#[test]
fn test_persisted_keys_still_match() {
    let dir = tempdir().unwrap();
    let mut w = World::new(111);

    let server_pub = dir.path().join("server.pub");
    let server_key = dir.path().join("server.key");
    let bob_pub = dir.path().join("bob.pub");
    save_key(&Key::Server(w.server.public.clone()), &server_pub, None).unwrap();
    save_key(&Key::Secret(w.server.secret.clone()), &server_key, None).unwrap();
    save_key(&Key::User(w.bob.public.clone()), &bob_pub, Some("bob")).unwrap();

    let server_pk = load_key(KeyKind::Server, &server_pub)
        .unwrap()
        .into_server()
        .unwrap();
    let server_sk = load_key(KeyKind::Secret, &server_key)
        .unwrap()
        .into_secret()
        .unwrap();
    let bob_pk = load_key(KeyKind::User, &bob_pub)
        .unwrap()
        .into_user()
        .unwrap();

    let ct = peks(b"k", &server_pk, &bob_pk, &w.alice.secret, &mut w.rng).unwrap();
    let td = w.trapdoor(b"k");
    assert!(test(&ct, &td, &server_sk).unwrap());
}

#[test]
fn test_loading_wrong_kind_fails() {
    let dir = tempdir().unwrap();
    let w = World::new(112);
    let path = dir.path().join("bob.pub");
    save_key(&Key::User(w.bob.public.clone()), &path, None).unwrap();

    assert!(matches!(
        load_key(KeyKind::Secret, &path),
        Err(CryptoError::InvalidKeyfile(_))
    ));
}
