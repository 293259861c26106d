//! # devspace-crypto
//!
//! Searchable encryption for devspace message tagging.
//!
//! Senders attach a searchable ciphertext of a keyword to each message;
//! receivers register trapdoors for the keywords they care about; the server
//! files each message under the first matching tag without learning the
//! keyword.
//!
//! ## Cryptographic Primitives
//!
//! - **Curve**: BLS12-381 with the optimal Ate pairing
//! - **Keyword hash**: hash-to-curve into G1 (SHA-256, simplified SWU)
//! - **User keys**: scalar secret, public key in G2
//! - **Server keys**: scalar secret, public key in GT
//!
//! ## Wire Format
//!
//! ```text
//! ┌───────────────────────────┬───────────────────────────┐
//! │ GT element (576 bytes)    │ GT element (576 bytes)    │
//! └───────────────────────────┴───────────────────────────┘
//! ```
//!
//! Ciphertexts and trapdoors share this layout.
//!
//! ## Examples
//!
//! ### Tag a Message
//!
//! ```rust
//! use devspace_crypto::{peks, trapdoor, ServerKeypair, TagSet, UserKeypair};
//! use rand::rngs::OsRng;
//!
//! let server = ServerKeypair::generate(&mut OsRng).unwrap();
//! let alice = UserKeypair::generate(&mut OsRng).unwrap();
//! let bob = UserKeypair::generate(&mut OsRng).unwrap();
//!
//! let mut tags = TagSet::new();
//! let td = trapdoor(b"invoice", &server.public, &alice.public, &bob.secret, &mut OsRng).unwrap();
//! tags.register("billing", td).unwrap();
//!
//! let ct = peks(b"invoice", &server.public, &bob.public, &alice.secret, &mut OsRng).unwrap();
//! assert_eq!(tags.find_matching_tag(&ct, &server.secret).unwrap(), "billing");
//! ```
//!
//! ### Save and Load Keys
//!
//! ```rust
//! use devspace_crypto::{load_key, save_key, Key, KeyKind, UserKeypair};
//! use rand::rngs::OsRng;
//!
//! let keypair = UserKeypair::generate(&mut OsRng).unwrap();
//! # let temp = tempfile::tempdir().unwrap();
//! # let path = temp.path().join("alice.pub");
//! save_key(&Key::User(keypair.public.clone()), &path, Some("alice")).unwrap();
//!
//! let loaded = load_key(KeyKind::User, &path).unwrap().into_user().unwrap();
//! assert_eq!(loaded, keypair.public);
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod peks;

// Re-export commonly used types
pub use error::{CryptoError, CryptoResult};
pub use format::{hex_decode, hex_encode};

pub use peks::{
    derive_shared, find_matching_tag, generate_server_keys, generate_user_keys, load_key,
    parse_key, peks, read_key, save_key, test, trapdoor, Key, KeyKind, SecretKey, ServerKeypair,
    ServerPublicKey, SharedSecret, Source, TagRecord, TagSet, UserKeypair, UserPublicKey,
    CIPHERTEXT_SIZE, DEFAULT_TAG, TRAPDOOR_SIZE,
};
