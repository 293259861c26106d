//! Public-key Encryption with Keyword Search (PEKS) between two users and a
//! tagging server.
//!
//! # Overview
//!
//! A sender attaches a searchable ciphertext of a keyword to each message.
//! The receiver hands the server a trapdoor for every keyword it wants to
//! tag. The server can then tell which trapdoor a ciphertext matches, and
//! nothing else: it never learns the keyword, and nobody but the server can
//! run the test.
//!
//! - **Users** hold a secret scalar and a public key in G2
//! - **The server** holds a secret scalar and a public key in GT
//! - **Keywords** are hashed into G1 (BLS12-381, SHA-256 SSWU)
//!
//! # Usage Example
//!
//! ```rust
//! use devspace_crypto::peks::{peks, test, trapdoor, ServerKeypair, UserKeypair};
//! use rand::rngs::OsRng;
//!
//! let server = ServerKeypair::generate(&mut OsRng).unwrap();
//! let alice = UserKeypair::generate(&mut OsRng).unwrap();
//! let bob = UserKeypair::generate(&mut OsRng).unwrap();
//!
//! // Alice writes to Bob
//! let ct = peks(b"invoice", &server.public, &bob.public, &alice.secret, &mut OsRng).unwrap();
//!
//! // Bob asks the server to look for "invoice" from Alice
//! let td = trapdoor(b"invoice", &server.public, &alice.public, &bob.secret, &mut OsRng).unwrap();
//!
//! assert!(test(&ct, &td, &server.secret).unwrap());
//! ```

pub mod engine;
pub mod group;
pub mod key_io;
pub mod keys;
pub mod shared;
pub mod tags;

pub use engine::{peks, test, trapdoor, CIPHERTEXT_SIZE, TRAPDOOR_SIZE};
pub use group::{SIZE_G1, SIZE_G2, SIZE_GT, SIZE_SK};
pub use key_io::{load_key, parse_key, read_input, read_key, save_key, write_key, Source};
pub use keys::{
    generate_server_keys, generate_user_keys, Key, KeyKind, SecretKey, ServerKeypair,
    ServerPublicKey, UserKeypair, UserPublicKey,
};
pub use shared::{derive_shared, SharedSecret};
pub use tags::{find_matching_tag, TagRecord, TagSet, DEFAULT_TAG};
