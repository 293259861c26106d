//! Tag matching for incoming messages.
//!
//! A namespace registers (tag name, trapdoor) pairs. When a message arrives
//! with a searchable ciphertext of its keyword, the server tests it against
//! every registered trapdoor and files the message under the earliest tag
//! that matches, or under [`DEFAULT_TAG`] if none does.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CryptoError, CryptoResult};
use crate::peks::engine::{decode_ciphertext, decode_trapdoor, test_decoded, TRAPDOOR_SIZE};
use crate::peks::keys::SecretKey;

/// Tag assigned when no registered trapdoor matches.
pub const DEFAULT_TAG: &str = "others";

/// A registered tag and its trapdoor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Tag name.
    pub name: String,
    /// Trapdoor bytes, hex in serialized form.
    #[serde(with = "hex")]
    pub trapdoor: Vec<u8>,
}

impl TagRecord {
    pub fn new(name: impl Into<String>, trapdoor: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            trapdoor,
        }
    }
}

/// Find the tag a ciphertext belongs to.
///
/// Tags are tested in order and the scan stops at the first match; tags
/// after it are never looked at. Returns [`DEFAULT_TAG`] when nothing
/// matches, including when `tags` is empty.
///
/// # Errors
///
/// - [`CryptoError::InvalidCiphertext`] if the ciphertext is malformed
/// - [`CryptoError::InvalidTrapdoor`] if a malformed trapdoor is reached
///   before any match
pub fn find_matching_tag<'a>(
    ciphertext: &[u8],
    server: &SecretKey,
    tags: &'a [TagRecord],
) -> CryptoResult<&'a str> {
    if tags.is_empty() {
        debug!(tag_count = 0, "No tags registered");
        return Ok(DEFAULT_TAG);
    }

    let ct = decode_ciphertext(ciphertext)?;
    for (position, tag) in tags.iter().enumerate() {
        let td = decode_trapdoor(&tag.trapdoor)?;
        if test_decoded(&ct, &td, server) {
            debug!(tag_count = tags.len(), position, "Tag matched");
            return Ok(&tag.name);
        }
    }

    debug!(tag_count = tags.len(), "No tag matched");
    Ok(DEFAULT_TAG)
}

/// Ordered, append-only set of tags for one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: Vec<TagRecord>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag at the end of the set.
    ///
    /// Names may repeat; registration order decides which one matches.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidInput`] if the name is empty
    /// - [`CryptoError::InvalidTrapdoor`] if the trapdoor is not
    ///   [`TRAPDOOR_SIZE`] bytes
    pub fn register(&mut self, name: impl Into<String>, trapdoor: Vec<u8>) -> CryptoResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(CryptoError::InvalidInput(
                "tag name must not be empty".to_string(),
            ));
        }
        if trapdoor.len() != TRAPDOOR_SIZE {
            warn!(tag = %name, size = trapdoor.len(), "Rejected malformed trapdoor");
            return Err(CryptoError::InvalidTrapdoor(format!(
                "expected {} bytes, got {}",
                TRAPDOOR_SIZE,
                trapdoor.len()
            )));
        }
        self.tags.push(TagRecord::new(name, trapdoor));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn records(&self) -> &[TagRecord] {
        &self.tags
    }

    /// See [`find_matching_tag`].
    pub fn find_matching_tag(&self, ciphertext: &[u8], server: &SecretKey) -> CryptoResult<&str> {
        find_matching_tag(ciphertext, server, &self.tags)
    }
}

impl From<Vec<TagRecord>> for TagSet {
    fn from(tags: Vec<TagRecord>) -> Self {
        Self { tags }
    }
}
