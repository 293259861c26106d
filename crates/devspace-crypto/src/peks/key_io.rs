//! Key files and input sources.
//!
//! Keys travel as hex of their byte encoding. On disk they are stored either
//! as raw hex or as a small JSON document:
//!
//! ```json
//! { "version": 1, "kind": "user", "key": "a3f1...", "label": "laptop" }
//! ```
//!
//! Loading accepts both forms.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{CryptoError, CryptoResult};
use crate::format::hex_encode;
use crate::peks::keys::{Key, KeyKind};

const KEY_FILE_VERSION: u8 = 1;

/// Where to read a value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Given directly, e.g. on the command line.
    Inline(String),
    /// Read from a file.
    File(PathBuf),
    /// Read from standard input.
    Stdin,
}

impl Source {
    /// Read the raw bytes.
    pub fn read(&self) -> CryptoResult<Vec<u8>> {
        match self {
            Self::Inline(text) => Ok(text.as_bytes().to_vec()),
            Self::File(path) => Ok(std::fs::read(path)?),
            Self::Stdin => {
                let mut buf = Vec::new();
                std::io::stdin().read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }

    /// Read as UTF-8 text.
    pub fn read_string(&self) -> CryptoResult<String> {
        String::from_utf8(self.read()?)
            .map_err(|e| CryptoError::InvalidInput(format!("input is not UTF-8: {}", e)))
    }

    /// Read hex text and decode it, e.g. a ciphertext or trapdoor.
    pub fn read_hex(&self, what: &str) -> CryptoResult<Vec<u8>> {
        crate::format::hex_decode(&self.read_string()?, what)
    }
}

/// Key file format (plaintext JSON).
#[derive(Serialize, Deserialize)]
struct KeyFile {
    version: u8,
    kind: KeyKind,
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

/// Parse key text: a JSON key file or raw hex.
///
/// # Errors
///
/// - [`CryptoError::InvalidKeyfile`] for bad hex, an unknown version, or a
///   file holding a different kind of key
/// - [`CryptoError::InvalidEncoding`] if the bytes are not a valid key
pub fn parse_key(kind: KeyKind, text: &str) -> CryptoResult<Key> {
    let text = text.trim();
    let hex_key = if text.starts_with('{') {
        let file: KeyFile = serde_json::from_str(text)
            .map_err(|e| CryptoError::InvalidKeyfile(e.to_string()))?;
        if file.version != KEY_FILE_VERSION {
            return Err(CryptoError::InvalidKeyfile(format!(
                "Unsupported key file version: {}",
                file.version
            )));
        }
        if file.kind != kind {
            return Err(CryptoError::InvalidKeyfile(format!(
                "expected a {} key, got a {} key",
                kind, file.kind
            )));
        }
        file.key
    } else {
        text.to_string()
    };

    let bytes =
        hex::decode(hex_key.trim()).map_err(|e| CryptoError::InvalidKeyfile(e.to_string()))?;
    Key::from_bytes(kind, &bytes)
}

/// Read a key of the given kind from a source.
pub fn read_key(kind: KeyKind, source: &Source) -> CryptoResult<Key> {
    parse_key(kind, &source.read_string()?)
}

/// Read keyword or message bytes as given, without trimming.
pub fn read_input(source: &Source) -> CryptoResult<Vec<u8>> {
    source.read()
}

/// Write a key as bare hex followed by a newline.
pub fn write_key(key: &Key, path: &Path) -> CryptoResult<()> {
    write_key_file(key, path, format!("{}\n", hex_encode(&key.to_bytes())).as_bytes())
}

/// Secret keys are created owner-only on Unix, and an existing file is
/// narrowed to owner-only before anything is written to it.
fn write_key_file(key: &Key, path: &Path, contents: &[u8]) -> CryptoResult<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    let secret = key.kind() == KeyKind::Secret;
    #[cfg(unix)]
    if secret {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;

    #[cfg(unix)]
    if secret {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)?;
    Ok(())
}

/// Save a key as a JSON key file.
///
/// Secret key files are created readable by the owner only on Unix.
pub fn save_key(key: &Key, path: &Path, label: Option<&str>) -> CryptoResult<()> {
    let file = KeyFile {
        version: KEY_FILE_VERSION,
        kind: key.kind(),
        key: hex_encode(&key.to_bytes()),
        label: label.map(String::from),
    };
    let json = serde_json::to_string_pretty(&file)?;
    write_key_file(key, path, json.as_bytes())
}

/// Load a key file written by [`save_key`] or holding raw hex.
pub fn load_key(kind: KeyKind, path: &Path) -> CryptoResult<Key> {
    read_key(kind, &Source::File(path.to_path_buf()))
}
