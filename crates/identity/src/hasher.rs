use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Key-derivation context for identifier digests. Changing it changes every derived ID.
const IDENTITY_CONTEXT: &str = "agentscan 2024-06-01 entity identity v1";

/// SHA-256 content hash of a file, lower-hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash raw bytes (the full, already transformed file contents).
    #[must_use]
    pub fn of(bytes: impl AsRef<[u8]>) -> Self {
        let digest = Sha256::digest(bytes.as_ref());
        Self(hex_encode_lower(&digest))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// BLAKE3 digest over an ordered list of string parts.
///
/// Every part is written as its byte length (u64, little-endian) followed by its bytes, so
/// `["ab", "c"]` and `["a", "bc"]` never hash alike. Part order is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityDigest(blake3::Hash);

impl IdentityDigest {
    #[must_use]
    pub fn of_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hasher = blake3::Hasher::new_derive_key(IDENTITY_CONTEXT);
        for part in parts {
            let bytes = part.as_ref().as_bytes();
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        Self(hasher.finalize())
    }

    /// Lower-hex encoding, cut to at most `max_len` characters.
    #[must_use]
    pub fn truncated_hex(&self, max_len: usize) -> String {
        let hex = self.0.to_hex();
        let cut = max_len.min(hex.len());
        hex.as_str()[..cut].to_string()
    }
}

fn hex_encode_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len().saturating_mul(2));
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
