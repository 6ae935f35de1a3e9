//! Document fingerprints
//!
//! [`ContentHash`] is a Blake3 digest of document bytes. Reports carry it so
//! two passes over the same snapshot can be compared without diffing text.

use serde::{Serialize, Serializer};
use std::fmt;

/// Blake3 digest of a document's content
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Fingerprint of `content`
    #[must_use]
    pub fn of(content: &str) -> Self {
        Self(*blake3::hash(content.as_bytes()).as_bytes())
    }

    /// Full lowercase hex form
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 12 hex characters, for logs
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_exact() {
        assert_eq!(ContentHash::of("note"), ContentHash::of("note"));
        assert_ne!(ContentHash::of("note"), ContentHash::of("note "));
    }

    #[test]
    fn hex_forms() {
        let hash = ContentHash::of("vault");
        assert_eq!(hash.to_hex().len(), 64);
        assert!(hash.to_hex().starts_with(&hash.short()));
        assert_eq!(format!("{hash:?}"), format!("ContentHash({})", hash.short()));
        assert_eq!(serde_json::to_value(hash).unwrap(), serde_json::Value::String(hash.to_hex()));
    }
}
