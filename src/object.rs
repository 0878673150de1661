//! Object identity and canonical framing
//!
//! Every stored object (blob, tree, commit) is identified by a 160-bit
//! SHA-1 digest, hex-encoded, computed over the canonical encoding
//! `"{kind} {payload_len}\0{payload}"`. Identity is a pure function of
//! kind and payload: identical content always yields identical identity,
//! and the framing ties the digest to both the object kind and the exact
//! payload length so a truncated record can never pass verification.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

use crate::error::{LedgeError, Result};

/// Number of hex characters in an object identity (160-bit digest)
pub const ID_HEX_LEN: usize = 40;

/// Kind of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw file content
    Blob,
    /// Directory snapshot: ordered name -> target entries
    Tree,
    /// Tree snapshot plus parents and metadata
    Commit,
}

impl ObjectKind {
    /// Canonical tag used in the object header
    pub fn tag(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }

    /// Parse a header tag back into a kind
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "blob" => Some(ObjectKind::Blob),
            "tree" => Some(ObjectKind::Tree),
            "commit" => Some(ObjectKind::Commit),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Content-derived identity of a stored object
///
/// A validated, lowercase, 40-character hex string. `ObjectId` is the
/// sole key into the object store; all cross-references between objects
/// (tree entries, commit parents, branch pointers) are expressed as
/// identities rather than live references.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Compute the identity of an object from its kind and payload
    pub fn for_content(kind: ObjectKind, payload: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(header(kind, payload.len()));
        hasher.update(payload);
        ObjectId(hex::encode(hasher.finalize()))
    }

    /// Parse a hex string into an identity, validating length and charset
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() == ID_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            Some(ObjectId(s.to_string()))
        } else {
            None
        }
    }

    /// Full hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log output
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.0[..8])
    }
}

/// Canonical header: `"{kind} {payload_len}\0"`
fn header(kind: ObjectKind, len: usize) -> Vec<u8> {
    format!("{} {}\0", kind.tag(), len).into_bytes()
}

/// Produce the canonical on-disk encoding of an object
pub fn encode_object(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut bytes = header(kind, payload.len());
    bytes.extend_from_slice(payload);
    bytes
}

/// Decode the canonical encoding back into `(kind, payload)`
///
/// Validates the header tag and the declared payload length against the
/// actual byte count. Any mismatch is reported as corruption of `id`.
pub fn decode_object(id: &ObjectId, bytes: &[u8]) -> Result<(ObjectKind, Vec<u8>)> {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| LedgeError::corrupt(id.clone(), "missing header terminator"))?;

    let head = std::str::from_utf8(&bytes[..nul])
        .map_err(|_| LedgeError::corrupt(id.clone(), "header is not UTF-8"))?;
    let (tag, len_str) = head
        .split_once(' ')
        .ok_or_else(|| LedgeError::corrupt(id.clone(), "malformed header"))?;

    let kind = ObjectKind::from_tag(tag)
        .ok_or_else(|| LedgeError::corrupt(id.clone(), format!("unknown kind tag '{}'", tag)))?;
    let declared: usize = len_str
        .parse()
        .map_err(|_| LedgeError::corrupt(id.clone(), "invalid payload length"))?;

    let payload = &bytes[nul + 1..];
    if payload.len() != declared {
        return Err(LedgeError::corrupt(
            id.clone(),
            format!("payload length {} != declared {}", payload.len(), declared),
        ));
    }

    Ok((kind, payload.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_deterministic() {
        let a = ObjectId::for_content(ObjectKind::Blob, b"hello");
        let b = ObjectId::for_content(ObjectKind::Blob, b"hello");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), ID_HEX_LEN);
    }

    #[test]
    fn test_identity_depends_on_kind_and_payload() {
        let blob = ObjectId::for_content(ObjectKind::Blob, b"hello");
        let tree = ObjectId::for_content(ObjectKind::Tree, b"hello");
        let other = ObjectId::for_content(ObjectKind::Blob, b"hello!");
        assert_ne!(blob, tree);
        assert_ne!(blob, other);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let payload = b"tree payload bytes";
        let id = ObjectId::for_content(ObjectKind::Tree, payload);
        let encoded = encode_object(ObjectKind::Tree, payload);
        let (kind, decoded) = decode_object(&id, &encoded).unwrap();
        assert_eq!(kind, ObjectKind::Tree);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let payload = b"content";
        let id = ObjectId::for_content(ObjectKind::Blob, payload);
        let mut encoded = encode_object(ObjectKind::Blob, payload);
        encoded.pop();
        let err = decode_object(&id, &encoded).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        let id = ObjectId::for_content(ObjectKind::Blob, b"x");
        let err = decode_object(&id, b"bogus 1\0x").unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_from_hex_validation() {
        let id = ObjectId::for_content(ObjectKind::Blob, b"x");
        assert_eq!(ObjectId::from_hex(id.as_str()), Some(id));
        assert!(ObjectId::from_hex("abc").is_none());
        assert!(ObjectId::from_hex(&"Z".repeat(ID_HEX_LEN)).is_none());
    }
}
