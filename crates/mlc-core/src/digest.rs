//! # Content Digest — SHA-256 over Canonical Bytes
//!
//! Defines `ContentDigest`, the 32-byte SHA-256 digest used for structural
//! schema hashes, checksum baselines and the published manifest hash.
//!
//! ## Security Invariant
//!
//! `ContentDigest` is computed only from `CanonicalBytes`. This is enforced
//! by the signature of `sha256_digest()`. Parsing a digest from text (for
//! example from a checksum record) is the only other constructor.
//!
//! ## Text Form
//!
//! Digests render as 64 lowercase hex characters with no algorithm prefix,
//! which is the form stored in checksum records and report files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::DigestError;

/// A SHA-256 content digest.
///
/// Serializes as its lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    ///
    /// Prefer [`sha256_digest()`] for computing digests.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32-byte digest value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from 64 hex characters.
    ///
    /// Surrounding whitespace is ignored and upper-case digits are
    /// accepted; the digest always renders back in lower case.
    pub fn from_hex(hex: &str) -> Result<Self, DigestError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(DigestError::InvalidLength(hex.len()));
        }
        // `from_str_radix` tolerates a leading sign, so check digits up front.
        if let Some(position) = hex.bytes().position(|b| !b.is_ascii_hexdigit()) {
            return Err(DigestError::InvalidHex { position });
        }
        let mut out = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| DigestError::InvalidHex { position: i * 2 })?;
            out[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| DigestError::InvalidHex { position: i * 2 })?;
        }
        Ok(Self(out))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.to_hex()
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
///
/// Accepts only `&CanonicalBytes`, not raw `&[u8]`, so no code path can
/// digest a non-canonical serialization.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::from_bytes(bytes)
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sha256_digest_deterministic() {
        let cb = CanonicalBytes::new(&json!({"a": 1, "b": 2}));
        assert_eq!(sha256_digest(&cb), sha256_digest(&cb));
    }

    #[test]
    fn test_sha256_hex_format() {
        let cb = CanonicalBytes::new(&json!({"key": "value"}));
        let hex = sha256_hex(&cb);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_known_sha256_vector() {
        // SHA256("{}"), matching hashlib.sha256(b"{}").hexdigest().
        let cb = CanonicalBytes::new(&json!({}));
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_different_inputs_different_digests() {
        let d1 = sha256_digest(&CanonicalBytes::new(&json!({"a": 1})));
        let d2 = sha256_digest(&CanonicalBytes::new(&json!({"a": 2})));
        assert_ne!(d1, d2);
    }

    #[test]
    fn test_from_hex_round_trip() {
        let digest = sha256_digest(&CanonicalBytes::new(&json!([1, 2, 3])));
        let parsed = ContentDigest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn test_from_hex_accepts_uppercase_and_whitespace() {
        let lower = "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a";
        let parsed = ContentDigest::from_hex(&format!("  {}\n", lower.to_uppercase())).unwrap();
        assert_eq!(parsed.to_hex(), lower);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(matches!(
            ContentDigest::from_hex("abcd"),
            Err(DigestError::InvalidLength(4))
        ));
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let bad = format!("{}zz", "0".repeat(62));
        assert!(matches!(
            ContentDigest::from_hex(&bad),
            Err(DigestError::InvalidHex { position: 62 })
        ));
    }

    #[test]
    fn test_from_hex_rejects_multibyte_input() {
        // 64 bytes long but not ASCII.
        let bad = format!("{}\u{00e9}", "0".repeat(62));
        assert!(ContentDigest::from_hex(&bad).is_err());
    }

    #[test]
    fn test_from_bytes_wraps_raw_digest() {
        let digest = sha256_digest(&CanonicalBytes::new(&json!({"a": 1})));
        let copy = ContentDigest::from_bytes(*digest.as_bytes());
        assert_eq!(copy, digest);
        assert_eq!(ContentDigest::from_bytes([0xab; 32]).to_hex(), "ab".repeat(32));
    }

    #[test]
    fn test_display_is_bare_hex() {
        let digest = sha256_digest(&CanonicalBytes::new(&json!({})));
        assert_eq!(digest.to_string(), digest.to_hex());
        assert_eq!(digest.to_string().parse::<ContentDigest>().unwrap(), digest);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let digest = sha256_digest(&CanonicalBytes::new(&json!({})));
        let encoded = serde_json::to_value(digest).unwrap();
        assert_eq!(
            encoded,
            json!("44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a")
        );
        let decoded: ContentDigest = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, digest);
        assert!(serde_json::from_value::<ContentDigest>(json!("nope")).is_err());
    }
}
