//! Finalized digest values

use crate::catalog::descriptor_for;
use crate::config::HashAlgorithm;
use crate::error::{DigestError, Result};
use serde::{Deserialize, Serialize};

/// Digest produced by finalizing a context
///
/// The byte length always equals the algorithm's `output_length`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDigest", into = "RawDigest")]
pub struct Digest {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct RawDigest {
    algorithm: HashAlgorithm,
    #[serde(with = "hex")]
    hex: Vec<u8>,
}

impl Digest {
    pub(crate) fn new(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    /// Parse a hex digest, checking its length against the algorithm
    pub fn from_hex(algorithm: HashAlgorithm, hex_digest: &str) -> Result<Self> {
        let bytes = hex::decode(hex_digest.trim())
            .map_err(|e| DigestError::InvalidInput(format!("malformed hex digest: {}", e)))?;
        Self::from_bytes(algorithm, bytes)
    }

    /// Wrap raw digest bytes, checking their length against the algorithm
    pub fn from_bytes(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Result<Self> {
        let expected = descriptor_for(algorithm).output_length;
        if bytes.len() != expected {
            return Err(DigestError::InvalidInput(format!(
                "{} digest must be {} bytes, got {}",
                algorithm,
                expected,
                bytes.len()
            )));
        }
        Ok(Self::new(algorithm, bytes))
    }

    /// Algorithm that produced this digest
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Digest length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for digests produced by the engine
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<RawDigest> for Digest {
    type Error = DigestError;

    fn try_from(raw: RawDigest) -> Result<Self> {
        Self::from_bytes(raw.algorithm, raw.hex)
    }
}

impl From<Digest> for RawDigest {
    fn from(digest: Digest) -> Self {
        Self {
            algorithm: digest.algorithm,
            hex: digest.bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SHA1_EMPTY: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

    #[test]
    fn test_from_hex() {
        let digest = Digest::from_hex(HashAlgorithm::Sha1, SHA1_EMPTY).unwrap();
        assert_eq!(digest.len(), 20);
        assert_eq!(digest.to_hex(), SHA1_EMPTY);
        assert_eq!(digest.to_string(), SHA1_EMPTY);

        let upper = Digest::from_hex(HashAlgorithm::Sha1, &SHA1_EMPTY.to_uppercase()).unwrap();
        assert_eq!(upper, digest);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        let err = Digest::from_hex(HashAlgorithm::Sha1, "zz").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        // Valid SHA-1 length, wrong for SHA-256
        let err = Digest::from_hex(HashAlgorithm::Sha256, SHA1_EMPTY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_serde() {
        let digest = Digest::from_hex(HashAlgorithm::Sha1, SHA1_EMPTY).unwrap();
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(
            json,
            format!(r#"{{"algorithm":"sha1","hex":"{}"}}"#, SHA1_EMPTY)
        );

        let parsed: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, digest);

        let truncated = r#"{"algorithm":"sha512","hex":"00ff"}"#;
        assert!(serde_json::from_str::<Digest>(truncated).is_err());
    }
}
