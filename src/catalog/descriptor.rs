//! Algorithm descriptors and identifier resolution
//!
//! Identifiers are ABI-like constants shared with the host and are never
//! renumbered: `0` SHA-1, `1` SHA-256, `2` SHA-384, `3` SHA-512.

use crate::config::HashAlgorithm;
use crate::error::{DigestError, Result};
use serde::Serialize;

/// Immutable description of one supported digest algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmDescriptor {
    /// Stable identifier used at the host boundary
    pub identifier: u8,
    /// Algorithm selector backing this descriptor
    pub algorithm: HashAlgorithm,
    /// Digest length in bytes
    pub output_length: usize,
    /// Internal block length in bytes
    pub block_size: usize,
    /// Longest message, in bytes, the length encoding can represent
    pub max_message_bytes: u64,
}

impl AlgorithmDescriptor {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        self.algorithm.name()
    }
}

// SHA-1 and SHA-256 encode the message length as a 64-bit bit count.
const MAX_64BIT_LENGTH_BYTES: u64 = u64::MAX >> 3;

static CATALOG: [AlgorithmDescriptor; 4] = [
    AlgorithmDescriptor {
        identifier: 0,
        algorithm: HashAlgorithm::Sha1,
        output_length: 20,
        block_size: 64,
        max_message_bytes: MAX_64BIT_LENGTH_BYTES,
    },
    AlgorithmDescriptor {
        identifier: 1,
        algorithm: HashAlgorithm::Sha256,
        output_length: 32,
        block_size: 64,
        max_message_bytes: MAX_64BIT_LENGTH_BYTES,
    },
    AlgorithmDescriptor {
        identifier: 2,
        algorithm: HashAlgorithm::Sha384,
        output_length: 48,
        block_size: 128,
        max_message_bytes: u64::MAX,
    },
    AlgorithmDescriptor {
        identifier: 3,
        algorithm: HashAlgorithm::Sha512,
        output_length: 64,
        block_size: 128,
        max_message_bytes: u64::MAX,
    },
];

/// Resolve a host-supplied identifier to its descriptor
pub fn resolve(identifier: i64) -> Result<&'static AlgorithmDescriptor> {
    usize::try_from(identifier)
        .ok()
        .and_then(|index| CATALOG.get(index))
        .ok_or(DigestError::UnknownAlgorithm(identifier))
}

/// Resolve an algorithm name such as `sha256`, `SHA-256` or `sha-512`
pub fn resolve_name(name: &str) -> Result<&'static AlgorithmDescriptor> {
    let normalized: String = name
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect();

    CATALOG
        .iter()
        .find(|d| d.name().replace('-', "").eq_ignore_ascii_case(&normalized))
        .ok_or_else(|| DigestError::UnknownAlgorithmName(name.to_string()))
}

/// Descriptor for an algorithm selector
pub fn descriptor_for(algorithm: HashAlgorithm) -> &'static AlgorithmDescriptor {
    match algorithm {
        HashAlgorithm::Sha1 => &CATALOG[0],
        HashAlgorithm::Sha256 => &CATALOG[1],
        HashAlgorithm::Sha384 => &CATALOG[2],
        HashAlgorithm::Sha512 => &CATALOG[3],
    }
}

/// All descriptors in identifier order
pub fn descriptors() -> impl Iterator<Item = &'static AlgorithmDescriptor> {
    CATALOG.iter()
}
