//! Streaming digest context and its lifecycle state machine
//!
//! A context is bound to one algorithm for its whole life and moves
//! through `Initialized -> Updated* -> Finalized -> Destroyed`. Any
//! operation outside that path fails with an invalid state error and
//! leaves the context untouched.

use super::Digest;
use crate::catalog::{self, AlgorithmDescriptor};
use crate::config::HashAlgorithm;
use crate::error::{DigestError, Result};
use serde::Serialize;
use sha2::Digest as _;

/// Lifecycle state of a [`DigestContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContextState {
    /// Created, no data absorbed yet
    Initialized,
    /// At least one successful update
    Updated,
    /// Digest has been produced
    Finalized,
    /// Resources released
    Destroyed,
}

impl ContextState {
    /// Whether update and finalize are still legal
    pub fn accepts_data(&self) -> bool {
        matches!(self, Self::Initialized | Self::Updated)
    }
}

impl std::fmt::Display for ContextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Initialized => "Initialized",
            Self::Updated => "Updated",
            Self::Finalized => "Finalized",
            Self::Destroyed => "Destroyed",
        };
        f.write_str(name)
    }
}

/// Algorithm-specific streaming state
enum HashState {
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Sha384(sha2::Sha384),
    Sha512(sha2::Sha512),
}

impl HashState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Self::Sha1(sha1::Sha1::new()),
            HashAlgorithm::Sha256 => Self::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Sha384 => Self::Sha384(sha2::Sha384::new()),
            HashAlgorithm::Sha512 => Self::Sha512(sha2::Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    fn finalize_into(self, out: &mut Vec<u8>) {
        match self {
            Self::Sha1(h) => out.extend_from_slice(&h.finalize()),
            Self::Sha256(h) => out.extend_from_slice(&h.finalize()),
            Self::Sha384(h) => out.extend_from_slice(&h.finalize()),
            Self::Sha512(h) => out.extend_from_slice(&h.finalize()),
        }
    }
}

/// One in-progress digest computation
///
/// The streaming state is owned exclusively by the context and dropped on
/// [`finalize`](Self::finalize) or [`destroy`](Self::destroy). Operations
/// take `&mut self`; sharing one context across threads requires the
/// caller's own synchronization.
pub struct DigestContext {
    descriptor: &'static AlgorithmDescriptor,
    state: ContextState,
    hasher: Option<HashState>,
    bytes_processed: u64,
}

impl DigestContext {
    /// Create a context for a host-supplied algorithm identifier
    pub fn new(identifier: i64) -> Result<Self> {
        Ok(Self::with_descriptor(catalog::resolve(identifier)?))
    }

    /// Create a context for an algorithm selector
    pub fn for_algorithm(algorithm: HashAlgorithm) -> Self {
        Self::with_descriptor(catalog::descriptor_for(algorithm))
    }

    /// Create a context bound to a catalog descriptor
    pub fn with_descriptor(descriptor: &'static AlgorithmDescriptor) -> Self {
        Self {
            descriptor,
            state: ContextState::Initialized,
            hasher: Some(HashState::new(descriptor.algorithm)),
            bytes_processed: 0,
        }
    }

    /// Descriptor this context is bound to
    pub fn descriptor(&self) -> &'static AlgorithmDescriptor {
        self.descriptor
    }

    /// Algorithm this context is bound to
    pub fn algorithm(&self) -> HashAlgorithm {
        self.descriptor.algorithm
    }

    /// Current lifecycle state
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Total bytes absorbed so far
    pub fn bytes_processed(&self) -> u64 {
        self.bytes_processed
    }

    /// Absorb a chunk of data.
    ///
    /// Either the whole chunk is incorporated or nothing changes.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_accepts("update")?;

        let total = self
            .bytes_processed
            .checked_add(data.len() as u64)
            .filter(|total| *total <= self.descriptor.max_message_bytes)
            .ok_or_else(|| {
                DigestError::computation(
                    self.descriptor.name(),
                    format!(
                        "message length limit of {} bytes exceeded",
                        self.descriptor.max_message_bytes
                    ),
                )
            })?;

        self.hasher_mut()?.update(data);
        self.bytes_processed = total;
        self.state = ContextState::Updated;
        Ok(())
    }

    /// Produce the digest and move to `Finalized`.
    ///
    /// The context still has to be destroyed afterwards.
    pub fn finalize(&mut self) -> Result<Digest> {
        self.ensure_accepts("finalize")?;

        let output_length = self.descriptor.output_length;
        let mut out = Vec::new();
        out.try_reserve_exact(output_length)
            .map_err(|e| DigestError::allocation("digest buffer", e))?;

        let name = self.descriptor.name();
        let hasher = self
            .hasher
            .take()
            .ok_or_else(|| DigestError::computation(name, "streaming state is missing"))?;
        self.state = ContextState::Finalized;
        hasher.finalize_into(&mut out);

        if out.len() != output_length {
            return Err(DigestError::computation(
                self.descriptor.name(),
                format!("produced {} bytes, expected {}", out.len(), output_length),
            ));
        }

        Ok(Digest::new(self.descriptor.algorithm, out))
    }

    /// Release the streaming state and move to `Destroyed`
    pub fn destroy(&mut self) -> Result<()> {
        if self.state == ContextState::Destroyed {
            tracing::warn!("Rejecting destroy of already destroyed {} context", self.descriptor.name());
            return Err(DigestError::invalid_state("destroy", self.state));
        }
        self.hasher = None;
        self.state = ContextState::Destroyed;
        Ok(())
    }

    fn ensure_accepts(&self, operation: &'static str) -> Result<()> {
        if self.state.accepts_data() {
            return Ok(());
        }
        tracing::warn!(
            "Rejecting {} on {} context in state {}",
            operation,
            self.descriptor.name(),
            self.state
        );
        Err(DigestError::invalid_state(operation, self.state))
    }

    fn hasher_mut(&mut self) -> Result<&mut HashState> {
        let name = self.descriptor.name();
        self.hasher
            .as_mut()
            .ok_or_else(|| DigestError::computation(name, "streaming state is missing"))
    }

    #[cfg(test)]
    pub(crate) fn set_bytes_processed(&mut self, bytes: u64) {
        self.bytes_processed = bytes;
    }
}

impl std::fmt::Debug for DigestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestContext")
            .field("algorithm", &self.descriptor.algorithm)
            .field("state", &self.state)
            .field("bytes_processed", &self.bytes_processed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    const EMPTY_DIGESTS: [&str; 4] = [
        "da39a3ee5e6b4b0d3255bfef95601890afd80709",
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        "38b060a751ac96384cd9327eb1b1e36a21fdb71114be07434c0cc7bf63f6e1da274edebfe76f65fbd51ad2f14898b95b",
        "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e",
    ];

    const ABC_DIGESTS: [&str; 4] = [
        "a9993e364706816aba3e25717850c26c9cd0d89d",
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7",
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
    ];

    #[test]
    fn test_empty_input_digests() {
        for (id, expected) in EMPTY_DIGESTS.iter().enumerate() {
            let mut ctx = DigestContext::new(id as i64).unwrap();
            assert_eq!(ctx.finalize().unwrap().to_hex(), *expected);
            assert_eq!(ctx.state(), ContextState::Finalized);
        }
    }

    #[test]
    fn test_abc_digests() {
        for (id, expected) in ABC_DIGESTS.iter().enumerate() {
            let mut ctx = DigestContext::new(id as i64).unwrap();
            ctx.update(b"abc").unwrap();
            assert_eq!(ctx.finalize().unwrap().to_hex(), *expected);
        }
    }

    #[test]
    fn test_output_lengths() {
        for descriptor in catalog::descriptors() {
            let mut ctx = DigestContext::with_descriptor(descriptor);
            ctx.update(b"length check").unwrap();
            assert_eq!(ctx.finalize().unwrap().len(), descriptor.output_length);
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut ctx = DigestContext::for_algorithm(HashAlgorithm::Sha256);
        assert_eq!(ctx.state(), ContextState::Initialized);

        ctx.update(b"").unwrap();
        assert_eq!(ctx.state(), ContextState::Updated);
        ctx.update(b"more").unwrap();
        assert_eq!(ctx.state(), ContextState::Updated);
        assert_eq!(ctx.bytes_processed(), 4);

        ctx.finalize().unwrap();
        assert_eq!(ctx.state(), ContextState::Finalized);

        ctx.destroy().unwrap();
        assert_eq!(ctx.state(), ContextState::Destroyed);
    }

    #[test]
    fn test_invalid_after_finalize() {
        let mut ctx = DigestContext::for_algorithm(HashAlgorithm::Sha1);
        ctx.finalize().unwrap();

        assert_eq!(ctx.update(b"late").unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(ctx.finalize().unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(ctx.state(), ContextState::Finalized);
    }

    #[test]
    fn test_invalid_after_destroy() {
        let mut ctx = DigestContext::for_algorithm(HashAlgorithm::Sha384);
        ctx.update(b"partial").unwrap();
        ctx.destroy().unwrap();

        assert_eq!(ctx.update(b"late").unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(ctx.finalize().unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(ctx.destroy().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_unknown_identifier() {
        let err = DigestContext::new(4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_length_limit_leaves_context_unchanged() {
        let mut ctx = DigestContext::for_algorithm(HashAlgorithm::Sha256);
        ctx.update(b"abc").unwrap();
        let limit = ctx.descriptor().max_message_bytes;
        ctx.set_bytes_processed(limit - 1);

        let err = ctx.update(b"xy").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Computation);
        assert_eq!(ctx.bytes_processed(), limit - 1);
        assert_eq!(ctx.state(), ContextState::Updated);

        // The rejected chunk was not absorbed
        ctx.set_bytes_processed(3);
        assert_eq!(ctx.finalize().unwrap().to_hex(), ABC_DIGESTS[1]);
    }

    #[test]
    fn test_byte_counter_overflow() {
        let mut ctx = DigestContext::for_algorithm(HashAlgorithm::Sha512);
        ctx.set_bytes_processed(u64::MAX);
        assert_eq!(ctx.update(b"x").unwrap_err().kind(), ErrorKind::Computation);
        assert!(ctx.update(b"").is_ok());
    }

    proptest! {
        #[test]
        fn streaming_matches_one_shot(
            data in prop::collection::vec(any::<u8>(), 0..2048),
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..16),
            id in 0i64..4,
        ) {
            let mut one_shot = DigestContext::new(id).unwrap();
            one_shot.update(&data).unwrap();
            let expected = one_shot.finalize().unwrap();

            let mut points: Vec<usize> = cuts.iter().map(|i| i.index(data.len() + 1)).collect();
            points.sort_unstable();

            let mut streamed = DigestContext::new(id).unwrap();
            let mut start = 0;
            for point in points {
                streamed.update(&data[start..point]).unwrap();
                start = point;
            }
            streamed.update(&data[start..]).unwrap();

            prop_assert_eq!(streamed.finalize().unwrap(), expected);
        }
    }
}
