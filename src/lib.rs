//! # StreamDigest - Incremental Cryptographic Digests
//!
//! StreamDigest computes SHA-1 and SHA-2 digests over input delivered in
//! arbitrary-sized chunks, without holding the whole input in memory.
//!
//! ## Features
//!
//! - **Fixed Algorithm Catalog**: stable identifiers `0..=3` for SHA-1,
//!   SHA-256, SHA-384 and SHA-512 (20/32/48/64-byte digests)
//! - **Enforced Lifecycle**: contexts move `Initialized -> Updated ->
//!   Finalized -> Destroyed` and reject anything else
//! - **Generation-checked Handles**: use of a destroyed handle is a
//!   reported error, never a dangling reference
//! - **Typed Errors**: every failure carries a coarse kind and a message
//!
//! ## Quick Start
//!
//! ```
//! use streamdigest::engine::DigestEngine;
//!
//! let mut engine = DigestEngine::default();
//! let handle = engine.create(1)?;
//! engine.update(handle, b"ab")?;
//! engine.update(handle, b"c")?;
//! let digest = engine.finalize(handle)?;
//! engine.destroy(handle)?;
//!
//! assert_eq!(
//!     digest.to_hex(),
//!     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
//! );
//! # Ok::<(), streamdigest::DigestError>(())
//! ```
//!
//! ## Owned Contexts
//!
//! ```
//! use streamdigest::engine::DigestContext;
//!
//! let mut ctx = DigestContext::new(0)?;
//! let digest = ctx.finalize()?;
//! assert_eq!(digest.len(), 20);
//! assert!(ctx.update(b"late").is_err());
//! # Ok::<(), streamdigest::DigestError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod hash;

// Re-export commonly used types
pub use catalog::AlgorithmDescriptor;
pub use config::{EngineConfig, HashAlgorithm};
pub use engine::{ContextHandle, ContextState, Digest, DigestContext, DigestEngine};
pub use error::{DigestError, ErrorKind, ErrorReport, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```
    //! use streamdigest::prelude::*;
    //! ```

    pub use crate::catalog::{resolve, AlgorithmDescriptor};
    pub use crate::config::{EngineConfig, HashAlgorithm};
    pub use crate::engine::{ContextHandle, ContextState, Digest, DigestContext, DigestEngine};
    pub use crate::error::{DigestError, ErrorKind, Result};
    pub use crate::hash::{hash_bytes, hash_file, verify_file, FileDigest};
}
