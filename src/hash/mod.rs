//! Hashing helpers
//!
//! Hash byte slices, readers, and files through streaming digest
//! contexts, with parallel multi-file hashing and verification.

mod integrity;

pub use integrity::*;
