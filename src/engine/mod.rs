//! Digest engine
//!
//! Streaming contexts, their lifecycle state machine, and the
//! handle-based create/update/finalize/destroy operations.

mod context;
mod digest;
mod registry;

pub use context::*;
pub use digest::*;
pub use registry::*;
