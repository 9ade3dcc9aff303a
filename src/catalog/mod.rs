//! Algorithm catalog
//!
//! Fixed, read-only table mapping stable integer identifiers to
//! algorithm descriptors.

mod descriptor;

pub use descriptor::*;
