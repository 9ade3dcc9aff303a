//! Configuration module for StreamDigest
//!
//! Provides the algorithm selector, CLI arguments, config files,
//! and engine settings.

mod settings;

pub use settings::*;
