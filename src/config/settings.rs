//! Configuration settings for StreamDigest
//!
//! Defines the supported hash algorithms, CLI arguments, and the
//! engine configuration with its defaults.

use crate::catalog::resolve_name;
use crate::error::{DigestError, IoResultExt, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// StreamDigest - incremental cryptographic digests
#[derive(Parser, Debug, Clone)]
#[command(name = "streamdigest")]
#[command(author = "StreamDigest Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Incremental SHA-1/SHA-2 digests over arbitrarily large inputs")]
#[command(long_about = r#"
StreamDigest feeds input through a streaming digest context chunk by chunk,
so files of any size are hashed without being held in memory.

Examples:
  streamdigest hash big.iso                    # SHA-256 of a file
  streamdigest hash -a sha512 a.bin b.bin      # Several files in parallel
  streamdigest verify -a sha1 file.bin <HEX>   # Compare against a digest
  streamdigest list                            # Supported algorithms
"#)]
pub struct CliArgs {
    /// Engine configuration file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Buffer size for streaming reads (e.g., 1M, 64K)
    #[arg(short = 'b', long, global = true, value_name = "SIZE")]
    pub buffer_size: Option<String>,

    /// Disable an algorithm for this run (repeatable)
    #[arg(long = "disable", global = true, value_parser = parse_algorithm, value_name = "ALGORITHM")]
    pub disable: Vec<HashAlgorithm>,

    /// Verbose output (-v, -vv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compute digests of files
    #[command(name = "hash")]
    Hash {
        /// Algorithm to use
        #[arg(short, long, value_parser = parse_algorithm, default_value = "sha256")]
        algorithm: HashAlgorithm,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Verify a file against an expected hex digest
    #[command(name = "verify")]
    Verify {
        /// Algorithm the expected digest was produced with
        #[arg(short, long, value_parser = parse_algorithm, default_value = "sha256")]
        algorithm: HashAlgorithm,
        /// File to check
        file: PathBuf,
        /// Expected digest (hex)
        expected: String,
    },

    /// List supported algorithms
    #[command(name = "list")]
    List,

    /// Measure throughput of each algorithm
    #[command(name = "benchmark")]
    Benchmark {
        /// Amount of data hashed per algorithm
        #[arg(long, default_value = "64M")]
        size: String,
    },
}

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-1 (160-bit, legacy)
    Sha1,
    /// SHA-256
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// All algorithms in identifier order
    pub const ALL: [HashAlgorithm; 4] = [Self::Sha1, Self::Sha256, Self::Sha384, Self::Sha512];

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse an algorithm name (`sha256`, `SHA-256`, `sha_512`, ...) for the CLI
pub fn parse_algorithm(name: &str) -> std::result::Result<HashAlgorithm, String> {
    resolve_name(name)
        .map(|descriptor| descriptor.algorithm)
        .map_err(|e| e.to_string())
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of contexts alive at once (None = unbounded).
    ///
    /// Enforced by `DigestEngine::create`; parallel file hashing uses it
    /// as its worker count.
    pub max_live_contexts: Option<usize>,
    /// Algorithms that `create` refuses to initialize
    pub disabled_algorithms: Vec<HashAlgorithm>,
    /// Read buffer size for reader and file hashing
    pub buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_live_contexts: None,
            disabled_algorithms: Vec::new(),
            buffer_size: 1024 * 1024, // 1MB
        }
    }
}

impl EngineConfig {
    /// Check whether an algorithm may be initialized
    pub fn is_enabled(&self, algorithm: HashAlgorithm) -> bool {
        !self.disabled_algorithms.contains(&algorithm)
    }

    /// Fail with an initialization error if the algorithm is disabled
    pub fn ensure_enabled(&self, algorithm: HashAlgorithm) -> Result<()> {
        if self.is_enabled(algorithm) {
            return Ok(());
        }
        Err(DigestError::initialization(
            algorithm.name(),
            "algorithm is disabled by engine configuration",
        ))
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_path(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(DigestError::config("buffer_size must be greater than zero"));
        }
        if self.max_live_contexts == Some(0) {
            return Err(DigestError::config("max_live_contexts must be greater than zero"));
        }
        Ok(())
    }

    /// Create config from CLI arguments, layered over an optional config file
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(size) = &args.buffer_size {
            config.buffer_size = parse_size(size)
                .map_err(|e| DigestError::config(format!("Invalid buffer size: {}", e)))?
                as usize;
        }

        for algorithm in &args.disable {
            if config.is_enabled(*algorithm) {
                config.disabled_algorithms.push(*algorithm);
            }
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() || num < 0.0 {
        return Err(format!("Invalid number: {}", num_str));
    }

    Ok((num * multiplier as f64) as u64)
}
