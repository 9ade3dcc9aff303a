//! Whole-input hashing on top of streaming contexts
//!
//! Readers and files are fed through a [`DigestContext`] one buffer at a
//! time, so inputs of any size are hashed in bounded memory.

use crate::config::{EngineConfig, HashAlgorithm};
use crate::engine::{Digest, DigestContext};
use crate::error::{DigestError, IoResultExt, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Default read buffer for file hashing
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Digest of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    /// File that was hashed
    pub path: PathBuf,
    /// Resulting digest
    pub digest: Digest,
    /// Bytes hashed
    pub size: u64,
}

impl std::fmt::Display for FileDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  {}", self.digest, self.path.display())
    }
}

/// Compute the digest of data in memory
pub fn hash_bytes(data: &[u8], algorithm: HashAlgorithm) -> Result<Digest> {
    let mut ctx = DigestContext::for_algorithm(algorithm);
    ctx.update(data)?;
    let digest = ctx.finalize()?;
    ctx.destroy()?;
    Ok(digest)
}

/// Stream a reader through a context, returning the digest and byte count
pub fn hash_reader<R: Read>(
    reader: &mut R,
    algorithm: HashAlgorithm,
    buffer_size: usize,
) -> Result<(Digest, u64)> {
    let mut ctx = DigestContext::for_algorithm(algorithm);
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(buffer_size.max(1))
        .map_err(|e| DigestError::allocation("read buffer", e))?;
    buffer.resize(buffer_size.max(1), 0u8);

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        ctx.update(&buffer[..bytes_read])?;
    }

    let size = ctx.bytes_processed();
    let digest = ctx.finalize()?;
    ctx.destroy()?;
    Ok((digest, size))
}

/// Compute the digest of a file
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<FileDigest> {
    hash_file_with_buffer(path, algorithm, DEFAULT_BUFFER_SIZE)
}

/// Compute the digest of a file with a custom buffer size
pub fn hash_file_with_buffer(
    path: &Path,
    algorithm: HashAlgorithm,
    buffer_size: usize,
) -> Result<FileDigest> {
    let mut file = File::open(path).with_path(path)?;
    let (digest, size) = hash_reader(&mut file, algorithm, buffer_size).map_err(|e| match e {
        DigestError::Io { source, .. } => DigestError::io(path, source),
        other => other,
    })?;

    tracing::debug!("Hashed {} bytes of {:?} with {}", size, path, algorithm);

    Ok(FileDigest {
        path: path.to_path_buf(),
        digest,
        size,
    })
}

/// Check a file against an expected hex digest
pub fn verify_file(path: &Path, algorithm: HashAlgorithm, expected_hex: &str) -> Result<bool> {
    let expected = Digest::from_hex(algorithm, expected_hex)?;
    let actual = hash_file(path, algorithm)?;
    Ok(actual.digest == expected)
}

/// Hash multiple files in parallel, one context per file.
///
/// The algorithm must be enabled in `config`. With `max_live_contexts` set,
/// at most that many files are hashed at once.
pub fn hash_files_parallel(
    paths: &[PathBuf],
    algorithm: HashAlgorithm,
    config: &EngineConfig,
) -> Result<Vec<Result<FileDigest>>> {
    config.ensure_enabled(algorithm)?;

    let hash_all = || -> Vec<Result<FileDigest>> {
        paths
            .par_iter()
            .map(|path| hash_file_with_buffer(path, algorithm, config.buffer_size))
            .collect()
    };

    match config.max_live_contexts {
        Some(limit) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(limit)
                .build()
                .map_err(|e| DigestError::initialization(algorithm.name(), e.to_string()))?;
            Ok(pool.install(hash_all))
        }
        None => Ok(hash_all()),
    }
}

/// Benchmark each algorithm over `data_size` bytes
pub fn benchmark_algorithms(
    data_size: usize,
) -> Result<Vec<(HashAlgorithm, std::time::Duration, f64)>> {
    let chunk: Vec<u8> = (0..64 * 1024).map(|i| (i % 256) as u8).collect();
    let mut results = Vec::new();

    for algorithm in HashAlgorithm::ALL {
        let start = std::time::Instant::now();

        let mut ctx = DigestContext::for_algorithm(algorithm);
        let mut remaining = data_size;
        while remaining > 0 {
            let n = remaining.min(chunk.len());
            ctx.update(&chunk[..n])?;
            remaining -= n;
        }
        ctx.finalize()?;
        ctx.destroy()?;

        let duration = start.elapsed();
        let throughput = (data_size as f64) / duration.as_secs_f64().max(f64::EPSILON)
            / (1024.0 * 1024.0);

        results.push((algorithm, duration, throughput));
    }

    results.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(results)
}
