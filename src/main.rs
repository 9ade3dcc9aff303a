//! StreamDigest CLI - incremental file digests

use clap::Parser;
use streamdigest::catalog;
use streamdigest::config::{parse_size, CliArgs, Commands, EngineConfig, HashAlgorithm};
use streamdigest::error::{DigestError, Result};
use streamdigest::hash::{benchmark_algorithms, hash_files_parallel, verify_file, FileDigest};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging
    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Handle result
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config = EngineConfig::from_cli(&args)?;

    match &args.command {
        Commands::Hash {
            algorithm,
            json,
            files,
        } => cmd_hash(&config, *algorithm, *json, files),
        Commands::Verify {
            algorithm,
            file,
            expected,
        } => cmd_verify(&config, *algorithm, file, expected),
        Commands::List => cmd_list(&config),
        Commands::Benchmark { size } => cmd_benchmark(size),
    }
}

fn cmd_hash(
    config: &EngineConfig,
    algorithm: HashAlgorithm,
    json: bool,
    files: &[PathBuf],
) -> Result<()> {
    let results = hash_files_parallel(files, algorithm, config)?;
    let mut digests: Vec<FileDigest> = Vec::with_capacity(results.len());
    let mut failures = 0usize;

    for result in results {
        match result {
            Ok(file_digest) => digests.push(file_digest),
            Err(e) => {
                failures += 1;
                eprintln!("{}", e);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&digests)?);
    } else {
        for file_digest in &digests {
            println!("{}", file_digest);
        }
    }

    if failures > 0 {
        tracing::warn!("{} of {} files could not be hashed", failures, files.len());
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_verify(
    config: &EngineConfig,
    algorithm: HashAlgorithm,
    file: &Path,
    expected: &str,
) -> Result<()> {
    config.ensure_enabled(algorithm)?;

    let matches = verify_file(file, algorithm, expected)?;
    println!(
        "{}: {}",
        file.display(),
        if matches { "OK" } else { "FAILED" }
    );

    if !matches {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_list(config: &EngineConfig) -> Result<()> {
    println!("{:<4} {:<10} {:>8} {:>8}  Status", "ID", "Algorithm", "Digest", "Block");
    for descriptor in catalog::descriptors() {
        println!(
            "{:<4} {:<10} {:>7}B {:>7}B  {}",
            descriptor.identifier,
            descriptor.name(),
            descriptor.output_length,
            descriptor.block_size,
            if config.is_enabled(descriptor.algorithm) { "enabled" } else { "disabled" }
        );
    }
    Ok(())
}

fn cmd_benchmark(size: &str) -> Result<()> {
    let size_bytes = parse_size(size).map_err(DigestError::ConfigError)?;
    let data_size = usize::try_from(size_bytes)
        .map_err(|_| DigestError::config(format!("Benchmark size too large: {}", size)))?;

    println!("=== StreamDigest Benchmark ===");
    println!(
        "Data per algorithm: {}\n",
        humansize::format_size(size_bytes, humansize::BINARY)
    );

    for (algorithm, duration, throughput) in benchmark_algorithms(data_size)? {
        println!(
            "{:<10} {:>10.2?}  {:>10.1} MB/s",
            algorithm.name(),
            duration,
            throughput
        );
    }

    Ok(())
}
