//! Error types for StreamDigest
//!
//! Every engine operation yields either its success value or exactly one
//! [`DigestError`]. Errors carry a coarse [`ErrorKind`] tag so a host
//! boundary can report them without matching on individual variants.

use serde::{Deserialize, Serialize};
use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for digest operations
#[derive(Error, Debug)]
pub enum DigestError {
    /// Algorithm identifier is not in the catalog
    #[error("Unknown hash algorithm identifier: {0}")]
    UnknownAlgorithm(i64),

    /// Algorithm name is not in the catalog
    #[error("Unknown hash algorithm name: '{0}'")]
    UnknownAlgorithmName(String),

    /// Algorithm state could not be set up
    #[error("Failed to initialize {algorithm}: {message}")]
    Initialization {
        algorithm: &'static str,
        message: String,
    },

    /// Operation is not legal in the context's current state
    #[error("Cannot {operation} a context in state {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// Handle does not refer to a live context
    #[error("Stale or unknown context handle {0:#018x}")]
    StaleHandle(u64),

    /// Underlying primitive rejected the operation
    #[error("{algorithm} computation failed: {message}")]
    Computation {
        algorithm: &'static str,
        message: String,
    },

    /// Resource exhaustion
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// I/O error while streaming input
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed caller input outside the lifecycle operations
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse classification of a [`DigestError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unknown algorithm identifier or name
    NotFound,
    /// Algorithm setup failed
    Initialization,
    /// Operation illegal in the current context state
    InvalidState,
    /// Underlying primitive failed mid-operation
    Computation,
    /// Resource exhaustion
    Allocation,
    /// Input stream could not be read
    Io,
    /// Caller supplied malformed data
    InvalidInput,
    /// Engine configuration is invalid
    Config,
}

impl ErrorKind {
    /// Stable name used at the host boundary
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFoundError",
            Self::Initialization => "InitializationError",
            Self::InvalidState => "InvalidStateError",
            Self::Computation => "ComputationError",
            Self::Allocation => "AllocationError",
            Self::Io => "IoError",
            Self::InvalidInput => "InvalidInputError",
            Self::Config => "ConfigError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete error value handed across the host boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Coarse error kind
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl DigestError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an initialization error
    pub fn initialization(algorithm: &'static str, message: impl Into<String>) -> Self {
        Self::Initialization {
            algorithm,
            message: message.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(operation: &'static str, state: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    /// Create a computation error
    pub fn computation(algorithm: &'static str, message: impl Into<String>) -> Self {
        Self::Computation {
            algorithm,
            message: message.into(),
        }
    }

    /// Create an allocation error from a failed reservation
    pub fn allocation(what: &str, source: TryReserveError) -> Self {
        Self::Allocation(format!("{}: {}", what, source))
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAlgorithm(_) | Self::UnknownAlgorithmName(_) => ErrorKind::NotFound,
            Self::Initialization { .. } => ErrorKind::Initialization,
            Self::InvalidState { .. } | Self::StaleHandle(_) => ErrorKind::InvalidState,
            Self::Computation { .. } => ErrorKind::Computation,
            Self::Allocation(_) => ErrorKind::Allocation,
            Self::Io { .. } => ErrorKind::Io,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// Convert into the value reported to the host
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }

    /// Check if the caller can carry on after this error.
    ///
    /// Only resource exhaustion is left to the caller's discretion.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Allocation(_))
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<DigestError> for ErrorReport {
    fn from(err: DigestError) -> Self {
        err.report()
    }
}

/// Result type alias for digest operations
pub type Result<T> = std::result::Result<T, DigestError>;

impl From<std::io::Error> for DigestError {
    fn from(err: std::io::Error) -> Self {
        DigestError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for DigestError {
    fn from(err: serde_json::Error) -> Self {
        DigestError::ConfigError(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| DigestError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = DigestError::io("/test/path", io_err);
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/path"));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(DigestError::UnknownAlgorithm(9).kind(), ErrorKind::NotFound);
        assert_eq!(DigestError::StaleHandle(1).kind(), ErrorKind::InvalidState);
        assert_eq!(
            DigestError::invalid_state("update", "Finalized").kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            DigestError::computation("SHA-1", "boom").kind(),
            ErrorKind::Computation
        );
    }

    #[test]
    fn test_error_recoverability() {
        assert!(DigestError::UnknownAlgorithm(-1).is_recoverable());
        assert!(!DigestError::Allocation("out of memory".into()).is_recoverable());
    }

    #[test]
    fn test_report() {
        let report = DigestError::UnknownAlgorithm(7).report();
        assert_eq!(report.kind, ErrorKind::NotFound);
        assert_eq!(report.message, "Unknown hash algorithm identifier: 7");
        assert_eq!(
            report.to_string(),
            "NotFoundError: Unknown hash algorithm identifier: 7"
        );

        let json = serde_json::to_string(&report).unwrap();
        let parsed: ErrorReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_allocation_from_try_reserve() {
        let mut v: Vec<u8> = Vec::new();
        let err = v.try_reserve_exact(usize::MAX).unwrap_err();
        let err = DigestError::allocation("digest buffer", err);
        assert_eq!(err.kind(), ErrorKind::Allocation);
        assert!(err.to_string().starts_with("Allocation failed: digest buffer"));
    }
}
