//! Error types for dataset building, benchmarking and reporting

use std::path::PathBuf;

use thiserror::Error;

use crate::ops::OperationKind;
use crate::registry::Method;

/// Errors surfaced by the benchmark pipeline
#[derive(Error, Debug)]
pub enum BenchError {
    /// A requested method has no implementation available
    #[error("no implementation available for method `{method}`")]
    DependencyLoad { method: Method },

    /// Seed table or parameters are malformed
    #[error("invalid input: {0}")]
    Input(String),

    /// Output artifact or export could not be written
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A timed operation failed; its whole benchmark is discarded
    #[error("operation `{operation}` failed for method `{method}`: {message}")]
    Operation {
        operation: OperationKind,
        method: Method,
        message: String,
    },

    /// Activation/benchmark phases were driven out of order
    #[error("phase order violation: {0}")]
    Phase(String),

    /// Configuration file could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl BenchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;
