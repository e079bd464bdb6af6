//! Error types shared across the analysis phases.

use std::io;

use thiserror::Error;

/// Error type for loading, locating and output operations.
///
/// Per-file and per-target failures are recoverable by design: the loader
/// skips a module that fails to parse and the batch driver skips a target
/// pair it cannot resolve. Callers decide whether an error aborts the run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// One IR file failed to parse. Never fatal for the whole run.
    #[error("failed to load IR file {path}: {message}")]
    ModuleParse { path: String, message: String },

    /// A target query resolved to nothing.
    #[error("target not found: {0}")]
    TargetNotFound(String),

    /// Underlying I/O failure while reading configs or writing results.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
