//! Library error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the sweep analysis library.
///
/// Only [`SweepError::NoInputFiles`] and [`SweepError::Config`] abort a run.
/// A [`SweepError::SourceRead`] is attached to the file it came from and the
/// remaining files are still processed.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("failed to read {}: {reason}", .path.display())]
    SourceRead { path: PathBuf, reason: String },

    #[error("no input files were supplied")]
    NoInputFiles,

    #[error("configuration error: {0}")]
    Config(String),
}

impl SweepError {
    /// Wrap a loader failure, keeping the full context chain as text.
    pub fn source_read(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        SweepError::SourceRead {
            path: path.into(),
            reason: format!("{err:#}"),
        }
    }
}

/// Result type alias for sweep analysis operations
pub type SweepResult<T> = Result<T, SweepError>;
