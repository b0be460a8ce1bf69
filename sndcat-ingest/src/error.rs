//! Error types for sndcat-ingest
//!
//! Only run-level failures live here. Per-candidate problems (invalid ids,
//! failed lookups, duplicates) are recovered inside the pipeline and show up in
//! the run summary instead.

use std::path::PathBuf;
use thiserror::Error;

/// Which required input was missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Catalog,
    Candidates,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Catalog => write!(f, "catalog file"),
            InputKind::Candidates => write!(f, "candidate file"),
        }
    }
}

/// Fatal ingest run errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// Required input file absent; raised before any network activity
    #[error("{kind} not found at {}", path.display())]
    MissingInput { kind: InputKind, path: PathBuf },

    /// Catalog exists but could not be read or parsed
    #[error("Unable to read/parse {}: {source}", path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: sndcat_common::Error,
    },

    /// Writing the new catalog failed; the file may be unchanged
    #[error("Failed to write {}: {source}", path.display())]
    CatalogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid resolved settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// sndcat-common error
    #[error(transparent)]
    Common(#[from] sndcat_common::Error),
}

impl IngestError {
    /// Process exit code for the CLI wrapper
    ///
    /// `2` missing input, `3` catalog write failure, `1` everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            IngestError::MissingInput { .. } => 2,
            IngestError::CatalogWrite { .. } => 3,
            _ => 1,
        }
    }
}

/// Result type for ingest runs
pub type IngestResult<T> = Result<T, IngestError>;
