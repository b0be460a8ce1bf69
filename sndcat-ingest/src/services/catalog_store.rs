//! Catalog persistence
//!
//! **Commit sequence (non-dry-run):**
//! 1. Copy the current file to `<file>.bak.<timestamp>` (best-effort)
//! 2. Render the new document (sorted keys, two-space indentation)
//! 3. Write to a sibling temp file, fsync, rename over the catalog
//!
//! A dry run renders the document and touches nothing on disk.

use crate::error::{IngestError, IngestResult, InputKind};
use crate::models::CatalogDocument;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What `commit` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Written {
        path: PathBuf,
        /// `None` when the backup copy failed
        backup: Option<PathBuf>,
    },
    Previewed {
        rendered: String,
    },
}

/// Catalog file owner for one run
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the catalog
    pub fn load(&self) -> IngestResult<CatalogDocument> {
        if !self.path.exists() {
            return Err(IngestError::MissingInput {
                kind: InputKind::Catalog,
                path: self.path.clone(),
            });
        }

        let read_error = |source: sndcat_common::Error| IngestError::CatalogRead {
            path: self.path.clone(),
            source,
        };
        let text = fs::read_to_string(&self.path).map_err(|e| read_error(e.into()))?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| read_error(e.into()))?;

        let document = CatalogDocument::from_value(value);
        tracing::debug!(
            path = %self.path.display(),
            records = document.records().len(),
            "Loaded catalog"
        );
        Ok(document)
    }

    /// Deterministic text form of a document
    pub fn render(document: &CatalogDocument) -> IngestResult<String> {
        let value = document.to_value().map_err(sndcat_common::Error::from)?;
        let mut text = serde_json::to_string_pretty(&value).map_err(sndcat_common::Error::from)?;
        text.push('\n');
        Ok(text)
    }

    /// Timestamped copy of the current file, alongside it
    pub fn backup(&self) -> std::io::Result<PathBuf> {
        let backup_path = backup_path_for(&self.path, &sndcat_common::time::file_suffix(sndcat_common::time::now()));
        fs::copy(&self.path, &backup_path)?;
        Ok(backup_path)
    }

    /// Persist `document`, or only render it when `dry_run`
    pub fn commit(&self, document: &CatalogDocument, dry_run: bool) -> IngestResult<CommitOutcome> {
        let rendered = Self::render(document)?;

        if dry_run {
            tracing::info!(
                path = %self.path.display(),
                records = document.records().len(),
                "Dry run enabled, no file will be written"
            );
            return Ok(CommitOutcome::Previewed { rendered });
        }

        let backup = match self.backup() {
            Ok(path) => {
                tracing::info!(backup = %path.display(), "Backup created");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Could not create backup, continuing with write"
                );
                None
            }
        };

        write_atomic(&self.path, rendered.as_bytes()).map_err(|source| {
            tracing::error!(path = %self.path.display(), error = %source, "Catalog write failed");
            IngestError::CatalogWrite {
                path: self.path.clone(),
                source,
            }
        })?;

        tracing::info!(path = %self.path.display(), "Wrote catalog");
        Ok(CommitOutcome::Written {
            path: self.path.clone(),
            backup,
        })
    }
}

/// `<dir>/<file name>.bak.<suffix>`
pub fn backup_path_for(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".bak.{}", suffix));
    path.with_file_name(name)
}

/// Write-to-temp-then-rename so readers never see a partial catalog
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut temp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    temp_name.push(format!(".tmp.{}", Uuid::new_v4()));
    let temp_path = path.with_file_name(temp_name);

    let result = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents)?;
        file.flush()?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() && temp_path.exists() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
