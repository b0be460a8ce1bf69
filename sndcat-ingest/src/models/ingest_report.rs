//! Run summary counters
//!
//! Reported at the end of every run that reaches the commit step, regardless of
//! how many candidates were skipped along the way.

use serde::{Deserialize, Serialize};

/// Per-run ingest statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Entries read from the candidate file
    pub candidates: usize,
    /// Candidates that passed identifier validation
    pub validated: usize,
    /// Candidates rejected by validation
    pub rejected: usize,
    /// Validated ids already in the catalog (or repeated in this batch)
    pub already_present: usize,
    /// Names obtained, remotely or pre-resolved
    pub resolved: usize,
    /// Lookups that fast-failed or exhausted retries
    pub lookup_failures: usize,
    /// Resolved records dropped for a case-insensitive name collision
    pub duplicate_names: usize,
    /// Records appended to the catalog
    pub added: usize,
    /// Records in the committed catalog
    pub catalog_size: usize,
    /// True when nothing was written
    pub dry_run: bool,
}

impl IngestReport {
    /// Candidates that did not result in a new record
    pub fn skipped(&self) -> usize {
        self.rejected + self.already_present + self.lookup_failures + self.duplicate_names
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} candidates: {} validated, {} resolved, {} skipped, {} added ({} records{})",
            self.candidates,
            self.validated,
            self.resolved,
            self.skipped(),
            self.added,
            self.catalog_size,
            if self.dry_run { ", dry run" } else { "" }
        )
    }
}
