//! Catalog merge, deduplication and ordering
//!
//! **Algorithm:**
//! 1. Append: fold each resolved record in resolution order, skipping it when
//!    its id or case-insensitive name is already present. Uniqueness sets are
//!    updated immediately so later records in the same batch see it.
//! 2. Normalize: scan the combined sequence once more; the first occurrence of
//!    an id or name wins, tags are de-duplicated (and re-derived through the
//!    classifier when absent).
//! 3. Sort: order by name, case-insensitive.
//!
//! Loaded records go through the same normalize pass as new ones.

use crate::models::{name_key, Catalog, CatalogRecord};
use crate::services::id_validator;
use crate::services::tag_classifier::TagClassifier;
use std::collections::HashSet;

/// Result of folding one record into the merger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldOutcome {
    Added,
    /// Id already cataloged
    DuplicateId,
    /// Name already cataloged (case-insensitive) under another record
    DuplicateName,
}

/// Incremental catalog builder
///
/// Seeded with the existing catalog, fed resolved records one at a time, and
/// finished into a [`Catalog`].
pub struct CatalogMerger {
    records: Vec<CatalogRecord>,
    ids: HashSet<String>,
    names: HashSet<String>,
    classifier: TagClassifier,
}

impl CatalogMerger {
    pub fn new(existing: Vec<CatalogRecord>, classifier: TagClassifier) -> Self {
        // Unusable loaded records must not claim an id or name
        let existing = normalize_records(existing, &classifier);
        let ids = existing.iter().map(|r| r.id.clone()).collect();
        let names = existing.iter().map(CatalogRecord::name_key).collect();

        Self {
            records: existing,
            ids,
            names,
            classifier,
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id.trim())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(&name_key(name))
    }

    /// Records held so far, including not-yet-normalized duplicates
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append phase for one record
    pub fn fold(&mut self, record: CatalogRecord) -> FoldOutcome {
        if self.contains_id(&record.id) {
            tracing::info!(id = %record.id, "Already present");
            return FoldOutcome::DuplicateId;
        }
        if self.contains_name(&record.name) {
            tracing::info!(
                id = %record.id,
                name = %record.name,
                "Skipping existing name under a different id"
            );
            return FoldOutcome::DuplicateName;
        }

        self.ids.insert(record.id.trim().to_string());
        self.names.insert(record.name_key());
        tracing::info!(
            id = %record.id,
            name = %record.name,
            tags = ?record.tags,
            "Added"
        );
        self.records.push(record);
        FoldOutcome::Added
    }

    /// Normalize and sort phases
    pub fn finish(self) -> Catalog {
        let mut records = normalize_records(self.records, &self.classifier);
        sort_by_name(&mut records);
        Catalog::from_normalized(records)
    }
}

/// Full merge in one call
pub fn merge(
    existing: Vec<CatalogRecord>,
    resolved: Vec<CatalogRecord>,
    classifier: &TagClassifier,
) -> Catalog {
    let mut merger = CatalogMerger::new(existing, classifier.clone());
    for record in resolved {
        merger.fold(record);
    }
    merger.finish()
}

/// Normalize phase: first occurrence wins, tags de-duplicated
///
/// Records with an invalid id or a blank name cannot satisfy the catalog
/// invariants and are dropped.
pub fn normalize_records(
    records: Vec<CatalogRecord>,
    classifier: &TagClassifier,
) -> Vec<CatalogRecord> {
    let mut seen_ids: HashSet<String> = HashSet::with_capacity(records.len());
    let mut seen_names: HashSet<String> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        let id = match id_validator::validate_str(&record.id) {
            Ok(id) => id,
            Err(reason) => {
                tracing::warn!(id = %record.id, name = %record.name, %reason, "Dropping record with invalid id");
                continue;
            }
        };
        if record.name.trim().is_empty() {
            tracing::warn!(id = %id, "Dropping record with empty name");
            continue;
        }

        let key = record.name_key();
        if seen_ids.contains(&id) || seen_names.contains(&key) {
            tracing::debug!(id = %id, name = %record.name, "Dropping duplicate record");
            continue;
        }
        seen_ids.insert(id.clone());
        seen_names.insert(key);

        let tags = normalize_tags(record.tags, &record.name, classifier);
        kept.push(CatalogRecord {
            id,
            name: record.name,
            tags,
        });
    }

    kept
}

/// Unique, non-blank tags in first-seen order; classified when none remain
fn normalize_tags(tags: Vec<String>, name: &str, classifier: &TagClassifier) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !unique.iter().any(|t| t == tag) {
            unique.push(tag.to_string());
        }
    }

    if unique.is_empty() {
        classifier.classify(name)
    } else {
        unique
    }
}

/// Sort phase: case-insensitive by name
pub fn sort_by_name(records: &mut [CatalogRecord]) {
    records.sort_by_cached_key(CatalogRecord::name_key);
}
