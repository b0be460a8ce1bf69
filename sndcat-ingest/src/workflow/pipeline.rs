//! Ingest pipeline orchestrator
//!
//! # Phases
//! - **Load**: read the catalog; a missing file aborts before any request
//! - **Resolve**: per candidate, strictly in input order: validate, skip
//!   known ids, look up the name (or take the pre-resolved one), classify
//! - **Merge**: fold each resolved record, then normalize and sort
//! - **Commit**: back up and write, or render only on a dry run
//!
//! # Error Handling
//! - Per-candidate failures are counted in the [`IngestReport`] and never
//!   abort the run
//! - Missing inputs and catalog write failures are fatal [`IngestError`]s;
//!   once the commit step is reached the summary is logged either way

use crate::config::IngestSettings;
use crate::error::{IngestError, IngestResult};
use crate::models::{Candidate, CatalogRecord, IngestReport};
use crate::services::asset_client::{AssetClient, AssetTransport, HttpAssetTransport};
use crate::services::candidate_source::load_candidates;
use crate::services::catalog_merger::{CatalogMerger, FoldOutcome};
use crate::services::catalog_store::{CatalogStore, CommitOutcome};
use crate::services::id_validator;
use crate::services::tag_classifier::TagClassifier;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub report: IngestReport,
    pub commit: CommitOutcome,
}

/// One catalog, one client, one classifier
pub struct IngestPipeline<T> {
    store: CatalogStore,
    client: AssetClient<T>,
    classifier: TagClassifier,
}

impl<T: AssetTransport> IngestPipeline<T> {
    pub fn new(store: CatalogStore, client: AssetClient<T>, classifier: TagClassifier) -> Self {
        Self {
            store,
            client,
            classifier,
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn client(&self) -> &AssetClient<T> {
        &self.client
    }

    /// Ingest `candidates` into the catalog
    pub async fn run(&self, candidates: Vec<Candidate>, dry_run: bool) -> IngestResult<IngestOutcome> {
        let mut document = self.store.load()?;
        let mut merger = CatalogMerger::new(document.take_records(), self.classifier.clone());
        info!(
            catalog = %self.store.path().display(),
            existing = merger.len(),
            candidates = candidates.len(),
            dry_run,
            "Starting ingest"
        );

        let mut report = IngestReport {
            candidates: candidates.len(),
            dry_run,
            ..Default::default()
        };
        // Ids resolved or attempted in this batch; a repeat is never looked up twice
        let mut attempted: HashSet<String> = HashSet::new();

        for candidate in candidates {
            let id = match id_validator::validate(&candidate.raw_id) {
                Ok(id) => id,
                Err(reason) => {
                    warn!(raw_id = %candidate.raw_id, %reason, "Skipping invalid id");
                    report.rejected += 1;
                    continue;
                }
            };
            report.validated += 1;

            if merger.contains_id(&id) || !attempted.insert(id.clone()) {
                info!(id = %id, "Already present");
                report.already_present += 1;
                continue;
            }

            let name = match candidate.known_name() {
                Some(name) => {
                    debug!(id = %id, name = %name, "Using pre-resolved name");
                    name.to_string()
                }
                None => match self.client.lookup(&id).await {
                    Ok(name) => name,
                    Err(e) => {
                        warn!(id = %id, error = %e, "Could not resolve name, skipping");
                        report.lookup_failures += 1;
                        continue;
                    }
                },
            };
            report.resolved += 1;

            let tags = self.classifier.classify(&name);
            match merger.fold(CatalogRecord::new(id, name, tags)) {
                FoldOutcome::Added => report.added += 1,
                FoldOutcome::DuplicateName => report.duplicate_names += 1,
                FoldOutcome::DuplicateId => report.already_present += 1,
            }
        }

        let catalog = merger.finish();
        report.catalog_size = catalog.len();
        let document = document.with_catalog(catalog);

        // The summary is reported even when the write fails
        match self.store.commit(&document, dry_run) {
            Ok(commit) => {
                info!("Ingest complete: {}", report.display_string());
                Ok(IngestOutcome { report, commit })
            }
            Err(e) => {
                error!("Ingest aborted at commit: {}", report.display_string());
                Err(e)
            }
        }
    }
}

/// Run with production wiring
///
/// Reads the candidate file, then hands off to [`IngestPipeline::run`], which
/// loads the catalog before the first request goes out.
pub async fn run_ingest(settings: &IngestSettings, dry_run: bool) -> IngestResult<IngestOutcome> {
    let candidates = load_candidates(&settings.candidates_path)?;

    let transport = HttpAssetTransport::new(
        settings.endpoint.clone(),
        settings.request_timeout,
        &sndcat_common::config::get_user_agent(),
        settings.requests_per_second,
    )
    .map_err(|e| IngestError::Config(format!("Failed to build HTTP client: {}", e)))?;

    let pipeline = IngestPipeline::new(
        CatalogStore::new(&settings.catalog_path),
        AssetClient::new(transport, settings.retry_policy),
        TagClassifier::new(settings.tag_rules.clone()),
    );

    pipeline.run(candidates, dry_run).await
}
