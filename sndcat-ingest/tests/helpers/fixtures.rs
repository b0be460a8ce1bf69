//! Filesystem fixtures
//!
//! A [`TestCatalog`] owns a temp directory holding `sounds.json` and
//! `new_ids.json`; the directory lives as long as the fixture.

use super::FakeAssets;
use serde_json::Value;
use sndcat_ingest::services::{AssetClient, CatalogStore, RetryPolicy, TagClassifier};
use sndcat_ingest::IngestPipeline;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Two retries, 10 ms base delay
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(2, Duration::from_millis(10))
}

pub struct TestCatalog {
    dir: TempDir,
    pub catalog_path: PathBuf,
    pub candidates_path: PathBuf,
}

impl TestCatalog {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let catalog_path = dir.path().join("sounds.json");
        let candidates_path = dir.path().join("new_ids.json");
        Self {
            dir,
            catalog_path,
            candidates_path,
        }
    }

    pub fn write_catalog(&self, value: Value) {
        std::fs::write(&self.catalog_path, value.to_string()).unwrap();
    }

    pub fn write_candidates(&self, value: Value) {
        std::fs::write(&self.candidates_path, value.to_string()).unwrap();
    }

    pub fn catalog_bytes(&self) -> Vec<u8> {
        std::fs::read(&self.catalog_path).unwrap()
    }

    pub fn read_catalog(&self) -> Value {
        serde_json::from_slice(&self.catalog_bytes()).unwrap()
    }

    /// Backup files next to the catalog
    pub fn backups(&self) -> Vec<PathBuf> {
        let mut backups: Vec<PathBuf> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().starts_with("sounds.json.bak."))
                    .unwrap_or(false)
            })
            .collect();
        backups.sort();
        backups
    }

    /// Number of entries in the fixture directory
    pub fn file_count(&self) -> usize {
        std::fs::read_dir(self.dir.path()).unwrap().count()
    }

    pub fn pipeline(&self, assets: FakeAssets) -> IngestPipeline<FakeAssets> {
        IngestPipeline::new(
            CatalogStore::new(&self.catalog_path),
            AssetClient::new(assets, fast_policy()),
            TagClassifier::default(),
        )
    }
}
