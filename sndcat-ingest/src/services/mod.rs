//! Ingest services
//!
//! Leaves first: validation, lookup and classification feed the merger, whose
//! output the store persists.

pub mod asset_client;
pub mod candidate_source;
pub mod catalog_merger;
pub mod catalog_store;
pub mod id_validator;
pub mod tag_classifier;

pub use asset_client::{
    AssetClient, AssetResponse, AssetTransport, HttpAssetTransport, LookupError, RetryPolicy,
};
pub use candidate_source::{load_candidates, parse_candidates};
pub use catalog_merger::{merge, CatalogMerger, FoldOutcome};
pub use catalog_store::{CatalogStore, CommitOutcome};
pub use id_validator::{validate, InvalidId};
pub use tag_classifier::{TagClassifier, TagRule, TagRules};
