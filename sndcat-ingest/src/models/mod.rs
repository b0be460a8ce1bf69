//! Data models for sndcat-ingest

pub mod candidate;
pub mod catalog_record;
pub mod ingest_report;

pub use candidate::Candidate;
pub use catalog_record::{name_key, Catalog, CatalogDocument, CatalogRecord};
pub use ingest_report::IngestReport;
