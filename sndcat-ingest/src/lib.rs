//! sndcat-ingest library interface
//!
//! Exposes the ingest services and pipeline for the binary and for
//! integration testing.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

pub use crate::config::{CliOverrides, IngestSettings};
pub use crate::error::{IngestError, IngestResult, InputKind};
pub use crate::workflow::{run_ingest, IngestOutcome, IngestPipeline};
