//! Run orchestration
//!
//! Candidates are processed one at a time, in input order, on a single task.
//! The only suspension points are lookup backoff and pacing waits.

pub mod pipeline;

pub use pipeline::{run_ingest, IngestOutcome, IngestPipeline};
