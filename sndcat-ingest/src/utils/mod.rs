//! Utility modules for sndcat-ingest

pub mod backoff;

pub use backoff::{exponential_delay, parse_retry_after};
