//! Test Helper Utilities
//!
//! Shared utilities for testing sndcat-ingest

#![allow(dead_code)]

pub mod fake_assets;
pub mod fixtures;
pub mod log_capture;

// Re-export commonly used items
pub use fake_assets::FakeAssets;
pub use fixtures::{fast_policy, TestCatalog};
pub use log_capture::LogCapture;
