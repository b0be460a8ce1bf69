//! # sndcat Common Library
//!
//! Shared code for the sndcat crates including:
//! - Error types
//! - TOML configuration loading
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod time;

pub use error::{Error, Result};
