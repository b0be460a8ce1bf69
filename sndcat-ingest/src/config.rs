//! Settings resolution for sndcat-ingest
//!
//! **Priority per setting:** CLI flag → environment variable → TOML → compiled
//! default. The first two tiers arrive merged in [`CliOverrides`] (clap reads
//! the environment for each flag).

use crate::error::{IngestError, IngestResult};
use crate::services::asset_client::{
    RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRIES,
};
use crate::services::tag_classifier::TagRules;
use sndcat_common::config::TomlConfig;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CATALOG_PATH: &str = "sounds.json";
pub const DEFAULT_CANDIDATES_PATH: &str = "new_ids.json";

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub catalog_path: Option<PathBuf>,
    pub candidates_path: Option<PathBuf>,
    pub retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub catalog_path: PathBuf,
    pub candidates_path: PathBuf,
    pub retry_policy: RetryPolicy,
    pub request_timeout: Duration,
    pub requests_per_second: Option<NonZeroU32>,
    /// URL template containing `{id}`
    pub endpoint: String,
    pub tag_rules: TagRules,
}

impl IngestSettings {
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> IngestResult<Self> {
        let lookup = &toml.lookup;

        let endpoint = lookup
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if !endpoint.contains("{id}") {
            return Err(IngestError::Config(format!(
                "lookup endpoint must contain an {{id}} placeholder: {}",
                endpoint
            )));
        }

        let requests_per_second = match lookup.requests_per_second {
            None => None,
            Some(rps) => Some(NonZeroU32::new(rps).ok_or_else(|| {
                IngestError::Config("lookup.requests_per_second must be greater than 0".to_string())
            })?),
        };

        let request_timeout_secs = lookup
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(IngestError::Config(
                "lookup.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        let retries = cli.retries.or(lookup.retries).unwrap_or(DEFAULT_RETRIES);
        let base_delay_ms = cli
            .base_delay_ms
            .or(lookup.base_delay_ms)
            .unwrap_or(DEFAULT_BASE_DELAY_MS);

        Ok(Self {
            catalog_path: cli
                .catalog_path
                .clone()
                .or_else(|| toml.catalog_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
            candidates_path: cli
                .candidates_path
                .clone()
                .or_else(|| toml.candidates_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CANDIDATES_PATH)),
            retry_policy: RetryPolicy::new(retries, Duration::from_millis(base_delay_ms)),
            request_timeout: Duration::from_secs(request_timeout_secs),
            requests_per_second,
            endpoint,
            tag_rules: TagRules::from_config(&toml.classifier),
        })
    }
}
