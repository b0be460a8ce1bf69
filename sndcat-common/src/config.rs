//! Configuration loading and config file resolution
//!
//! Settings are resolved per value with the priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 are handled by each binary's argument parser; this module
//! owns tier 3 and the location of the TOML file itself.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SNDCAT_CONFIG";

/// Contents of `config.toml`
///
/// Every field is optional; a missing file or missing section falls back to
/// compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Catalog JSON file to update
    pub catalog_path: Option<PathBuf>,
    /// Candidate id JSON file
    pub candidates_path: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub lookup: LookupConfig,
    pub classifier: ClassifierConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[lookup]` section (remote asset lookup budget)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    /// Pacing quota; unset means requests are only spaced by backoff
    pub requests_per_second: Option<u32>,
    /// URL template containing `{id}`
    pub endpoint: Option<String>,
}

/// `[classifier]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub default_tag: Option<String>,
    /// Ordered keyword groups; an empty list keeps the built-in table
    pub rules: Vec<TagRuleConfig>,
}

/// One `[[classifier.rules]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRuleConfig {
    pub tag: String,
    pub keywords: Vec<String>,
}

/// Locate the config file
///
/// Priority: explicit path → `SNDCAT_CONFIG` → platform config directory.
/// Returns `None` only when no candidate location can be determined.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Platform default: `<config dir>/sndcat/config.toml`
///
/// Linux `~/.config`, macOS `~/Library/Application Support`, Windows `%APPDATA%`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sndcat").join("config.toml"))
}

/// Load TOML config, degrading gracefully
///
/// A missing file yields defaults (logged); a file that exists but cannot be
/// read or parsed is a configuration error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file location available, using defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        info!("Config file not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    for rule in &config.classifier.rules {
        if rule.tag.trim().is_empty() || rule.keywords.is_empty() {
            warn!(
                tag = %rule.tag,
                "Classifier rule has an empty tag or no keywords and will never match"
            );
        }
    }

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Standard user-agent for outbound HTTP requests
pub fn get_user_agent() -> String {
    format!("sndcat/{}", env!("CARGO_PKG_VERSION"))
}
