//! Candidate identifiers awaiting validation

use serde_json::Value;

/// One entry from the candidate file
///
/// `raw_id` is untrusted until it passes
/// [`crate::services::id_validator::validate`]. A non-empty `name` means the
/// candidate arrived pre-resolved and skips the remote lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub raw_id: Value,
    pub name: Option<String>,
}

impl Candidate {
    /// Candidate that still needs a remote lookup
    pub fn from_raw(raw_id: impl Into<Value>) -> Self {
        Self {
            raw_id: raw_id.into(),
            name: None,
        }
    }

    /// Candidate whose display name is already known
    pub fn pre_resolved(raw_id: impl Into<Value>, name: impl Into<String>) -> Self {
        Self {
            raw_id: raw_id.into(),
            name: Some(name.into()),
        }
    }

    /// Pre-resolved name, if present and not blank
    pub fn known_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
