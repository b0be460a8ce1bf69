//! Candidate file reader
//!
//! Two shapes are accepted:
//! - `{ "ids": [123, "456", ...] }`: raw ids needing a remote lookup
//! - `[ { "id": 123, "name": "Oof" }, ... ]`: pre-resolved pairs; entries
//!   without a usable name fall back to a lookup, bare scalars are raw ids

use crate::error::{IngestError, IngestResult, InputKind};
use crate::models::Candidate;
use serde_json::Value;
use std::path::Path;

/// Read candidates from `path`
///
/// A missing file is fatal. A file that cannot be read or parsed is logged
/// and treated as an empty list, so the run still commits and reports.
pub fn load_candidates(path: &Path) -> IngestResult<Vec<Candidate>> {
    if !path.exists() {
        return Err(IngestError::MissingInput {
            kind: InputKind::Candidates,
            path: path.to_path_buf(),
        });
    }

    let value = std::fs::read_to_string(path)
        .map_err(sndcat_common::Error::from)
        .and_then(|text| serde_json::from_str::<Value>(&text).map_err(sndcat_common::Error::from));

    match value {
        Ok(value) => Ok(parse_candidates(value)),
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Unable to read/parse candidate file, continuing with no candidates"
            );
            Ok(Vec::new())
        }
    }
}

/// Interpret a parsed candidate document
pub fn parse_candidates(value: Value) -> Vec<Candidate> {
    match value {
        Value::Object(mut map) => match map.remove("ids") {
            Some(Value::Array(ids)) => ids.into_iter().map(Candidate::from_raw).collect(),
            Some(other) => {
                tracing::warn!(found = %other, "Candidate 'ids' is not an array, ignoring");
                Vec::new()
            }
            None => Vec::new(),
        },
        Value::Array(items) => items.into_iter().map(candidate_from_item).collect(),
        other => {
            tracing::warn!(found = %other, "Candidate file is neither an object nor an array");
            Vec::new()
        }
    }
}

fn candidate_from_item(item: Value) -> Candidate {
    match item {
        Value::Object(mut entry) => {
            let raw_id = entry.remove("id").unwrap_or(Value::Null);
            let name = match entry.remove("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            };
            Candidate { raw_id, name }
        }
        scalar => Candidate::from_raw(scalar),
    }
}
