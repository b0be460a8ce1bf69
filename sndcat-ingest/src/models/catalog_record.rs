//! Catalog records and the on-disk catalog document
//!
//! A record is keyed twice: by its digit-string `id` and by its name compared
//! case-insensitively. [`Catalog`] values are only produced by the merger, so a
//! `Catalog` always satisfies both uniqueness constraints and is sorted by name.

use crate::services::id_validator;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One cataloged sound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Canonical identifier (decimal digits)
    #[serde(default, deserialize_with = "deserialize_loose_id")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Classification tags (unique, never empty once normalized)
    #[serde(default, deserialize_with = "deserialize_loose_tags")]
    pub tags: Vec<String>,
}

impl CatalogRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags,
        }
    }

    /// Case-insensitive uniqueness/sort key for this record's name
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

/// Case-insensitive, locale-neutral comparison key for a display name
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Older catalogs stored ids as JSON numbers; accept both
///
/// Numbers are canonicalized the same way candidate ids are, so `1234.0`
/// loads as `"1234"`. Anything unusable becomes `""` and is dropped later by
/// normalization.
fn deserialize_loose_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        number @ Value::Number(_) => id_validator::validate(&number).unwrap_or_default(),
        _ => String::new(),
    })
}

/// String elements of a tag array; any other shape loads as no tags
///
/// An empty list is re-derived by the classifier during normalization.
fn deserialize_loose_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Deduplicated, name-sorted record sequence
///
/// Construct through [`crate::services::catalog_merger`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
}

impl Catalog {
    pub(crate) fn from_normalized(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<CatalogRecord> {
        self.records
    }

    pub fn get(&self, id: &str) -> Option<&CatalogRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

/// Shape of the catalog file as read from disk
///
/// The shape read is the shape written back.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogDocument {
    /// `{ "sounds": [...], ...other keys }`
    Wrapped {
        records: Vec<CatalogRecord>,
        /// Top-level keys other than `sounds`, preserved verbatim
        extra: Map<String, Value>,
    },
    /// `[...]`
    Bare(Vec<CatalogRecord>),
}

impl CatalogDocument {
    /// Key holding the record array in the wrapped shape
    pub const RECORDS_KEY: &'static str = "sounds";

    /// Interpret a parsed JSON document
    ///
    /// Array elements that are not record-shaped objects are dropped with a
    /// warning; an object without a `sounds` array is treated as empty.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => CatalogDocument::Bare(parse_records(items)),
            Value::Object(mut map) => {
                let records = match map.remove(Self::RECORDS_KEY) {
                    Some(Value::Array(items)) => parse_records(items),
                    Some(other) => {
                        tracing::warn!(
                            found = %json_kind(&other),
                            "Catalog '{}' is not an array, starting from an empty list",
                            Self::RECORDS_KEY
                        );
                        Vec::new()
                    }
                    None => Vec::new(),
                };
                CatalogDocument::Wrapped {
                    records,
                    extra: map,
                }
            }
            other => {
                tracing::warn!(
                    found = %json_kind(&other),
                    "Catalog document is neither an object nor an array, starting empty"
                );
                CatalogDocument::Wrapped {
                    records: Vec::new(),
                    extra: Map::new(),
                }
            }
        }
    }

    /// Empty wrapped document
    pub fn empty() -> Self {
        CatalogDocument::Wrapped {
            records: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn records(&self) -> &[CatalogRecord] {
        match self {
            CatalogDocument::Wrapped { records, .. } => records,
            CatalogDocument::Bare(records) => records,
        }
    }

    /// Take the records out, leaving the document shape in place
    pub fn take_records(&mut self) -> Vec<CatalogRecord> {
        match self {
            CatalogDocument::Wrapped { records, .. } => std::mem::take(records),
            CatalogDocument::Bare(records) => std::mem::take(records),
        }
    }

    /// Same shape, records replaced by `catalog`
    pub fn with_catalog(self, catalog: Catalog) -> Self {
        let records = catalog.into_records();
        match self {
            CatalogDocument::Wrapped { extra, .. } => CatalogDocument::Wrapped { records, extra },
            CatalogDocument::Bare(_) => CatalogDocument::Bare(records),
        }
    }

    /// JSON value with deterministic key order
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            CatalogDocument::Bare(records) => serde_json::to_value(records),
            CatalogDocument::Wrapped { records, extra } => {
                let mut map = extra.clone();
                map.insert(Self::RECORDS_KEY.to_string(), serde_json::to_value(records)?);
                Ok(Value::Object(map))
            }
        }
    }
}

fn parse_records(items: Vec<Value>) -> Vec<CatalogRecord> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<CatalogRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "Dropping malformed catalog entry");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
