//! Name → tag classification
//!
//! **Behavior:**
//! - Lowercased name is matched against an ordered table of keyword groups
//! - A group matches when any of its keywords is a substring of the name
//! - Every matching group contributes its tag, in table order
//! - No match yields the single default tag
//!
//! The rule table is an immutable value handed to the classifier at
//! construction, so callers (and tests) can supply their own.

use sndcat_common::config::ClassifierConfig;
use std::sync::Arc;

/// Tag used when no keyword group matches
pub const DEFAULT_TAG: &str = "meme";

/// One keyword group and the tag it assigns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRule {
    pub tag: String,
    /// Stored lowercased
    pub keywords: Vec<String>,
}

impl TagRule {
    pub fn new<S: AsRef<str>>(tag: impl Into<String>, keywords: &[S]) -> Self {
        Self {
            tag: tag.into(),
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn matches(&self, lower_name: &str) -> bool {
        self.keywords.iter().any(|k| lower_name.contains(k.as_str()))
    }
}

/// Ordered rule table plus fallback tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRules {
    rules: Vec<TagRule>,
    default_tag: String,
}

impl TagRules {
    /// Build a table; a blank default tag falls back to [`DEFAULT_TAG`]
    pub fn new(rules: Vec<TagRule>, default_tag: impl Into<String>) -> Self {
        let default_tag = default_tag.into();
        let default_tag = if default_tag.trim().is_empty() {
            DEFAULT_TAG.to_string()
        } else {
            default_tag.trim().to_string()
        };
        Self {
            rules: rules.into_iter().filter(|r| !r.tag.trim().is_empty()).collect(),
            default_tag,
        }
    }

    /// Built-in sound tagging table
    pub fn builtin() -> Self {
        Self::new(
            vec![
                TagRule::new("kill", &["kill", "death", "hit", "headshot", "slay"]),
                TagRule::new("ui", &["click", "hover", "menu", "notify", "button"]),
                TagRule::new("music", &["music", "song", "beat", "phonk", "remix"]),
            ],
            DEFAULT_TAG,
        )
    }

    /// Table from the `[classifier]` config section
    ///
    /// An empty rule list keeps the built-in groups; the default tag can be
    /// overridden independently.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        let rules = if config.rules.is_empty() {
            Self::builtin().rules
        } else {
            config
                .rules
                .iter()
                .map(|r| TagRule::new(r.tag.trim(), r.keywords.as_slice()))
                .collect()
        };
        let default_tag = config
            .default_tag
            .clone()
            .unwrap_or_else(|| DEFAULT_TAG.to_string());
        Self::new(rules, default_tag)
    }

    pub fn rules(&self) -> &[TagRule] {
        &self.rules
    }

    pub fn default_tag(&self) -> &str {
        &self.default_tag
    }
}

impl Default for TagRules {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Keyword classifier over a shared rule table
#[derive(Debug, Clone, Default)]
pub struct TagClassifier {
    rules: Arc<TagRules>,
}

impl TagClassifier {
    pub fn new(rules: TagRules) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    pub fn rules(&self) -> &TagRules {
        &self.rules
    }

    /// Tags for `name`; never empty
    pub fn classify(&self, name: &str) -> Vec<String> {
        let lower = name.to_lowercase();
        let mut tags: Vec<String> = Vec::new();

        for rule in &self.rules.rules {
            if rule.matches(&lower) && !tags.contains(&rule.tag) {
                tags.push(rule.tag.clone());
            }
        }

        if tags.is_empty() {
            tags.push(self.rules.default_tag.clone());
        }
        tags
    }
}
