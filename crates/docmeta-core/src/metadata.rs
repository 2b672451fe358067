use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// A recognizer result that can be flattened into metadata categories.
pub trait MetadataFields {
    /// Every category this result owns, including empty ones.
    fn into_fields(self) -> Vec<(&'static str, BTreeSet<String>)>;
}

/// Extracted values keyed by category name (`emails`, `names`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionMetadata {
    fields: BTreeMap<String, BTreeSet<String>>,
}

impl ExtractionMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge every category of `source` into this record.
    ///
    /// On a key collision the incoming value replaces the existing one, so
    /// the last merged recognizer wins.
    pub fn merge(&mut self, source: impl MetadataFields) {
        for (key, values) in source.into_fields() {
            if self.fields.insert(key.to_string(), values).is_some() {
                tracing::debug!("Metadata category '{}' overwritten by later recognizer", key);
            }
        }
    }

    #[must_use]
    pub fn merged(mut self, source: impl MetadataFields) -> Self {
        self.merge(source);
        self
    }

    pub fn get(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.fields.get(category)
    }

    pub fn contains(&self, category: &str, value: &str) -> bool {
        self.get(category).is_some_and(|v| v.contains(value))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn value_count(&self) -> usize {
        self.fields.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.value_count() == 0
    }

    /// Serialized form handed to storage.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub unit_count: u32,
    /// Wall-clock seconds for the whole call, two fraction digits
    pub elapsed_seconds: String,
}

impl ExtractionStats {
    #[must_use]
    pub fn from_elapsed(unit_count: u32, elapsed: Duration) -> Self {
        Self {
            unit_count,
            elapsed_seconds: format!("{:.2}", elapsed.as_secs_f64()),
        }
    }
}
