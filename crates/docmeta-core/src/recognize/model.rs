use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid model file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid pattern for label {label}: {source}")]
    Pattern {
        label: String,
        #[source]
        source: regex::Error,
    },
}

/// Entity buckets reported by recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    Person,
    Organization,
    Location,
}

impl EntityLabel {
    /// Map a model tag onto a bucket. Geo-political entities and plain
    /// locations share one bucket; unknown tags are dropped.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "PERSON" | "PER" => Some(Self::Person),
            "ORG" => Some(Self::Organization),
            "GPE" | "LOC" => Some(Self::Location),
            _ => None,
        }
    }
}

/// One recognized entity mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub label: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    #[must_use]
    pub fn new(label: impl Into<String>, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            start,
            end,
        }
    }
}

/// A loaded natural-language model able to tag entity mentions in text.
pub trait EntityModel: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, text: &str) -> Vec<EntitySpan>;
}

#[derive(Debug, Default, Deserialize)]
struct GazetteerFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    entities: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    patterns: BTreeMap<String, Vec<String>>,
}

/// Model backed by per-label phrase lists and regex rules, stored as JSON:
///
/// ```json
/// {
///   "name": "contacts-en",
///   "entities": { "ORG": ["Acme Corp"], "GPE": ["Mumbai"] },
///   "patterns": { "PERSON": ["\\b(?:Mr|Ms|Dr)\\. [A-Z][a-z]+"] }
/// }
/// ```
#[derive(Debug)]
pub struct GazetteerModel {
    name: String,
    rules: Vec<(String, Regex)>,
}

impl GazetteerModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        let mut model = Self::from_json(&raw)?;
        if model.name.is_empty() {
            model.name = path.display().to_string();
        }
        Ok(model)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let file: GazetteerFile = serde_json::from_str(raw)?;
        let mut rules = Vec::new();

        for (label, phrases) in &file.entities {
            if let Some(regex) = phrase_regex(phrases).map_err(|source| ModelError::Pattern {
                label: label.clone(),
                source,
            })? {
                rules.push((label.clone(), regex));
            }
        }

        for (label, patterns) in &file.patterns {
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|source| ModelError::Pattern {
                    label: label.clone(),
                    source,
                })?;
                rules.push((label.clone(), regex));
            }
        }

        Ok(Self {
            name: file.name.unwrap_or_default(),
            rules,
        })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl EntityModel for GazetteerModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, text: &str) -> Vec<EntitySpan> {
        let mut spans = Vec::new();
        for (label, regex) in &self.rules {
            for m in regex.find_iter(text) {
                spans.push(EntitySpan::new(label, m.as_str(), m.start(), m.end()));
            }
        }
        spans.sort_by_key(|s| s.start);
        spans
    }
}

/// Build one alternation over all phrases, longest first so that
/// "Acme Corp Ltd" wins over "Acme Corp".
fn phrase_regex(phrases: &[String]) -> Result<Option<Regex>, regex::Error> {
    let mut phrases: Vec<&str> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if phrases.is_empty() {
        return Ok(None);
    }
    phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    phrases.dedup();

    let alternatives: Vec<String> = phrases.iter().map(|p| bounded(p)).collect();
    Regex::new(&alternatives.join("|")).map(Some)
}

fn bounded(phrase: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut out = String::new();
    if phrase.starts_with(is_word) {
        out.push_str(r"\b");
    }
    out.push_str(&regex::escape(phrase));
    if phrase.ends_with(is_word) {
        out.push_str(r"\b");
    }
    out
}
