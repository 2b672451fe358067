use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::model::{EntityLabel, EntityModel, GazetteerModel, ModelError};
use crate::capability::Capabilities;
use crate::metadata::MetadataFields;

/// Deduplicated entity mentions, bucketed by label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMatches {
    pub names: BTreeSet<String>,
    pub organizations: BTreeSet<String>,
    pub locations: BTreeSet<String>,
}

impl EntityMatches {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.organizations.is_empty() && self.locations.is_empty()
    }

    fn insert(&mut self, label: EntityLabel, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let bucket = match label {
            EntityLabel::Person => &mut self.names,
            EntityLabel::Organization => &mut self.organizations,
            EntityLabel::Location => &mut self.locations,
        };
        bucket.insert(text.to_string());
    }
}

impl MetadataFields for EntityMatches {
    fn into_fields(self) -> Vec<(&'static str, BTreeSet<String>)> {
        vec![
            ("names", self.names),
            ("organizations", self.organizations),
            ("locations", self.locations),
        ]
    }
}

pub type ModelLoader = Box<dyn Fn() -> Result<Arc<dyn EntityModel>, ModelError> + Send + Sync>;

enum ModelSlot {
    Loaded(Arc<dyn EntityModel>),
    Failed(String),
}

/// Model-based person/organization/location recognition.
///
/// The model is loaded on first use, at most once, even when several
/// threads ask for it concurrently. A failed load is remembered and later
/// calls return empty matches without retrying.
pub struct EntityRecognizer {
    loader: Option<ModelLoader>,
    slot: OnceCell<ModelSlot>,
}

static PROCESS_WIDE: OnceCell<Arc<EntityRecognizer>> = OnceCell::new();

impl EntityRecognizer {
    /// A recognizer with no model installed; always returns empty matches.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            loader: None,
            slot: OnceCell::new(),
        }
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn EntityModel>, ModelError> + Send + Sync + 'static,
    {
        Self {
            loader: Some(Box::new(loader)),
            slot: OnceCell::new(),
        }
    }

    pub fn from_capabilities(caps: &Capabilities) -> Self {
        let Some(path) = caps.ner_model().map(std::path::Path::to_path_buf) else {
            return Self::unavailable();
        };

        Self::with_loader(move || {
            let model = GazetteerModel::load(&path)?;
            Ok(Arc::new(model) as Arc<dyn EntityModel>)
        })
    }

    /// The recognizer shared by every pipeline in this process.
    ///
    /// Built from the capabilities passed by the first caller; later
    /// callers receive the same instance.
    pub fn process_wide(caps: &Capabilities) -> Arc<Self> {
        Arc::clone(PROCESS_WIDE.get_or_init(|| Arc::new(Self::from_capabilities(caps))))
    }

    pub const fn is_installed(&self) -> bool {
        self.loader.is_some()
    }

    /// Reason the model failed to load, once a load has been attempted.
    pub fn load_failure(&self) -> Option<&str> {
        match self.slot.get() {
            Some(ModelSlot::Failed(reason)) => Some(reason),
            _ => None,
        }
    }

    fn model(&self) -> Option<&Arc<dyn EntityModel>> {
        let loader = self.loader.as_ref()?;

        let slot = self.slot.get_or_init(|| match loader() {
            Ok(model) => {
                tracing::info!("Loaded entity model '{}'", model.name());
                ModelSlot::Loaded(model)
            }
            Err(e) => {
                tracing::warn!("Entity model unavailable: {}", e);
                ModelSlot::Failed(e.to_string())
            }
        });

        match slot {
            ModelSlot::Loaded(model) => Some(model),
            ModelSlot::Failed(_) => None,
        }
    }

    pub fn recognize(&self, text: &str) -> EntityMatches {
        let mut matches = EntityMatches::default();
        if text.trim().is_empty() {
            return matches;
        }

        let Some(model) = self.model() else {
            return matches;
        };

        for span in model.predict(text) {
            if let Some(label) = EntityLabel::from_tag(&span.label) {
                matches.insert(label, &span.text);
            }
        }

        matches
    }
}

impl Default for EntityRecognizer {
    fn default() -> Self {
        Self::unavailable()
    }
}
