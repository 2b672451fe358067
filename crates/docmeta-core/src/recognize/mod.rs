mod entities;
mod model;
mod patterns;

pub use entities::{EntityMatches, EntityRecognizer, ModelLoader};
pub use model::{EntityLabel, EntityModel, EntitySpan, GazetteerModel, ModelError};
pub use patterns::{normalize_date, normalize_phone, PatternMatches, PatternRecognizer};
