//! Classifier output as seen by the core.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One value extracted for an entity, with the provider's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityValue {
    pub value: Value,
    pub confidence: f64,
}

impl EntityValue {
    pub fn new(value: impl Into<Value>, confidence: f64) -> Self {
        Self {
            value: value.into(),
            confidence,
        }
    }

    /// Text form of the value.
    ///
    /// Strings come back as-is, numbers are formatted, and list entities
    /// (arrays) yield their first element.
    pub fn as_text(&self) -> Option<String> {
        value_text(&self.value)
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.first().and_then(value_text),
        _ => None,
    }
}

/// Raw result of classifying one utterance.
///
/// `intent` is the provider's label; entity names are provider specific too.
/// Values under one entity name keep the order the provider returned them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResult {
    pub intent: String,
    pub score: Option<f64>,
    pub entities: HashMap<String, Vec<EntityValue>>,
}

impl ClassifierResult {
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            score: None,
            entities: HashMap::new(),
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Append a value under `name`.
    pub fn with_entity(mut self, name: impl Into<String>, value: EntityValue) -> Self {
        self.push_entity(name, value);
        self
    }

    pub fn push_entity(&mut self, name: impl Into<String>, value: EntityValue) {
        self.entities.entry(name.into()).or_default().push(value);
    }

    pub fn entity(&self, name: &str) -> Option<&[EntityValue]> {
        self.entities
            .get(name)
            .map(Vec::as_slice)
            .filter(|values| !values.is_empty())
    }

    pub fn has_entities(&self) -> bool {
        self.entities.values().any(|v| !v.is_empty())
    }
}
