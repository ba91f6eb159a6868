//! Intent domain: what the classifier tells us about an utterance.
//!
//! - [`Intent`] — closed set of intents the dispatcher routes on
//! - [`IntentLabels`] — provider label → [`Intent`] table
//! - [`classification::ClassifierResult`] — raw classifier output
//! - [`aliases::EntityAliases`] — per-slot entity name priority lists

pub mod aliases;
pub mod classification;

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Intents the turn dispatcher knows how to route.
///
/// Every provider label resolves to exactly one of these; labels nobody
/// registered fall into [`Intent::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Start (or continue) a pizza order.
    Ordering,
    /// Global interruption: abandon whatever is in progress.
    Cancel,
    /// Global interruption: explain, then re-ask the pending question.
    Help,
    #[default]
    None,
}

impl Intent {
    pub fn as_str(&self) -> &str {
        match self {
            Intent::Ordering => "ordering",
            Intent::Cancel => "cancel",
            Intent::Help => "help",
            Intent::None => "none",
        }
    }

    /// Cancel and Help pre-empt the active dialog.
    pub fn is_interruption(&self) -> bool {
        matches!(self, Intent::Cancel | Intent::Help)
    }
}

impl std::str::FromStr for Intent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ordering" | "order" => Ok(Intent::Ordering),
            "cancel" => Ok(Intent::Cancel),
            "help" => Ok(Intent::Help),
            "none" => Ok(Intent::None),
            _ => Err(DomainError::InvalidIntent(s.to_string())),
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps provider-specific intent labels onto [`Intent`].
///
/// Matching is case-insensitive. A label listed under several intents
/// resolves to the first in the order ordering, cancel, help.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentLabels {
    pub ordering: Vec<String>,
    pub cancel: Vec<String>,
    pub help: Vec<String>,
}

impl Default for IntentLabels {
    fn default() -> Self {
        Self {
            ordering: vec!["Ordering".to_string(), "OrderPizza".to_string()],
            cancel: vec!["Cancel".to_string()],
            help: vec!["Help".to_string()],
        }
    }
}

impl IntentLabels {
    pub fn resolve(&self, label: &str) -> Intent {
        let label = label.trim();
        let matches = |labels: &[String]| labels.iter().any(|l| l.eq_ignore_ascii_case(label));

        if matches(&self.ordering) {
            Intent::Ordering
        } else if matches(&self.cancel) {
            Intent::Cancel
        } else if matches(&self.help) {
            Intent::Help
        } else {
            Intent::None
        }
    }
}
