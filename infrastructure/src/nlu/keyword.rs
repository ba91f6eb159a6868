//! Offline keyword classifier.
//!
//! Matches a few regular expressions per intent and recognizes menu items
//! and small quantities in the utterance. Emits the same labels and entity
//! names as the default LUIS model (`Ordering`, `Cancel`, `Help`, `None`;
//! `pizza`, `number`), so the default label and alias tables apply unchanged.

use async_trait::async_trait;
use orderbot_application::ports::intent_classifier::{ClassifierError, IntentClassifier};
use orderbot_domain::{ClassifierResult, EntityValue};
use regex::{Regex, RegexBuilder};

/// Intent patterns in priority order.
const INTENT_PATTERNS: [(&str, &str); 3] = [
    ("Cancel", r"\b(cancel|stop|abort|quit|never\s*mind|forget it)\b"),
    ("Help", r"\b(help|what can you do|how does this work)\b|^\s*\?+\s*$"),
    ("Ordering", r"\b(order|pizzas?|hungry|i(?:'d| would)? like|i want)\b"),
];

const NUMBER_WORDS: [(&str, i64); 10] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
];

pub const NAME_ENTITY: &str = "pizza";
pub const NUMBER_ENTITY: &str = "number";

pub struct KeywordClassifier {
    intents: Vec<(&'static str, Regex)>,
    menu: Vec<(String, Regex)>,
    number: Regex,
}

impl KeywordClassifier {
    pub fn new(menu: &[String]) -> Result<Self, regex::Error> {
        let intents = INTENT_PATTERNS
            .iter()
            .map(|(label, pattern)| Ok((*label, insensitive(pattern)?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let menu = menu
            .iter()
            .filter(|item| !item.trim().is_empty())
            .map(|item| {
                let pattern = format!(r"\b{}s?\b", regex::escape(item.trim()));
                Ok((item.trim().to_string(), insensitive(&pattern)?))
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let words: Vec<&str> = NUMBER_WORDS.iter().map(|(word, _)| *word).collect();
        let number = insensitive(&format!(r"\b(\d+|{})\b", words.join("|")))?;

        Ok(Self {
            intents,
            menu,
            number,
        })
    }

    /// Classify without I/O.
    pub fn classify_text(&self, utterance: &str) -> ClassifierResult {
        let label = self
            .intents
            .iter()
            .find(|(_, pattern)| pattern.is_match(utterance))
            .map(|(label, _)| *label)
            .unwrap_or("None");
        let mut result = ClassifierResult::new(label);

        for (item, pattern) in &self.menu {
            if pattern.is_match(utterance) {
                result.push_entity(NAME_ENTITY, EntityValue::new(item.as_str(), 1.0));
            }
        }

        for capture in self.number.captures_iter(utterance) {
            let token = &capture[1];
            let value = token.parse::<i64>().ok().or_else(|| {
                NUMBER_WORDS
                    .iter()
                    .find(|(word, _)| word.eq_ignore_ascii_case(token))
                    .map(|(_, n)| *n)
            });
            if let Some(value) = value {
                result.push_entity(NUMBER_ENTITY, EntityValue::new(value, 1.0));
            }
        }

        result
    }
}

fn insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify(&self, utterance: &str) -> Result<ClassifierResult, ClassifierError> {
        Ok(self.classify_text(utterance))
    }
}
