//! Welcome card templates.
//!
//! The card is a JSON document deserialized into [`RichCard`]. A built-in
//! template is compiled into the binary; `[welcome] card` replaces it.

use orderbot_domain::RichCard;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const DEFAULT_WELCOME_CARD: &str = include_str!("../../resources/welcome_card.json");

#[derive(Error, Debug)]
pub enum CardError {
    #[error("Could not read card template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid card template: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a card template.
pub fn parse_card(json: &str) -> Result<RichCard, CardError> {
    Ok(serde_json::from_str(json)?)
}

/// The built-in welcome card.
pub fn default_welcome_card() -> Result<RichCard, CardError> {
    parse_card(DEFAULT_WELCOME_CARD)
}

/// Load the card at `path`, or the built-in one when `path` is `None`.
pub fn load_welcome_card(path: Option<&Path>) -> Result<RichCard, CardError> {
    let Some(path) = path else {
        return default_welcome_card();
    };
    debug!("Loading welcome card from {}", path.display());
    let json = std::fs::read_to_string(path).map_err(|source| CardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_card(&json)
}
