//! Slot validators.
//!
//! Each validator is a pure function `raw -> Result<value, Correction>`.
//! A rejection is not an error: the [`Correction`] is shown to the user and
//! the same question is asked again.

use serde_json::Value;
use std::fmt;
use std::ops::RangeInclusive;

/// Minimum length (in characters) of an item name after trimming.
pub const MIN_ITEM_NAME_LEN: usize = 3;

/// Accepted quantities, inclusive on both ends.
pub const QUANTITY_RANGE: RangeInclusive<i64> = 1..=4;

/// Why a candidate slot value was rejected.
///
/// `Display` yields the user-facing correction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    ItemNameTooShort { min: usize },
    QuantityOutOfRange { min: i64, max: i64 },
}

impl Correction {
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::ItemNameTooShort { min } => {
                write!(f, "The item name must be at least {} characters long.", min)
            }
            Correction::QuantityOutOfRange { min, max } => {
                write!(f, "The quantity must be between {} and {}.", min, max)
            }
        }
    }
}

fn quantity_correction() -> Correction {
    Correction::QuantityOutOfRange {
        min: *QUANTITY_RANGE.start(),
        max: *QUANTITY_RANGE.end(),
    }
}

/// Validate an item name: trimmed, at least [`MIN_ITEM_NAME_LEN`] characters.
pub fn validate_item_name(raw: &str) -> Result<String, Correction> {
    let name = raw.trim();
    if name.chars().count() < MIN_ITEM_NAME_LEN {
        return Err(Correction::ItemNameTooShort {
            min: MIN_ITEM_NAME_LEN,
        });
    }
    Ok(name.to_string())
}

/// Check an already-parsed quantity against [`QUANTITY_RANGE`].
pub fn check_quantity(quantity: i64) -> Result<i64, Correction> {
    if QUANTITY_RANGE.contains(&quantity) {
        Ok(quantity)
    } else {
        Err(quantity_correction())
    }
}

/// Validate a quantity typed by the user.
///
/// Anything that is not a plain integer gets the same correction as an
/// out-of-range number.
pub fn validate_quantity(raw: &str) -> Result<i64, Correction> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| quantity_correction())
        .and_then(check_quantity)
}

/// Validate a quantity extracted as an entity value.
///
/// Classifiers return numbers either as JSON numbers or as strings; whole
/// floats such as `2.0` are accepted.
pub fn validate_quantity_value(value: &Value) -> Result<i64, Correction> {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => check_quantity(i),
            (None, Some(f)) if f.fract() == 0.0 => check_quantity(f as i64),
            _ => Err(quantity_correction()),
        },
        Value::String(s) => validate_quantity(s),
        _ => Err(quantity_correction()),
    }
}
