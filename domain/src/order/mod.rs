//! Order domain: the slots a pizza order collects and how they are validated.
//!
//! - [`slot_state::SlotState`] — what has been collected so far
//! - [`validation`] — pure validators producing user-facing corrections
//! - [`merge`] — folding classifier entities into the order

pub mod merge;
pub mod slot_state;
pub mod validation;
