//! Opportunistic entity merge.
//!
//! Entities recognized in any utterance are folded into the order before the
//! dialog runs, so "two margheritas" said out of sequence still counts. The
//! values go through the same validators as typed answers and never replace
//! a slot that is already filled.

use super::slot_state::SlotState;
use super::validation::{
    Correction, MIN_ITEM_NAME_LEN, validate_item_name, validate_quantity_value,
};
use crate::intent::aliases::SlotCandidates;

/// What happened to one slot candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotMerge {
    /// No candidate for this slot.
    Absent,
    Stored,
    /// The slot already had a value; the candidate was dropped.
    AlreadySet,
    /// The candidate failed validation; the correction is not shown to the user.
    Rejected(Correction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub item_name: SlotMerge,
    pub item_quantity: SlotMerge,
}

impl MergeOutcome {
    pub fn stored_any(&self) -> bool {
        self.item_name == SlotMerge::Stored || self.item_quantity == SlotMerge::Stored
    }
}

/// Merge candidates into the order, creating it on first use.
///
/// The state is only created when at least one candidate is actually stored.
pub fn merge_candidates(
    order: &mut Option<SlotState>,
    candidates: &SlotCandidates,
) -> MergeOutcome {
    let mut scratch = order.clone().unwrap_or_default();

    let item_name = match &candidates.item_name {
        None => SlotMerge::Absent,
        Some(_) if scratch.has_item_name() => SlotMerge::AlreadySet,
        Some(value) => match value.as_text().as_deref().map(validate_item_name) {
            Some(Ok(name)) => {
                scratch.set_item_name(name);
                SlotMerge::Stored
            }
            Some(Err(correction)) => SlotMerge::Rejected(correction),
            None => SlotMerge::Rejected(Correction::ItemNameTooShort {
                min: MIN_ITEM_NAME_LEN,
            }),
        },
    };

    let item_quantity = match &candidates.item_quantity {
        None => SlotMerge::Absent,
        Some(_) if scratch.has_item_quantity() => SlotMerge::AlreadySet,
        Some(value) => match validate_quantity_value(&value.value) {
            Ok(quantity) => {
                scratch.set_item_quantity(quantity);
                SlotMerge::Stored
            }
            Err(correction) => SlotMerge::Rejected(correction),
        },
    };

    let outcome = MergeOutcome {
        item_name,
        item_quantity,
    };
    if outcome.stored_any() {
        *order = Some(scratch);
    }
    outcome
}
