//! The pizza order waterfall: Initialize → CollectItemName → CollectQuantity → Summarize.

use super::waterfall::{StepAction, StepContext, WaterfallSequence};
use crate::order::slot_state::SlotState;
use crate::order::validation::{validate_item_name, validate_quantity};
use serde::{Deserialize, Serialize};

/// Sequence id under which [`OrderSequence`] is registered.
pub const ORDER_SEQUENCE_ID: &str = "order";

pub const INITIALIZE: usize = 0;
pub const COLLECT_ITEM_NAME: usize = 1;
pub const COLLECT_QUANTITY: usize = 2;
pub const SUMMARIZE: usize = 3;

const STEP_NAMES: [&str; 4] = [
    "initialize",
    "collect_item_name",
    "collect_quantity",
    "summarize",
];

/// Questions and confirmation text used by the order sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderPrompts {
    pub item_name: String,
    pub item_quantity: String,
    /// `{name}` and `{quantity}` are substituted.
    pub summary: String,
}

impl Default for OrderPrompts {
    fn default() -> Self {
        Self {
            item_name: "What pizza do you take?".to_string(),
            item_quantity: "How many pieces?".to_string(),
            summary: "Your order: {name} {quantity}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderSequence {
    prompts: OrderPrompts,
}

impl OrderSequence {
    pub fn new(prompts: OrderPrompts) -> Self {
        Self { prompts }
    }

    fn initialize(&self, ctx: &mut StepContext<'_>) -> StepAction {
        if ctx.order.is_none() {
            *ctx.order = Some(ctx.options.cloned().unwrap_or_default());
        }
        StepAction::Next
    }

    fn collect_item_name(&self, ctx: &mut StepContext<'_>) -> StepAction {
        let reply = ctx.take_reply();
        let order = ctx.order.get_or_insert_with(SlotState::default);

        if order.is_complete() {
            return StepAction::SkipTo(SUMMARIZE);
        }
        if order.has_item_name() {
            return StepAction::Next;
        }

        let Some(reply) = reply else {
            return StepAction::Prompt(self.prompts.item_name.clone());
        };
        match validate_item_name(reply) {
            Ok(name) => {
                order.set_item_name(name);
                StepAction::Next
            }
            Err(correction) => {
                ctx.say(correction.message());
                StepAction::Prompt(self.prompts.item_name.clone())
            }
        }
    }

    fn collect_quantity(&self, ctx: &mut StepContext<'_>) -> StepAction {
        let reply = ctx.take_reply();
        let order = ctx.order.get_or_insert_with(SlotState::default);

        if order.has_item_quantity() {
            return StepAction::Next;
        }

        let Some(reply) = reply else {
            return StepAction::Prompt(self.prompts.item_quantity.clone());
        };
        match validate_quantity(reply) {
            Ok(quantity) => {
                order.set_item_quantity(quantity);
                StepAction::Next
            }
            Err(correction) => {
                ctx.say(correction.message());
                StepAction::Prompt(self.prompts.item_quantity.clone())
            }
        }
    }

    fn summarize(&self, ctx: &mut StepContext<'_>) -> StepAction {
        let summary = ctx
            .order
            .take()
            .and_then(|order| order.summary(&self.prompts.summary));
        if let Some(summary) = summary {
            ctx.say(summary);
        }
        StepAction::End
    }
}

impl WaterfallSequence for OrderSequence {
    fn id(&self) -> &str {
        ORDER_SEQUENCE_ID
    }

    fn step_count(&self) -> usize {
        STEP_NAMES.len()
    }

    fn step_name(&self, index: usize) -> &str {
        STEP_NAMES.get(index).copied().unwrap_or("unknown")
    }

    fn run_step(&self, index: usize, ctx: &mut StepContext<'_>) -> StepAction {
        match index {
            INITIALIZE => self.initialize(ctx),
            COLLECT_ITEM_NAME => self.collect_item_name(ctx),
            COLLECT_QUANTITY => self.collect_quantity(ctx),
            _ => self.summarize(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::message::OutboundMessage;
    use crate::dialog::stack::{DialogFrame, SequenceId};
    use crate::dialog::waterfall::{SequenceState, run};

    struct Harness {
        sequence: OrderSequence,
        frame: DialogFrame,
        order: Option<SlotState>,
    }

    impl Harness {
        fn new(order: Option<SlotState>, options: Option<SlotState>) -> Self {
            Self {
                sequence: OrderSequence::default(),
                frame: DialogFrame::new(SequenceId::new(ORDER_SEQUENCE_ID), options),
                order,
            }
        }

        fn turn(&mut self, reply: Option<&str>) -> (SequenceState, Vec<String>) {
            let mut outbox = Vec::new();
            let options = self.frame.options.clone();
            let mut ctx = StepContext::new(&mut self.order, options.as_ref(), reply, &mut outbox);
            let state = run(&self.sequence, &mut self.frame, &mut ctx).unwrap();
            let texts = outbox
                .into_iter()
                .filter_map(|m| match m {
                    OutboundMessage::Text(t) => Some(t),
                    OutboundMessage::Card(_) => None,
                })
                .collect();
            (state, texts)
        }
    }

    #[test]
    fn full_order_flow() {
        let mut h = Harness::new(None, None);

        let (state, out) = h.turn(None);
        assert_eq!(state, SequenceState::WaitingForInput(COLLECT_ITEM_NAME));
        assert_eq!(out, vec!["What pizza do you take?"]);
        assert_eq!(h.order, Some(SlotState::default()));

        let (state, out) = h.turn(Some("Margherita"));
        assert_eq!(state, SequenceState::WaitingForInput(COLLECT_QUANTITY));
        assert_eq!(out, vec!["How many pieces?"]);

        let (state, out) = h.turn(Some("2"));
        assert_eq!(state, SequenceState::Completed);
        assert_eq!(out, vec!["Your order: Margherita 2"]);
        assert!(h.order.is_none());
    }

    #[test]
    fn short_name_is_rejected_and_step_does_not_advance() {
        let mut h = Harness::new(None, None);
        h.turn(None);

        let (state, out) = h.turn(Some("AB"));
        assert_eq!(state, SequenceState::WaitingForInput(COLLECT_ITEM_NAME));
        assert_eq!(
            out,
            vec![
                "The item name must be at least 3 characters long.",
                "What pizza do you take?"
            ]
        );
        assert_eq!(h.frame.step, COLLECT_ITEM_NAME);

        let (state, _) = h.turn(Some("Margherita"));
        assert_eq!(state, SequenceState::WaitingForInput(COLLECT_QUANTITY));
    }

    #[test]
    fn quantity_bounds_are_enforced() {
        let mut h = Harness::new(None, None);
        h.turn(None);
        h.turn(Some("Funghi"));

        for bad in ["0", "5", "many"] {
            let (state, out) = h.turn(Some(bad));
            assert_eq!(state, SequenceState::WaitingForInput(COLLECT_QUANTITY));
            assert_eq!(
                out,
                vec!["The quantity must be between 1 and 4.", "How many pieces?"]
            );
        }

        let (state, out) = h.turn(Some("4"));
        assert_eq!(state, SequenceState::Completed);
        assert_eq!(out, vec!["Your order: Funghi 4"]);
    }

    #[test]
    fn prefilled_state_goes_straight_to_summary() {
        let filled = SlotState::with_values(Some("Hawaii".to_string()), Some(1));
        let mut h = Harness::new(Some(filled), None);

        let (state, out) = h.turn(None);
        assert_eq!(state, SequenceState::Completed);
        assert_eq!(out, vec!["Your order: Hawaii 1"]);
    }

    #[test]
    fn reentering_collect_item_name_with_complete_state_never_prompts() {
        let filled = SlotState::with_values(Some("Hawaii".to_string()), Some(3));
        let mut h = Harness::new(Some(filled), None);
        h.frame.step = COLLECT_ITEM_NAME;

        let (state, out) = h.turn(None);
        assert_eq!(state, SequenceState::Completed);
        assert_eq!(out, vec!["Your order: Hawaii 3"]);
    }

    #[test]
    fn initial_options_seed_absent_state() {
        let options = SlotState::with_values(Some("Pepperoni".to_string()), Some(2));
        let mut h = Harness::new(None, Some(options));

        let (state, out) = h.turn(None);
        assert_eq!(state, SequenceState::Completed);
        assert_eq!(out, vec!["Your order: Pepperoni 2"]);
    }

    #[test]
    fn initial_options_do_not_replace_existing_state() {
        let existing = SlotState::with_values(Some("Funghi".to_string()), None);
        let options = SlotState::with_values(Some("Pepperoni".to_string()), Some(2));
        let mut h = Harness::new(Some(existing), Some(options));

        let (state, out) = h.turn(None);
        assert_eq!(state, SequenceState::WaitingForInput(COLLECT_QUANTITY));
        assert_eq!(out, vec!["How many pieces?"]);
    }

    #[test]
    fn name_filled_while_waiting_is_not_overwritten_by_reply() {
        let mut h = Harness::new(None, None);
        h.turn(None);
        // An entity merge filled the name before the dialog continued.
        if let Some(order) = h.order.as_mut() {
            order.set_item_name("Margherita");
        }

        let (state, out) = h.turn(Some("a margherita please"));
        assert_eq!(state, SequenceState::WaitingForInput(COLLECT_QUANTITY));
        assert_eq!(out, vec!["How many pieces?"]);
        assert_eq!(h.order.as_ref().unwrap().item_name(), Some("Margherita"));
    }

    #[test]
    fn step_names() {
        let seq = OrderSequence::default();
        assert_eq!(seq.step_count(), 4);
        assert_eq!(seq.step_name(COLLECT_QUANTITY), "collect_quantity");
        assert_eq!(seq.step_name(9), "unknown");
    }
}
