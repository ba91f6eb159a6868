//! Dialog context: stack operations for one turn.

use super::stack::{DialogFrame, DialogStack, SequenceId};
use super::waterfall::{self, SequenceState, StepContext, WaterfallSequence};
use crate::conversation::message::OutboundMessage;
use crate::core::error::DomainError;
use crate::order::slot_state::SlotState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Registered sequences, by id.
#[derive(Clone, Default)]
pub struct DialogSet {
    sequences: HashMap<String, Arc<dyn WaterfallSequence>>,
}

impl DialogSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sequence(mut self, sequence: Arc<dyn WaterfallSequence>) -> Self {
        self.add(sequence);
        self
    }

    pub fn add(&mut self, sequence: Arc<dyn WaterfallSequence>) {
        self.sequences.insert(sequence.id().to_string(), sequence);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn WaterfallSequence>> {
        self.sequences.get(id)
    }
}

impl std::fmt::Debug for DialogSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&String> = self.sequences.keys().collect();
        ids.sort();
        f.debug_struct("DialogSet").field("sequences", &ids).finish()
    }
}

/// Outcome of feeding a turn into the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogTurnStatus {
    /// No active frame.
    Empty,
    /// The top frame consumed the reply and is waiting again.
    Waiting,
    /// The top sequence finished; the caller pops it.
    Completed,
    /// The top frame could not be resumed.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogTurnResult {
    pub status: DialogTurnStatus,
    pub state: SequenceState,
    /// Why the top frame could not be resumed, when an error was the reason.
    pub cause: Option<DomainError>,
}

impl DialogTurnResult {
    fn empty() -> Self {
        Self {
            status: DialogTurnStatus::Empty,
            state: SequenceState::NotStarted,
            cause: None,
        }
    }

    fn other(stack: &DialogStack, cause: Option<DomainError>) -> Self {
        Self {
            status: DialogTurnStatus::Other,
            state: SequenceState::of(stack.top()),
            cause,
        }
    }

    fn from_state(state: SequenceState) -> Self {
        let status = match state {
            SequenceState::Completed | SequenceState::Cancelled => DialogTurnStatus::Completed,
            SequenceState::WaitingForInput(_) => DialogTurnStatus::Waiting,
            SequenceState::NotStarted | SequenceState::Running(_) => DialogTurnStatus::Other,
        };
        Self {
            status,
            state,
            cause: None,
        }
    }
}

/// Binds the per-turn state handle (stack, order, outbox) to the registered sequences.
pub struct DialogContext<'a> {
    set: &'a DialogSet,
    stack: &'a mut DialogStack,
    order: &'a mut Option<SlotState>,
    outbox: &'a mut Vec<OutboundMessage>,
}

impl<'a> DialogContext<'a> {
    pub fn new(
        set: &'a DialogSet,
        stack: &'a mut DialogStack,
        order: &'a mut Option<SlotState>,
        outbox: &'a mut Vec<OutboundMessage>,
    ) -> Self {
        Self {
            set,
            stack,
            order,
            outbox,
        }
    }

    /// Push a new frame for `sequence_id` and run it until it waits or ends.
    pub fn begin(
        &mut self,
        sequence_id: &str,
        options: Option<SlotState>,
    ) -> Result<DialogTurnResult, DomainError> {
        let sequence = self
            .set
            .get(sequence_id)
            .cloned()
            .ok_or_else(|| DomainError::UnknownSequence(sequence_id.to_string()))?;

        self.stack.push(DialogFrame::new(SequenceId::new(sequence_id), options));
        self.run_top(sequence.as_ref(), None)
    }

    /// Hand `reply` to the top frame.
    pub fn continue_dialog(&mut self, reply: &str) -> DialogTurnResult {
        let Some(frame) = self.stack.top() else {
            return DialogTurnResult::empty();
        };
        if !frame.is_waiting() {
            return DialogTurnResult::other(self.stack, None);
        }
        self.resume_top(Some(reply))
    }

    /// Queue an outbound message for this turn.
    pub fn say(&mut self, message: OutboundMessage) {
        self.outbox.push(message);
    }

    /// Whether anything has been said this turn.
    pub fn has_responded(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Name of the step the top frame waits on.
    pub fn waiting_step(&self) -> Option<&str> {
        let frame = self.stack.waiting()?;
        let sequence = self.set.get(frame.sequence.as_str())?;
        Some(sequence.step_name(frame.step))
    }

    pub fn pop(&mut self) -> Option<DialogFrame> {
        self.stack.pop()
    }

    /// Drop every frame and the order. Returns whether any frame was active.
    pub fn cancel_all(&mut self) -> bool {
        let cancelled = self.stack.clear();
        *self.order = None;
        cancelled > 0
    }

    /// Ask the waiting frame's current question again without consuming input.
    ///
    /// The waiting step is re-run without a reply, so a slot filled since the
    /// question was asked moves the frame on to the next open question (or to
    /// completion) instead of repeating a stale one. `None` when no frame waits.
    pub fn reprompt(&mut self) -> Option<DialogTurnResult> {
        self.stack.waiting()?;
        Some(self.resume_top(None))
    }

    fn resume_top(&mut self, reply: Option<&str>) -> DialogTurnResult {
        let Some(frame) = self.stack.top() else {
            return DialogTurnResult::empty();
        };
        let Some(sequence) = self.set.get(frame.sequence.as_str()).cloned() else {
            let cause = DomainError::UnknownSequence(frame.sequence.to_string());
            return DialogTurnResult::other(self.stack, Some(cause));
        };

        match self.run_top(sequence.as_ref(), reply) {
            Ok(result) => result,
            Err(cause) => DialogTurnResult::other(self.stack, Some(cause)),
        }
    }

    fn run_top(
        &mut self,
        sequence: &dyn WaterfallSequence,
        reply: Option<&str>,
    ) -> Result<DialogTurnResult, DomainError> {
        let Some(frame) = self.stack.top_mut() else {
            return Ok(DialogTurnResult::empty());
        };
        let options = frame.options.clone();
        let mut ctx = StepContext::new(self.order, options.as_ref(), reply, self.outbox);
        let state = waterfall::run(sequence, frame, &mut ctx)?;
        Ok(DialogTurnResult::from_state(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::order_sequence::{
        COLLECT_ITEM_NAME, COLLECT_QUANTITY, ORDER_SEQUENCE_ID, OrderSequence,
    };
    use crate::dialog::stack::FrameStatus;

    fn dialogs() -> DialogSet {
        DialogSet::new().with_sequence(Arc::new(OrderSequence::default()))
    }

    struct Turn {
        stack: DialogStack,
        order: Option<SlotState>,
        outbox: Vec<OutboundMessage>,
    }

    impl Turn {
        fn new() -> Self {
            Self {
                stack: DialogStack::new(),
                order: None,
                outbox: Vec::new(),
            }
        }

        fn ctx<'a>(&'a mut self, set: &'a DialogSet) -> DialogContext<'a> {
            self.outbox.clear();
            DialogContext::new(set, &mut self.stack, &mut self.order, &mut self.outbox)
        }

        fn texts(&self) -> Vec<&str> {
            self.outbox.iter().filter_map(|m| m.as_text()).collect()
        }
    }

    #[test]
    fn continue_on_empty_stack_is_empty() {
        let set = dialogs();
        let mut turn = Turn::new();
        let result = turn.ctx(&set).continue_dialog("hello");
        assert_eq!(result.status, DialogTurnStatus::Empty);
        assert_eq!(result.state, SequenceState::NotStarted);
        assert!(turn.outbox.is_empty());
    }

    #[test]
    fn begin_then_continue_to_completion() {
        let set = dialogs();
        let mut turn = Turn::new();

        let result = turn.ctx(&set).begin(ORDER_SEQUENCE_ID, None).unwrap();
        assert_eq!(result.status, DialogTurnStatus::Waiting);
        assert_eq!(turn.texts(), vec!["What pizza do you take?"]);

        let result = turn.ctx(&set).continue_dialog("Margherita");
        assert_eq!(result.status, DialogTurnStatus::Waiting);

        let mut ctx = turn.ctx(&set);
        let result = ctx.continue_dialog("2");
        assert_eq!(result.status, DialogTurnStatus::Completed);
        assert!(ctx.pop().is_some());
        assert!(turn.stack.is_empty());
        assert_eq!(turn.texts(), vec!["Your order: Margherita 2"]);
    }

    #[test]
    fn begin_unknown_sequence_fails() {
        let set = dialogs();
        let mut turn = Turn::new();
        let err = turn.ctx(&set).begin("checkout", None).unwrap_err();
        assert_eq!(err, DomainError::UnknownSequence("checkout".to_string()));
        assert!(turn.stack.is_empty());
    }

    #[test]
    fn unknown_persisted_sequence_is_other() {
        let set = dialogs();
        let mut turn = Turn::new();
        turn.stack.push(DialogFrame {
            sequence: SequenceId::new("retired_flow"),
            step: 1,
            status: FrameStatus::Waiting,
            prompt: Some("?".to_string()),
            options: None,
        });

        let result = turn.ctx(&set).continue_dialog("hi");
        assert_eq!(result.status, DialogTurnStatus::Other);
        assert_eq!(
            result.cause,
            Some(DomainError::UnknownSequence("retired_flow".to_string()))
        );
    }

    #[test]
    fn step_error_is_reported_as_cause() {
        let set = dialogs();
        let mut turn = Turn::new();
        turn.stack.push(DialogFrame {
            sequence: SequenceId::new(ORDER_SEQUENCE_ID),
            step: 9,
            status: FrameStatus::Waiting,
            prompt: Some("?".to_string()),
            options: None,
        });

        let result = turn.ctx(&set).continue_dialog("hi");
        assert_eq!(result.status, DialogTurnStatus::Other);
        let cause = result.cause.unwrap();
        assert!(cause.is_stale_dialog());
        assert_eq!(
            cause,
            DomainError::StepOutOfRange {
                sequence: ORDER_SEQUENCE_ID.to_string(),
                index: 9
            }
        );
    }

    #[test]
    fn non_waiting_top_frame_is_other() {
        let set = dialogs();
        let mut turn = Turn::new();
        turn.stack.push(DialogFrame::new(SequenceId::new(ORDER_SEQUENCE_ID), None));

        let result = turn.ctx(&set).continue_dialog("hi");
        assert_eq!(result.status, DialogTurnStatus::Other);
        assert_eq!(result.state, SequenceState::Running(0));
        assert_eq!(result.cause, None);
    }

    #[test]
    fn cancel_all_clears_frames_and_order() {
        let set = dialogs();
        let mut turn = Turn::new();
        turn.ctx(&set).begin(ORDER_SEQUENCE_ID, None).unwrap();
        turn.ctx(&set).continue_dialog("Margherita");
        assert!(turn.order.is_some());

        assert!(turn.ctx(&set).cancel_all());
        assert!(turn.stack.is_empty());
        assert!(turn.order.is_none());

        assert!(!turn.ctx(&set).cancel_all());
    }

    #[test]
    fn reprompt_repeats_question_without_advancing() {
        let set = dialogs();
        let mut turn = Turn::new();
        turn.ctx(&set).begin(ORDER_SEQUENCE_ID, None).unwrap();

        let result = turn.ctx(&set).reprompt().unwrap();
        assert_eq!(result.status, DialogTurnStatus::Waiting);
        assert_eq!(turn.texts(), vec!["What pizza do you take?"]);
        assert_eq!(turn.stack.top().unwrap().step, COLLECT_ITEM_NAME);
        assert!(turn.stack.top().unwrap().is_waiting());
    }

    #[test]
    fn reprompt_asks_next_question_once_slot_is_filled() {
        let set = dialogs();
        let mut turn = Turn::new();
        turn.ctx(&set).begin(ORDER_SEQUENCE_ID, None).unwrap();
        if let Some(order) = turn.order.as_mut() {
            order.set_item_name("Margherita");
        }

        let result = turn.ctx(&set).reprompt().unwrap();
        assert_eq!(
            result.state,
            SequenceState::WaitingForInput(COLLECT_QUANTITY)
        );
        assert_eq!(turn.texts(), vec!["How many pieces?"]);
        assert_eq!(turn.ctx(&set).waiting_step(), Some("collect_quantity"));
    }

    #[test]
    fn reprompt_completes_when_every_slot_is_filled() {
        let set = dialogs();
        let mut turn = Turn::new();
        turn.ctx(&set).begin(ORDER_SEQUENCE_ID, None).unwrap();
        turn.order = Some(SlotState::with_values(Some("Funghi".to_string()), Some(3)));

        let result = turn.ctx(&set).reprompt().unwrap();
        assert_eq!(result.status, DialogTurnStatus::Completed);
        assert_eq!(turn.texts(), vec!["Your order: Funghi 3"]);
    }

    #[test]
    fn reprompt_without_waiting_frame_is_noop() {
        let set = dialogs();
        let mut turn = Turn::new();
        assert!(turn.ctx(&set).reprompt().is_none());
        assert!(turn.outbox.is_empty());
        assert_eq!(turn.ctx(&set).waiting_step(), None);
    }

    #[test]
    fn begin_with_complete_options_completes_immediately() {
        let set = dialogs();
        let mut turn = Turn::new();
        let options = SlotState::with_values(Some("Margherita".to_string()), Some(1));

        let result = turn.ctx(&set).begin(ORDER_SEQUENCE_ID, Some(options)).unwrap();
        assert_eq!(result.status, DialogTurnStatus::Completed);
        assert_eq!(turn.texts(), vec!["Your order: Margherita 1"]);
    }
}
