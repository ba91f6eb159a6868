//! Waterfall engine.
//!
//! A sequence is an ordered list of steps. The engine runs steps from the
//! frame's resume point until one of them asks a question (the frame then
//! waits on that step) or the sequence ends. Nothing is suspended in memory:
//! the frame's `(sequence, step)` is the whole continuation, so a resumed
//! turn can run in a different process than the one that asked.

use super::stack::{DialogFrame, FrameStatus};
use crate::conversation::message::OutboundMessage;
use crate::core::error::DomainError;
use crate::order::slot_state::SlotState;
use serde::{Deserialize, Serialize};

/// What a step wants the engine to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Advance to the following step.
    Next,
    /// Jump to the given step index.
    SkipTo(usize),
    /// Ask the user and wait on this step.
    Prompt(String),
    /// Finish the sequence.
    End,
}

/// Lifecycle of one sequence run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "step")]
pub enum SequenceState {
    #[default]
    NotStarted,
    Running(usize),
    WaitingForInput(usize),
    Completed,
    Cancelled,
}

impl SequenceState {
    pub fn of(frame: Option<&DialogFrame>) -> Self {
        match frame {
            None => SequenceState::NotStarted,
            Some(f) if f.is_waiting() => SequenceState::WaitingForInput(f.step),
            Some(f) => SequenceState::Running(f.step),
        }
    }
}

/// Everything a step may read or touch during one run.
pub struct StepContext<'a> {
    pub order: &'a mut Option<SlotState>,
    pub options: Option<&'a SlotState>,
    reply: Option<&'a str>,
    outbox: &'a mut Vec<OutboundMessage>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        order: &'a mut Option<SlotState>,
        options: Option<&'a SlotState>,
        reply: Option<&'a str>,
        outbox: &'a mut Vec<OutboundMessage>,
    ) -> Self {
        Self {
            order,
            options,
            reply,
            outbox,
        }
    }

    /// The user's answer to the question this step asked, if it is being resumed.
    pub fn take_reply(&mut self) -> Option<&'a str> {
        self.reply.take()
    }

    pub fn say(&mut self, text: impl Into<String>) {
        self.outbox.push(OutboundMessage::text(text));
    }
}

/// A fixed, ordered list of steps.
pub trait WaterfallSequence: Send + Sync {
    fn id(&self) -> &str;

    fn step_count(&self) -> usize;

    /// Human-readable step name, reported while a frame waits on it.
    fn step_name(&self, index: usize) -> &str;

    fn run_step(&self, index: usize, ctx: &mut StepContext<'_>) -> StepAction;
}

/// Run `sequence` from `frame.step` until it waits or ends.
///
/// A reply in `ctx` is only offered to the first step run, i.e. the step the
/// frame was waiting on; it is discarded once that step returns.
pub fn run(
    sequence: &dyn WaterfallSequence,
    frame: &mut DialogFrame,
    ctx: &mut StepContext<'_>,
) -> Result<SequenceState, DomainError> {
    let count = sequence.step_count();
    // Every step may be visited at most twice (once directly, once via a skip).
    let max_transitions = count * 2 + 1;
    let mut transitions = 0;

    frame.status = FrameStatus::Running;
    frame.prompt = None;

    loop {
        if frame.step >= count {
            return Err(DomainError::StepOutOfRange {
                sequence: sequence.id().to_string(),
                index: frame.step,
            });
        }
        transitions += 1;
        if transitions > max_transitions {
            return Err(DomainError::RunawaySequence(sequence.id().to_string()));
        }

        let action = sequence.run_step(frame.step, ctx);
        ctx.reply = None;

        match action {
            StepAction::Next => {
                frame.step += 1;
                if frame.step == count {
                    return Ok(SequenceState::Completed);
                }
            }
            StepAction::SkipTo(index) => {
                if index >= count {
                    return Err(DomainError::StepOutOfRange {
                        sequence: sequence.id().to_string(),
                        index,
                    });
                }
                frame.step = index;
            }
            StepAction::Prompt(question) => {
                ctx.say(question.clone());
                frame.status = FrameStatus::Waiting;
                frame.prompt = Some(question);
                return Ok(SequenceState::WaitingForInput(frame.step));
            }
            StepAction::End => return Ok(SequenceState::Completed),
        }
    }
}
