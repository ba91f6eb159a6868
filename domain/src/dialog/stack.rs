//! Dialog stack: the persisted resume point of every active sequence.

use crate::order::slot_state::SlotState;
use serde::{Deserialize, Serialize};

/// Identifies a registered waterfall sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(pub String);

impl SequenceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SequenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// Executing steps, or suspended underneath a child frame.
    Running,
    /// Suspended on `step`, waiting for the user's answer.
    Waiting,
}

/// Activation record of one in-progress sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogFrame {
    pub sequence: SequenceId,
    pub step: usize,
    pub status: FrameStatus,
    /// Last question asked; replayed by reprompt.
    #[serde(default)]
    pub prompt: Option<String>,
    /// Values the sequence was started with.
    #[serde(default)]
    pub options: Option<SlotState>,
}

impl DialogFrame {
    pub fn new(sequence: SequenceId, options: Option<SlotState>) -> Self {
        Self {
            sequence,
            step: 0,
            status: FrameStatus::Running,
            prompt: None,
            options,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == FrameStatus::Waiting
    }
}

/// Per-conversation LIFO of active frames.
///
/// Only the top frame can be [`FrameStatus::Waiting`]: pushing a child
/// demotes a waiting parent to `Running`, and popping the child restores the
/// parent's wait if it had asked a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogStack {
    frames: Vec<DialogFrame>,
}

impl DialogStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[DialogFrame] {
        &self.frames
    }

    pub fn top(&self) -> Option<&DialogFrame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut DialogFrame> {
        self.frames.last_mut()
    }

    /// The frame awaiting the user's answer, if any.
    pub fn waiting(&self) -> Option<&DialogFrame> {
        self.top().filter(|f| f.is_waiting())
    }

    pub fn push(&mut self, frame: DialogFrame) {
        if let Some(parent) = self.frames.last_mut() {
            parent.status = FrameStatus::Running;
        }
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<DialogFrame> {
        let popped = self.frames.pop();
        if let Some(parent) = self.frames.last_mut()
            && parent.prompt.is_some()
        {
            parent.status = FrameStatus::Waiting;
        }
        popped
    }

    /// Remove every frame. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.frames.len();
        self.frames.clear();
        count
    }
}
