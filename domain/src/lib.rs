//! Domain layer for orderbot
//!
//! This crate contains the slot-filling core: order state, validators,
//! intents, the waterfall engine and the dialog stack. It performs no I/O;
//! everything here is driven by the application layer one turn at a time.
//!
//! # Core Concepts
//!
//! ## Slots
//!
//! An order collects two slots, item name and quantity ([`SlotState`]).
//! Each slot is validated before it is stored and never overwritten.
//!
//! ## Waterfall
//!
//! A [`WaterfallSequence`] is a fixed list of steps. A step either advances
//! or asks a question; asking suspends the sequence on that step until the
//! next turn. The resume point lives in a [`DialogFrame`] on the
//! conversation's [`DialogStack`].
//!
//! ## Interruptions
//!
//! [`Intent::Cancel`] and [`Intent::Help`] pre-empt the active sequence
//! through [`DialogContext::cancel_all`] and [`DialogContext::reprompt`].

pub mod conversation;
pub mod core;
pub mod dialog;
pub mod intent;
pub mod order;
pub mod util;

// Re-export commonly used types
pub use conversation::{
    activity::{Activity, ConversationRef},
    message::{CardAction, OutboundMessage, RichCard},
};
pub use core::error::DomainError;
pub use dialog::{
    context::{DialogContext, DialogSet, DialogTurnResult, DialogTurnStatus},
    order_sequence::{ORDER_SEQUENCE_ID, OrderPrompts, OrderSequence},
    stack::{DialogFrame, DialogStack, FrameStatus, SequenceId},
    waterfall::{SequenceState, StepAction, StepContext, WaterfallSequence},
};
pub use intent::{
    Intent, IntentLabels,
    aliases::{EntityAliases, SlotCandidates},
    classification::{ClassifierResult, EntityValue},
};
pub use order::{
    merge::{MergeOutcome, SlotMerge, merge_candidates},
    slot_state::SlotState,
    validation::{Correction, validate_item_name, validate_quantity},
};
