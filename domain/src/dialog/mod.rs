//! Dialog domain: the waterfall engine and the per-conversation dialog stack.
//!
//! - [`waterfall`] — step-by-step sequence runner ([`waterfall::WaterfallSequence`])
//! - [`order_sequence::OrderSequence`] — the pizza order waterfall
//! - [`stack::DialogStack`] — persisted LIFO of [`stack::DialogFrame`]s
//! - [`context::DialogContext`] — begin / continue / cancel / reprompt for one turn
//!
//! # Turn flow
//!
//! ```text
//! reply ──► DialogContext::continue_dialog ──► top frame (Waiting on step k)
//!                                               │
//!                                               ▼
//!                                   waterfall::run from step k
//!                                   ├─ Prompt  → frame waits again   (Waiting)
//!                                   └─ End     → caller pops frame   (Completed)
//! ```

pub mod context;
pub mod order_sequence;
pub mod stack;
pub mod waterfall;
