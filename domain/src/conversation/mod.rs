//! Conversation I/O shapes.
//!
//! - [`activity::Activity`] — an inbound turn event
//! - [`activity::ConversationRef`] — conversation + user addressing
//! - [`message::OutboundMessage`] — text or [`message::RichCard`] replies

pub mod activity;
pub mod message;
