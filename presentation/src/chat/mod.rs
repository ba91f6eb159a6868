//! Interactive chat module
//!
//! Provides a line-editor based chat interface for talking to the bot.

mod repl;

pub use repl::{ChatRepl, ReplCommand};
