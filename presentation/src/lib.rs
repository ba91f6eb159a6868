//! Presentation layer for orderbot
//!
//! This crate contains CLI definitions, console output, and the interactive
//! chat interface.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::Cli;
pub use output::console::{ConsoleFormatter, ConsoleSender};
