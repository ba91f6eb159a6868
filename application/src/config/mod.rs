//! Application-level configuration.
//!
//! - [`BotConfig`] — messages, order prompts, intent labels and entity aliases
//!   used by [`ProcessTurnUseCase`](crate::use_cases::process_turn::ProcessTurnUseCase)

pub mod bot_config;

pub use bot_config::{BotConfig, BotMessages};
