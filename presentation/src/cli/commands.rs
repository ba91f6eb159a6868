//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for orderbot
#[derive(Parser, Debug)]
#[command(name = "orderbot")]
#[command(author, version, about = "Pizza ordering bot - slot filling over a dialog stack")]
#[command(long_about = r#"
orderbot takes pizza orders in a conversation. It asks for the pizza and the
number of pieces, validates each answer, and confirms the order.

Say "cancel" at any time to drop the current order, or "help" for a hint.

Configuration files are loaded from (in priority order):
1. ORDERBOT_* environment variables (ORDERBOT_NLU__API_KEY, ...)
2. --config <path>     Explicit config file
3. ./orderbot.toml     Project-level config
4. ~/.config/orderbot/config.toml   Global config

Example:
  orderbot --chat
  orderbot --conversation kitchen "two margheritas please"
  ORDERBOT_NLU__PROVIDER=luis orderbot --chat
"#)]
pub struct Cli {
    /// A single utterance to process (not required in chat mode)
    pub utterance: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Conversation id to use for the utterance or the first chat session
    #[arg(long, value_name = "ID", default_value = "console")]
    pub conversation: String,

    /// User id to speak as
    #[arg(short, long, value_name = "ID", default_value = "user")]
    pub user: String,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write operational logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Write the conversation transcript (JSONL) to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,
}
