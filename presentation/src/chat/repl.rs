//! REPL (Read-Eval-Print Loop) for chatting with the bot

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use orderbot_application::{ProcessTurnUseCase, StateStore, TurnError, TurnReport};
use orderbot_domain::{Activity, ConversationRef};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const HISTORY_CAPACITY: usize = 500;

/// Slash commands understood by the REPL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Join a fresh conversation (triggers the welcome card)
    New,
    /// Show the stored order and dialog stack
    State,
    Help,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`. Returns `None` for ordinary input.
    pub fn parse(line: &str) -> Option<Self> {
        let command = line.trim().strip_prefix('/')?;
        Some(match command.split_whitespace().next().unwrap_or("") {
            "new" | "n" => ReplCommand::New,
            "state" | "s" => ReplCommand::State,
            "help" | "h" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        })
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: ProcessTurnUseCase,
    store: Arc<dyn StateStore>,
    bot_id: String,
    user_id: String,
    base_conversation: String,
    conversation_id: String,
    sessions: u32,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(
        use_case: ProcessTurnUseCase,
        store: Arc<dyn StateStore>,
        bot_id: impl Into<String>,
        user_id: impl Into<String>,
        conversation_id: impl Into<String>,
    ) -> Self {
        let conversation_id = conversation_id.into();
        Self {
            use_case,
            store,
            bot_id: bot_id.into(),
            user_id: user_id.into(),
            base_conversation: conversation_id.clone(),
            conversation_id,
            sessions: 1,
        }
    }

    fn conversation(&self) -> ConversationRef {
        ConversationRef::new(self.conversation_id.as_str(), self.user_id.as_str())
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut line_editor = Reedline::create();

        let history_path = dirs::data_dir().map(|p| p.join("orderbot").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
                Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
                Err(e) => warn!("History disabled: {}", e),
            }
        }

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(self.user_id.clone()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();
        self.join().await;

        loop {
            match line_editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command).await {
                            break;
                        }
                        continue;
                    }

                    self.say(line).await;
                }
                Ok(Signal::CtrlC) => {
                    println!("^C");
                    continue;
                }
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Ok(_) => continue,
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│            orderbot - Chat Mode             │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Speaking as {} in {}", self.user_id.cyan(), self.conversation_id.cyan());
        println!();
        Self::print_commands();
    }

    fn print_commands() {
        println!("Commands:");
        println!("  {}    - Join a fresh conversation", "/new".cyan());
        println!("  {}  - Show the stored order and dialog", "/state".cyan());
        println!("  {}   - Show this help", "/help".cyan());
        println!("  {}   - Exit chat", "/quit".cyan());
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => Self::print_commands(),
            ReplCommand::New => {
                self.sessions += 1;
                self.conversation_id = format!("{}-{}", self.base_conversation, self.sessions);
                println!("{} {}", "Joined".green(), self.conversation_id.cyan());
                self.join().await;
            }
            ReplCommand::State => self.print_state().await,
            ReplCommand::Unknown(name) => {
                println!("{} /{} (try /help)", "Unknown command:".yellow(), name);
            }
        }
        false
    }

    async fn join(&self) {
        let activity = Activity::ConversationUpdate {
            conversation_id: self.conversation_id.clone(),
            recipient_id: self.bot_id.clone(),
            members_added: vec![self.bot_id.clone(), self.user_id.clone()],
        };
        if let Err(e) = self.run_turn(activity).await {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
    }

    async fn say(&self, text: &str) {
        match self.run_turn(Activity::message(self.conversation(), text)).await {
            Ok(report) => debug!(
                "Turn done: intent {:?}, status {:?}, sequence {:?}",
                report.intent, report.dialog_status, report.sequence_state
            ),
            Err(TurnError::Cancelled) => println!("{}", "(cancelled)".dimmed()),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }

    /// Run one activity; Ctrl-C while it runs cancels the classifier call.
    async fn run_turn(&self, activity: Activity) -> Result<TurnReport, TurnError> {
        let cancel = CancellationToken::new();
        let turn = self.use_case.execute(activity, &cancel);
        tokio::pin!(turn);

        loop {
            tokio::select! {
                result = &mut turn => return result,
                _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => cancel.cancel(),
            }
        }
    }

    async fn print_state(&self) {
        let conversation = self.conversation();
        let order = self.store.load_order(&conversation).await;
        let stack = self.store.load_dialog(&conversation.conversation_id).await;
        match (order, stack) {
            (Ok(order), Ok(stack)) => {
                print!("{}", ConsoleFormatter::format_state(order.as_ref(), &stack));
            }
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("{} {}", "Could not read state:".red().bold(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("/new"), Some(ReplCommand::New));
        assert_eq!(ReplCommand::parse("  /state "), Some(ReplCommand::State));
        assert_eq!(ReplCommand::parse("/q"), Some(ReplCommand::Quit));
        assert_eq!(
            ReplCommand::parse("/pizza now"),
            Some(ReplCommand::Unknown("pizza".to_string()))
        );
        assert_eq!(ReplCommand::parse("two margheritas"), None);
    }
}
