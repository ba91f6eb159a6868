//! Console output: bot replies, rich cards and state dumps

use async_trait::async_trait;
use colored::Colorize;
use orderbot_application::ports::message_sender::{MessageSender, SendError};
use orderbot_domain::{ConversationRef, DialogStack, OutboundMessage, RichCard, SlotState};
use std::io::Write;

const CARD_WIDTH: usize = 60;

/// Formats bot output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format one outbound message
    pub fn format_message(message: &OutboundMessage) -> String {
        match message {
            OutboundMessage::Text(text) => format!("{} {}", "bot>".green().bold(), text),
            OutboundMessage::Card(card) => Self::format_card(card),
        }
    }

    /// Format a rich card as a framed block
    pub fn format_card(card: &RichCard) -> String {
        let rule = "─".repeat(CARD_WIDTH);
        let mut output = String::new();

        output.push_str(&format!("┌{}\n", rule).dimmed().to_string());
        output.push_str(&format!("│ {}\n", card.title.bold()));
        if !card.subtitle.is_empty() {
            output.push_str(&format!("│ {}\n", card.subtitle.italic()));
        }
        if !card.text.is_empty() {
            for line in wrap(&card.text, CARD_WIDTH - 2) {
                output.push_str(&format!("│ {}\n", line));
            }
        }
        if let Some(image) = &card.image_url {
            output.push_str(&format!("│ {} {}\n", "image:".dimmed(), image));
        }
        output.push_str(&format!(
            "│ [{}] {}\n",
            card.button.title.cyan().bold(),
            card.button.url.underline()
        ));
        output.push_str(&format!("└{}", rule).dimmed().to_string());

        output
    }

    /// Format the stored state of a conversation (for `/state`)
    pub fn format_state(order: Option<&SlotState>, stack: &DialogStack) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", "Order:".cyan().bold()));
        match order {
            Some(order) => {
                output.push_str(&format!(
                    "  item_name:     {}\n",
                    order.item_name().unwrap_or("-")
                ));
                output.push_str(&format!(
                    "  item_quantity: {}\n",
                    order
                        .item_quantity()
                        .map(|q| q.to_string())
                        .unwrap_or_else(|| "-".to_string())
                ));
            }
            None => output.push_str("  (none)\n"),
        }

        output.push_str(&format!("{}\n", "Dialog stack:".cyan().bold()));
        if stack.is_empty() {
            output.push_str("  (empty)\n");
        }
        for (depth, frame) in stack.frames().iter().enumerate().rev() {
            let status = if frame.is_waiting() {
                "waiting".yellow()
            } else {
                "running".normal()
            };
            output.push_str(&format!(
                "  #{} {} step {} [{}]",
                depth, frame.sequence, frame.step, status
            ));
            if let Some(prompt) = &frame.prompt {
                output.push_str(&format!(" {}", format!("\"{}\"", prompt).dimmed()));
            }
            output.push('\n');
        }

        output
    }
}

/// Greedy word wrap
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// [`MessageSender`] that prints to stdout
#[derive(Debug, Default)]
pub struct ConsoleSender {
    /// Prefix each message with the recipient's user id
    show_recipient: bool,
}

impl ConsoleSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipient(mut self, show: bool) -> Self {
        self.show_recipient = show;
        self
    }
}

#[async_trait]
impl MessageSender for ConsoleSender {
    async fn send(
        &self,
        conversation: &ConversationRef,
        message: &OutboundMessage,
    ) -> Result<(), SendError> {
        let mut stdout = std::io::stdout().lock();
        if self.show_recipient {
            writeln!(stdout, "{}", format!("→ {}", conversation.user_id).dimmed())
                .map_err(|e| SendError::DeliveryFailed(e.to_string()))?;
        }
        writeln!(stdout, "{}", ConsoleFormatter::format_message(message))
            .map_err(|e| SendError::DeliveryFailed(e.to_string()))
    }
}
