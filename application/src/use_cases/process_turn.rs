//! Process Turn use case.
//!
//! Routes one inbound [`Activity`] through classification, entity merge,
//! interruptions and the dialog stack, then persists the conversation state
//! and delivers the replies.
//!
//! A message turn always runs to the same tail: whatever happened during
//! routing, the order slots and the dialog stack are written back exactly
//! once each, and every reply queued so far is sent.

use crate::config::BotConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::intent_classifier::{ClassifierError, IntentClassifier};
use crate::ports::message_sender::{MessageSender, SendError};
use crate::ports::state_store::{StateStore, StoreError};
use crate::use_cases::conversation_gate::ConversationGate;
use orderbot_domain::util::preview;
use orderbot_domain::{
    Activity, ConversationRef, DialogContext, DialogSet, DialogStack, DialogTurnResult,
    DialogTurnStatus,
    DomainError, Intent, ORDER_SEQUENCE_ID, OrderSequence, OutboundMessage, RichCard,
    SequenceState, SlotMerge, SlotState, merge_candidates,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can end a turn.
///
/// Except for [`TurnError::Store`] raised while loading, the state has been
/// persisted and the queued replies delivered before any of these is returned.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Turn cancelled while classifying")]
    Cancelled,

    #[error("Dialog could not be resumed (state: {state:?})")]
    UnknownDialogStatus {
        state: SequenceState,
        #[source]
        cause: Option<DomainError>,
    },

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

/// What a turn did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnReport {
    /// Resolved intent; `None` for non-message activities.
    pub intent: Option<Intent>,
    /// Messages sent, in order.
    pub responses: Vec<OutboundMessage>,
    /// Outcome of the dialog stack; `None` when an interruption handled the turn.
    pub dialog_status: Option<DialogTurnStatus>,
    /// Where the top sequence stands after the turn.
    pub sequence_state: SequenceState,
}

impl TurnReport {
    /// Text of every text response, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.responses.iter().filter_map(|m| m.as_text()).collect()
    }
}

/// Conversation state loaded at the start of a turn and written at its end.
#[derive(Debug, Default)]
struct TurnState {
    stack: DialogStack,
    order: Option<SlotState>,
}

struct Routed {
    intent: Intent,
    status: Option<DialogTurnStatus>,
    state: SequenceState,
}

/// Use case for processing one turn of a conversation.
#[derive(Clone)]
pub struct ProcessTurnUseCase {
    classifier: Arc<dyn IntentClassifier>,
    store: Arc<dyn StateStore>,
    sender: Arc<dyn MessageSender>,
    config: Arc<BotConfig>,
    dialogs: DialogSet,
    gate: Arc<ConversationGate>,
    welcome_card: Option<RichCard>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ProcessTurnUseCase {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        store: Arc<dyn StateStore>,
        sender: Arc<dyn MessageSender>,
        config: BotConfig,
    ) -> Self {
        let dialogs =
            DialogSet::new().with_sequence(Arc::new(OrderSequence::new(config.prompts.clone())));
        Self {
            classifier,
            store,
            sender,
            config: Arc::new(config),
            dialogs,
            gate: Arc::new(ConversationGate::new()),
            welcome_card: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Card sent to members joining a conversation.
    pub fn with_welcome_card(mut self, card: RichCard) -> Self {
        self.welcome_card = Some(card);
        self
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Process one inbound activity.
    ///
    /// `cancel` aborts the classification call; the turn then answers with
    /// the fallback text, persists, and returns [`TurnError::Cancelled`].
    pub async fn execute(
        &self,
        activity: Activity,
        cancel: &CancellationToken,
    ) -> Result<TurnReport, TurnError> {
        match activity {
            Activity::Message { conversation, text } => {
                self.process_message(&conversation, &text, cancel).await
            }
            Activity::ConversationUpdate {
                conversation_id,
                recipient_id,
                members_added,
            } => {
                self.welcome(&conversation_id, &recipient_id, &members_added)
                    .await
            }
            Activity::Other { kind } => {
                debug!("Ignoring activity of kind {}", kind);
                Ok(TurnReport::default())
            }
        }
    }

    async fn process_message(
        &self,
        conversation: &ConversationRef,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnReport, TurnError> {
        let _guard = self.gate.acquire(&conversation.conversation_id).await;

        info!("Turn from {}: {}", conversation, preview(text, 100));
        self.log_event(
            "turn_received",
            conversation,
            json!({ "user_id": conversation.user_id, "text": text }),
        );

        let mut state = self.load_state(conversation).await?;
        let mut outbox = Vec::new();

        let routed = self
            .route(conversation, text, &mut state, &mut outbox, cancel)
            .await;
        let persisted = self.persist(conversation, &state).await;
        let sent = self.deliver(conversation, &outbox).await;

        let routed = match routed {
            Ok(routed) => routed,
            Err(e) => {
                let cause = std::error::Error::source(&e).map(|source| source.to_string());
                warn!("Turn for {} failed: {} (cause: {:?})", conversation, e, cause);
                self.log_event(
                    "turn_error",
                    conversation,
                    json!({ "error": e.to_string(), "cause": cause }),
                );
                if let Err(store_err) = persisted {
                    warn!("Persisting after failed turn also failed: {}", store_err);
                }
                if let Err(send_err) = sent {
                    warn!("Delivering replies after failed turn also failed: {}", send_err);
                }
                return Err(e);
            }
        };
        persisted?;
        sent?;

        Ok(TurnReport {
            intent: Some(routed.intent),
            responses: outbox,
            dialog_status: routed.status,
            sequence_state: routed.state,
        })
    }

    async fn route(
        &self,
        conversation: &ConversationRef,
        text: &str,
        state: &mut TurnState,
        outbox: &mut Vec<OutboundMessage>,
        cancel: &CancellationToken,
    ) -> Result<Routed, TurnError> {
        let classified = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TurnError::Cancelled),
            result = self.classifier.classify(text) => result.map_err(TurnError::from),
        };
        let result = match classified {
            Ok(result) => result,
            Err(e) => {
                outbox.push(OutboundMessage::text(
                    self.config.messages.classifier_unavailable.as_str(),
                ));
                return Err(e);
            }
        };

        let intent = self.config.intents.resolve(&result.intent);
        debug!(
            "Classified by {} as {} (label {:?}, score {:?})",
            self.classifier.name(),
            intent,
            result.intent,
            result.score
        );
        self.log_event(
            "classified",
            conversation,
            json!({
                "label": result.intent,
                "intent": intent.as_str(),
                "score": result.score,
                "entities": result.entities.keys().collect::<Vec<_>>(),
            }),
        );

        let candidates = self.config.entities.extract(&result);
        let merge = merge_candidates(&mut state.order, &candidates);
        for (slot, outcome) in [
            ("item_name", &merge.item_name),
            ("item_quantity", &merge.item_quantity),
        ] {
            match outcome {
                SlotMerge::Stored => debug!("Stored {} from entity", slot),
                SlotMerge::Rejected(correction) => {
                    debug!("Ignored {} entity: {}", slot, correction)
                }
                SlotMerge::Absent | SlotMerge::AlreadySet => {}
            }
        }

        let messages = &self.config.messages;
        let mut dc = DialogContext::new(&self.dialogs, &mut state.stack, &mut state.order, outbox);

        match intent {
            Intent::Cancel => {
                let (reply, sequence_state) = if dc.cancel_all() {
                    info!("Cancelled active dialog for {}", conversation);
                    (&messages.cancelled, SequenceState::Cancelled)
                } else {
                    (&messages.nothing_to_cancel, SequenceState::NotStarted)
                };
                dc.say(OutboundMessage::text(reply.as_str()));
                return Ok(Routed {
                    intent,
                    status: None,
                    state: sequence_state,
                });
            }
            Intent::Help => {
                dc.say(OutboundMessage::text(messages.help.as_str()));
                let sequence_state = match dc.reprompt() {
                    Some(result) => self.settle(conversation, &mut dc, result)?,
                    None => SequenceState::NotStarted,
                };
                return Ok(Routed {
                    intent,
                    status: None,
                    state: sequence_state,
                });
            }
            Intent::Ordering | Intent::None => {}
        }

        let mut result = dc.continue_dialog(text);
        if result.status == DialogTurnStatus::Empty && !dc.has_responded() {
            if intent == Intent::Ordering {
                info!("Starting order for {}", conversation);
                result = dc.begin(ORDER_SEQUENCE_ID, None)?;
            } else {
                dc.say(OutboundMessage::text(messages.not_understood.as_str()));
            }
        }

        let status = result.status;
        let sequence_state = self.settle(conversation, &mut dc, result)?;
        Ok(Routed {
            intent,
            status: Some(status),
            state: sequence_state,
        })
    }

    /// Apply a dialog outcome to the stack: pop a completed frame, reset an
    /// unresumable one.
    fn settle(
        &self,
        conversation: &ConversationRef,
        dc: &mut DialogContext<'_>,
        result: DialogTurnResult,
    ) -> Result<SequenceState, TurnError> {
        match result.status {
            DialogTurnStatus::Completed => {
                if let Some(frame) = dc.pop() {
                    info!("Sequence {} completed for {}", frame.sequence, conversation);
                }
            }
            DialogTurnStatus::Other => {
                match &result.cause {
                    Some(cause) if cause.is_stale_dialog() => warn!(
                        "Dialog for {} no longer matches the registered sequences ({}), resetting",
                        conversation, cause
                    ),
                    Some(cause) => warn!("Dialog for {} failed ({}), resetting", conversation, cause),
                    None => warn!(
                        "Dialog for {} could not be resumed ({:?}), resetting",
                        conversation, result.state
                    ),
                }
                dc.cancel_all();
                dc.say(OutboundMessage::text(
                    self.config.messages.dialog_reset.as_str(),
                ));
                return Err(TurnError::UnknownDialogStatus {
                    state: result.state,
                    cause: result.cause,
                });
            }
            DialogTurnStatus::Waiting => {
                if let Some(step) = dc.waiting_step() {
                    debug!("Dialog for {} waiting on {}", conversation, step);
                }
            }
            DialogTurnStatus::Empty => {}
        }
        Ok(result.state)
    }

    async fn load_state(&self, conversation: &ConversationRef) -> Result<TurnState, StoreError> {
        let stack = self.store.load_dialog(&conversation.conversation_id).await?;
        let order = self.store.load_order(conversation).await?;
        Ok(TurnState { stack, order })
    }

    /// Write both scopes; the second write is attempted even if the first failed.
    async fn persist(
        &self,
        conversation: &ConversationRef,
        state: &TurnState,
    ) -> Result<(), StoreError> {
        let order = self
            .store
            .save_order(conversation, state.order.as_ref())
            .await;
        let dialog = self
            .store
            .save_dialog(&conversation.conversation_id, &state.stack)
            .await;
        order.and(dialog)
    }

    async fn deliver(
        &self,
        conversation: &ConversationRef,
        outbox: &[OutboundMessage],
    ) -> Result<(), SendError> {
        for message in outbox {
            self.sender.send(conversation, message).await?;
            self.log_event("bot_message", conversation, json!({ "message": message }));
        }
        Ok(())
    }

    async fn welcome(
        &self,
        conversation_id: &str,
        recipient_id: &str,
        members_added: &[String],
    ) -> Result<TurnReport, TurnError> {
        let Some(card) = &self.welcome_card else {
            debug!("No welcome card configured");
            return Ok(TurnReport::default());
        };

        let mut responses = Vec::new();
        for member in members_added.iter().filter(|m| m.as_str() != recipient_id) {
            let conversation = ConversationRef::new(conversation_id, member.as_str());
            let message = OutboundMessage::Card(card.clone());
            self.sender.send(&conversation, &message).await?;
            info!("Welcomed {}", conversation);
            self.log_event("welcome_sent", &conversation, json!({ "user_id": member }));
            responses.push(message);
        }

        Ok(TurnReport {
            intent: None,
            responses,
            ..TurnReport::default()
        })
    }

    fn log_event(
        &self,
        event_type: &'static str,
        conversation: &ConversationRef,
        payload: serde_json::Value,
    ) {
        self.conversation_logger.log(ConversationEvent::new(
            event_type,
            conversation.conversation_id.as_str(),
            payload,
        ));
    }
}
