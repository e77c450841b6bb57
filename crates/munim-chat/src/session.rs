//! Conversation session: history, intent routing, and the model path.

use tracing::{info, warn};

use munim_core::types::{Language, Message, Role};
use munim_intent::{detect_intent, intent_context};
use munim_llm::{LlmEngine, LocalModelLoader};
use munim_scan::{OcrService, ParchiScanner};

use crate::router::{DialogueRouter, PendingAction, Reply};

/// Spoken fallback when the model path is completely unavailable.
const MODEL_FALLBACK: &str =
    "Maaf kijiye, abhi main is baare mein jawab nahi de paa raha. Stock, order, udhar ya profit ke baare mein poochiye.";

/// Outcome of one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Assistant reply, ready to speak (control tokens still attached).
    pub text: String,
    /// Follow-up the shell must perform, if any.
    pub action: Option<PendingAction>,
}

pub struct ConversationManager<L: LocalModelLoader> {
    history: Vec<Message>,
    is_thinking: bool,
    language: Language,
    engine: LlmEngine<L>,
    router: DialogueRouter,
}

impl<L: LocalModelLoader> ConversationManager<L> {
    pub fn new(engine: LlmEngine<L>, router: DialogueRouter, language: Language) -> Self {
        let greeting = Message::new(Role::Assistant, language.greeting());
        Self {
            history: vec![greeting],
            is_thinking: false,
            language,
            engine,
            router,
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn is_thinking(&self) -> bool {
        self.is_thinking
    }

    /// Process one committed user utterance.
    ///
    /// Returns `None` while a previous turn is still being processed.
    /// Known intents answer from the store; everything else goes to the
    /// model with the detected-intent context appended, with a static
    /// reply when the model path is unavailable.
    pub async fn send_message(&mut self, text: &str) -> Option<TurnOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if self.is_thinking {
            warn!("Turn dropped, previous turn still in flight");
            return None;
        }
        self.is_thinking = true;

        self.history.push(Message::new(Role::User, text));
        let result = detect_intent(text);
        info!(intent = %result.intent, confidence = result.confidence, "Intent detected");

        let routed = self.router.handle(&result).await;
        let outcome = if routed.deferred {
            let reply = self.complete_with_model(&result).await;
            TurnOutcome {
                text: reply,
                action: None,
            }
        } else {
            TurnOutcome {
                text: routed.text,
                action: routed.action,
            }
        };

        self.history
            .push(Message::new(Role::Assistant, &outcome.text));
        self.is_thinking = false;
        Some(outcome)
    }

    async fn complete_with_model(&self, result: &munim_core::types::IntentResult) -> String {
        let context = intent_context(result);
        let mut prompt_history = self.history.clone();
        if !context.is_empty() {
            if let Some(last) = prompt_history.last_mut() {
                last.content.push_str(&context);
            }
        }

        match self.engine.complete(&prompt_history).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Model path unavailable, using static fallback");
                MODEL_FALLBACK.to_string()
            }
        }
    }

    /// Run the scan pipeline and record the outcome as a follow-up
    /// assistant message.
    pub async fn process_scan<O: OcrService>(
        &mut self,
        scanner: &ParchiScanner<O>,
        image_data_url: &str,
    ) -> String {
        let text = match scanner.scan(image_data_url).await {
            Ok(data) if data.items.is_empty() && data.total_amount.is_none() => {
                info!("Scan succeeded but recognized no bill content");
                "Parchi mein koi items nahi mile. Bill ko poora frame mein rakh kar dobara photo lijiye."
                    .to_string()
            }
            Ok(data) => {
                let total = data
                    .total_amount
                    .map(|t| format!(" Kul ₹{:.0} ka hisab hai.", t))
                    .unwrap_or_default();
                format!(
                    "Parchi padh li. {} items mile.{}",
                    data.items.len(),
                    total
                )
            }
            Err(e) => {
                warn!(error = %e, "Parchi scan failed");
                "Maaf kijiye, parchi saaf nahi dikh rahi. Thodi roshni mein dobara photo lijiye."
                    .to_string()
            }
        };

        self.history.push(Message::new(Role::Assistant, &text));
        text
    }

    /// Reset the conversation to a fresh greeting in the active language.
    pub fn clear_messages(&mut self) {
        self.history = vec![Message::new(Role::Assistant, self.language.greeting())];
        self.is_thinking = false;
    }

    /// Drop the settled model backend and probe again.
    pub fn retry_load_model(&mut self) -> munim_core::Result<()> {
        self.engine.retry()
    }
}

// =============================================================================
// Tests
// =============================================================================
