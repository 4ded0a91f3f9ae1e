//! FAQ chatbot with an optional generative-AI upgrade.
//!
//! The assistant is a capability-checked strategy: the rule-based keyword
//! table always exists, and a Gemini client is layered on top only when a
//! credential is configured. Selection happens at construction; fallback
//! ALSO happens at call time, so a remote failure degrades to the
//! rule-based reply instead of surfacing an error to the user.

pub mod gemini;
pub mod rules;

use std::sync::Mutex;

use sokocamp_core::Language;

use crate::config::MarketplaceConfig;

pub use gemini::{GeminiClient, GeminiError};
pub use rules::{RuleBook, RuleReply};

/// The marketplace assistant. Replies never fail.
pub struct ChatAssistant {
    rules: Mutex<RuleBook>,
    gemini: Option<GeminiClient>,
}

impl ChatAssistant {
    /// Build the assistant from configuration, selecting the remote
    /// strategy only when a Gemini credential is present.
    #[must_use]
    pub fn from_config(config: &MarketplaceConfig) -> Self {
        let gemini = config.gemini.clone().map(GeminiClient::new);
        if gemini.is_some() {
            tracing::info!("chat assistant using Gemini with rule-based fallback");
        } else {
            tracing::info!("no Gemini credential configured, chat assistant is rule-based");
        }

        Self {
            rules: Mutex::new(RuleBook::default()),
            gemini,
        }
    }

    /// Build a rule-based-only assistant.
    #[must_use]
    pub fn rule_based() -> Self {
        Self {
            rules: Mutex::new(RuleBook::default()),
            gemini: None,
        }
    }

    /// Whether the generative strategy is configured.
    #[must_use]
    pub const fn is_ai_enabled(&self) -> bool {
        self.gemini.is_some()
    }

    /// Answer a user question.
    ///
    /// Tries the remote strategy when configured; any remote failure is
    /// logged and the rule-based table answers instead.
    pub async fn reply(&self, prompt: &str, context: &str, language: Language) -> String {
        if let Some(gemini) = &self.gemini {
            match gemini.generate_reply(prompt, context, language).await {
                Ok(text) => return text,
                Err(e) => {
                    tracing::warn!("Gemini reply failed, falling back to rules: {e}");
                }
            }
        }

        self.rule_reply(prompt).text().to_owned()
    }

    /// Answer from the rule table only.
    #[must_use]
    pub fn rule_reply(&self, prompt: &str) -> RuleReply {
        match self.rules.lock() {
            Ok(rules) => rules.reply(prompt),
            Err(poisoned) => poisoned.into_inner().reply(prompt),
        }
    }

    /// Teach the rule table a new answer.
    pub fn learn(&self, question: &str, answer: &str) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.learn(question, answer);
        }
    }
}
