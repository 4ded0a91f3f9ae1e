//! Rule-based FAQ replies.
//!
//! A keyword table answers the common vendor and customer questions.
//! Lookup is exact match on the normalized prompt first, then first
//! keyword contained in the prompt, then the default reply. The table is
//! extensible at runtime so an admin can teach the bot new answers.

/// Default keyword table, seeded with the questions vendors actually ask.
const DEFAULT_RULES: &[(&str, &str)] = &[
    (
        "add product",
        "Click the 'Add Product' button at the top right, fill in the details, and submit the form.",
    ),
    (
        "update order",
        "Go to the Orders tab, find the order, and use the status buttons to update it.",
    ),
    (
        "messages",
        "All your messages are in the Inbox tab. Unread messages have a blue indicator.",
    ),
    (
        "earnings",
        "Your monthly revenue is shown in the analytics tab and dashboard cards.",
    ),
    (
        "stuck order",
        "Contact support at 0775 769 177 if an order hasn't progressed in 48 hours.",
    ),
    (
        "delivery",
        "Orders are delivered within the university campus, usually the same day.",
    ),
    (
        "payment",
        "Payment is arranged directly with the vendor over WhatsApp when the order is confirmed.",
    ),
];

const DEFAULT_REPLY: &str =
    "I'm here to help with the marketplace. Ask about orders, products, delivery, or messages.";

/// Outcome of a rule lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleReply {
    /// A keyword rule matched.
    Matched(String),
    /// Nothing matched; the default reply. Callers may forward the
    /// question to support.
    Default(String),
}

impl RuleReply {
    /// The reply text regardless of how it was found.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Matched(text) | Self::Default(text) => text,
        }
    }
}

/// The keyword table.
#[derive(Debug, Clone)]
pub struct RuleBook {
    entries: Vec<(String, String)>,
    default_reply: String,
}

impl RuleBook {
    /// Look up a reply for a prompt.
    #[must_use]
    pub fn reply(&self, prompt: &str) -> RuleReply {
        let normalized = prompt.trim().to_lowercase();

        if let Some((_, answer)) = self.entries.iter().find(|(key, _)| *key == normalized) {
            return RuleReply::Matched(answer.clone());
        }

        if let Some((_, answer)) = self
            .entries
            .iter()
            .find(|(key, _)| normalized.contains(key.as_str()))
        {
            return RuleReply::Matched(answer.clone());
        }

        RuleReply::Default(self.default_reply.clone())
    }

    /// Teach the bot a new answer, replacing any existing rule for the
    /// same normalized question.
    pub fn learn(&mut self, question: &str, answer: &str) {
        let key = question.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        self.entries.retain(|(existing, _)| *existing != key);
        self.entries.push((key, answer.trim().to_owned()));
    }

    /// Number of rules in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self {
            entries: DEFAULT_RULES
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            default_reply: DEFAULT_REPLY.to_owned(),
        }
    }
}
