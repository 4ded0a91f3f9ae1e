//! Typed translations and the language container.
//!
//! Messages are an enumerated key set resolved through a single lookup:
//! Swahili falls back to English, and a key missing from every table falls
//! back to its own dotted name. The fallback is a never-crash contract; a
//! missing translation renders as the key, never as an error.

use std::sync::{Arc, Mutex};

use sokocamp_core::Language;

use crate::bus::{Event, EventBus};
use crate::storage::{KeyValueStore, keys};

/// Enumerated message keys the containers and chatbot emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    AddedToCart,
    QuantityUpdated,
    RemovedFromCart,
    CartCleared,
    CartEmpty,
    OrderPlaced,
    OrderFailed,
    NoProductsFound,
    LoadMoreProducts,
    AssistantGreeting,
    AssistantUnavailable,
}

impl MessageKey {
    /// The dotted key name, used as the final translation fallback.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AddedToCart => "cart.added",
            Self::QuantityUpdated => "cart.quantity_updated",
            Self::RemovedFromCart => "cart.removed",
            Self::CartCleared => "cart.cleared",
            Self::CartEmpty => "cart.empty",
            Self::OrderPlaced => "checkout.order_placed",
            Self::OrderFailed => "checkout.order_failed",
            Self::NoProductsFound => "catalog.no_products_found",
            Self::LoadMoreProducts => "catalog.load_more",
            Self::AssistantGreeting => "assistant.greeting",
            Self::AssistantUnavailable => "assistant.unavailable",
        }
    }
}

/// English strings. Every key must resolve here.
const fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::AddedToCart => "Added to cart!",
        MessageKey::QuantityUpdated => "Quantity updated in cart!",
        MessageKey::RemovedFromCart => "Removed from cart",
        MessageKey::CartCleared => "Cart cleared",
        MessageKey::CartEmpty => "Your cart is empty",
        MessageKey::OrderPlaced => "Order placed! WhatsApp opened with order details.",
        MessageKey::OrderFailed => "Failed to place order",
        MessageKey::NoProductsFound => "No products found",
        MessageKey::LoadMoreProducts => "Load More Products",
        MessageKey::AssistantGreeting => "Hi! How can I help you today?",
        MessageKey::AssistantUnavailable => {
            "Sorry, I'm having trouble generating a response. Please try again \
             or contact us at sokocamp@gmail.com"
        }
    }
}

/// Swahili strings. Partial on purpose; absent keys fall back to English.
const fn swahili(key: MessageKey) -> Option<&'static str> {
    match key {
        MessageKey::AddedToCart => Some("Imewekwa mkobani!"),
        MessageKey::QuantityUpdated => Some("Idadi imesasishwa mkobani!"),
        MessageKey::RemovedFromCart => Some("Imeondolewa mkobani"),
        MessageKey::CartCleared => Some("Mkoba umefutwa"),
        MessageKey::CartEmpty => Some("Mkoba wako hauna kitu"),
        MessageKey::NoProductsFound => Some("Hakuna bidhaa zilizopatikana"),
        MessageKey::LoadMoreProducts => Some("Pakia Bidhaa Zaidi"),
        MessageKey::AssistantUnavailable => Some(
            "Samahani, nina matatizo ya kutoa jibu. Tafadhali jaribu tena au \
             tuandikie sokocamp@gmail.com",
        ),
        _ => None,
    }
}

/// Resolve a message key for a language.
///
/// Swahili falls back to English; a key absent everywhere resolves to its
/// own dotted name.
#[must_use]
pub const fn translate(language: Language, key: MessageKey) -> &'static str {
    match language {
        Language::En => english(key),
        Language::Sw => match swahili(key) {
            Some(text) => text,
            None => english(key),
        },
    }
}

/// Owns the selected UI language and persists it across reloads.
///
/// Changing the language writes the durable key and publishes
/// [`Event::LanguageChanged`] so other open contexts re-render.
#[derive(Clone)]
pub struct LanguageContainer {
    inner: Arc<LanguageInner>,
}

struct LanguageInner {
    store: Arc<dyn KeyValueStore>,
    bus: EventBus,
    current: Mutex<Language>,
}

impl LanguageContainer {
    /// Create a container, restoring the persisted language if it is one
    /// of the supported codes.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, bus: EventBus) -> Self {
        let current = store
            .get(keys::LANGUAGE)
            .and_then(|code| Language::parse(&code))
            .unwrap_or_default();

        Self {
            inner: Arc::new(LanguageInner {
                store,
                bus,
                current: Mutex::new(current),
            }),
        }
    }

    /// The currently selected language.
    #[must_use]
    pub fn current(&self) -> Language {
        self.inner
            .current
            .lock()
            .map(|current| *current)
            .unwrap_or_default()
    }

    /// Select a language, persist it, and broadcast the change.
    pub fn set(&self, language: Language) {
        if let Ok(mut current) = self.inner.current.lock() {
            *current = language;
        }
        self.inner.store.set(keys::LANGUAGE, language.as_str());
        self.inner.bus.publish(Event::LanguageChanged(language));
    }

    /// Resolve a message key in the current language.
    #[must_use]
    pub fn translate(&self, key: MessageKey) -> &'static str {
        translate(self.current(), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_translate_english() {
        assert_eq!(
            translate(Language::En, MessageKey::AddedToCart),
            "Added to cart!"
        );
    }

    #[test]
    fn test_translate_swahili() {
        assert_eq!(
            translate(Language::Sw, MessageKey::CartEmpty),
            "Mkoba wako hauna kitu"
        );
    }

    #[test]
    fn test_swahili_falls_back_to_english() {
        // No Swahili entry for the greeting; English must come back.
        assert_eq!(
            translate(Language::Sw, MessageKey::AssistantGreeting),
            "Hi! How can I help you today?"
        );
    }

    #[test]
    fn test_container_restores_persisted_language() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::LANGUAGE, "sw");

        let container = LanguageContainer::new(store, EventBus::new());
        assert_eq!(container.current(), Language::Sw);
    }

    #[test]
    fn test_container_ignores_unknown_persisted_code() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::LANGUAGE, "klingon");

        let container = LanguageContainer::new(store, EventBus::new());
        assert_eq!(container.current(), Language::En);
    }

    #[tokio::test]
    async fn test_set_persists_and_broadcasts() {
        let store = Arc::new(MemoryStore::new());
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let container = LanguageContainer::new(store.clone(), bus);
        container.set(Language::Sw);

        assert_eq!(container.current(), Language::Sw);
        assert_eq!(store.get(keys::LANGUAGE), Some("sw".to_owned()));
        assert_eq!(rx.recv().await, Ok(Event::LanguageChanged(Language::Sw)));
    }
}
