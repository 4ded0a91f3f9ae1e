//! Application state shared across contexts.

use std::sync::Arc;

use crate::admin::AdminService;
use crate::backend::Backend;
use crate::bus::EventBus;
use crate::cart::CartContainer;
use crate::catalog::{CatalogService, ProductListing};
use crate::chatbot::ChatAssistant;
use crate::checkout::CheckoutService;
use crate::config::MarketplaceConfig;
use crate::i18n::LanguageContainer;
use crate::notify::{Notifier, TracingNotifier};
use crate::session::SessionContainer;
use crate::storage::KeyValueStore;

/// Application state shared across all contexts.
///
/// This struct is cheaply cloneable via `Arc` and wires the containers
/// and services onto one store, one event bus, and one backend. The cart
/// is subscribed to the bus at construction so cross-context invalidation
/// works without further setup.
#[derive(Clone)]
pub struct AppState<B> {
    inner: Arc<AppStateInner<B>>,
}

struct AppStateInner<B> {
    config: MarketplaceConfig,
    bus: EventBus,
    cart: CartContainer,
    session: SessionContainer<B>,
    catalog: CatalogService<B>,
    language: LanguageContainer,
    checkout: CheckoutService<B>,
    admin: AdminService<B>,
    assistant: ChatAssistant,
}

impl<B: Backend> AppState<B> {
    /// Create the application state over a backend and a durable store.
    ///
    /// Uses the logging notifier; embedders with a UI pass their own via
    /// [`AppState::with_notifier`].
    #[must_use]
    pub fn new(config: MarketplaceConfig, backend: Arc<B>, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_notifier(config, backend, store, Arc::new(TracingNotifier))
    }

    /// Create the application state with a custom notification sink.
    ///
    /// When called inside a Tokio runtime, the cart's invalidation listener
    /// is spawned here and no further setup is needed. Outside a runtime,
    /// construction still succeeds but the embedder must drive
    /// [`CartContainer::listen`] on a subscription from [`AppState::bus`]
    /// for cross-context invalidation to reach the cart.
    #[must_use]
    pub fn with_notifier(
        config: MarketplaceConfig,
        backend: Arc<B>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let bus = EventBus::new();
        let cart = CartContainer::new(store.clone(), notifier.clone());
        let session = SessionContainer::new(backend.clone(), store.clone(), bus.clone());
        let catalog = CatalogService::new(backend.clone());
        let language = LanguageContainer::new(store, bus.clone());
        let checkout = CheckoutService::new(
            backend.clone(),
            cart.clone(),
            notifier,
            config.support_phone.clone(),
        );
        let admin = AdminService::new(backend, session.clone(), catalog.clone());
        let assistant = ChatAssistant::from_config(&config);

        // Keep the cart in sync with session teardown happening in any
        // other context.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let listener = cart.clone();
                let rx = bus.subscribe();
                handle.spawn(async move { listener.listen(rx).await });
            }
            Err(_) => {
                tracing::warn!(
                    "no tokio runtime at construction; drive CartContainer::listen manually"
                );
            }
        }

        Self {
            inner: Arc::new(AppStateInner {
                config,
                bus,
                cart,
                session,
                catalog,
                language,
                checkout,
                admin,
                assistant,
            }),
        }
    }

    /// Get a reference to the marketplace configuration.
    #[must_use]
    pub fn config(&self) -> &MarketplaceConfig {
        &self.inner.config
    }

    /// Get a reference to the cross-context event bus.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// Get a reference to the shopping cart.
    #[must_use]
    pub fn cart(&self) -> &CartContainer {
        &self.inner.cart
    }

    /// Get a reference to the session container.
    #[must_use]
    pub fn session(&self) -> &SessionContainer<B> {
        &self.inner.session
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService<B> {
        &self.inner.catalog
    }

    /// Get a reference to the language container.
    #[must_use]
    pub fn language(&self) -> &LanguageContainer {
        &self.inner.language
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService<B> {
        &self.inner.checkout
    }

    /// Get a reference to the admin service.
    #[must_use]
    pub fn admin(&self) -> &AdminService<B> {
        &self.inner.admin
    }

    /// Get a reference to the chat assistant.
    #[must_use]
    pub fn assistant(&self) -> &ChatAssistant {
        &self.inner.assistant
    }

    /// Start a product listing over the current catalog snapshot, sized by
    /// configuration.
    #[must_use]
    pub fn listing(&self) -> ProductListing {
        self.inner.catalog.listing(self.inner.config.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, ProductRecord, ProfileRecord, VendorRecord};
    use crate::checkout::Order;
    use crate::storage::MemoryStore;
    use sokocamp_core::{UserId, VendorId, VendorStatus};

    struct FakeBackend;

    impl Backend for FakeBackend {
        async fn fetch_products(&self) -> Result<Vec<ProductRecord>, BackendError> {
            Ok(Vec::new())
        }

        async fn fetch_vendor(&self, id: &VendorId) -> Result<VendorRecord, BackendError> {
            Err(BackendError::NotFound {
                collection: "vendors".to_owned(),
                id: id.to_string(),
            })
        }

        async fn fetch_profile(&self, id: &UserId) -> Result<ProfileRecord, BackendError> {
            Err(BackendError::NotFound {
                collection: "users".to_owned(),
                id: id.to_string(),
            })
        }

        async fn sign_out(&self) -> Result<(), BackendError> {
            Ok(())
        }

        async fn submit_order(&self, _order: &Order) -> Result<(), BackendError> {
            Ok(())
        }

        async fn fetch_orders(&self, _customer_email: &str) -> Result<Vec<Order>, BackendError> {
            Ok(Vec::new())
        }

        async fn update_vendor_status(
            &self,
            _id: &VendorId,
            _status: VendorStatus,
        ) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn config() -> MarketplaceConfig {
        MarketplaceConfig {
            support_phone: "255700000000".to_owned(),
            support_email: "support@example.com".to_owned(),
            page_size: 12,
            gemini: None,
        }
    }

    // Deliberately a plain test, no tokio runtime.
    #[test]
    fn test_construction_outside_runtime_does_not_panic() {
        let app = AppState::new(
            config(),
            Arc::new(FakeBackend),
            Arc::new(MemoryStore::new()),
        );
        assert!(app.cart().is_empty());
    }
}
