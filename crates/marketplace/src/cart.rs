//! Cart state container.
//!
//! Single source of truth for the shopping cart: an insertion-ordered list
//! of line items, at most one per product id, mirrored 1:1 into the durable
//! store after every mutation and rehydrated at construction. A
//! [`Event::CartInvalidated`] broadcast (same-tab sign-out or a clear
//! observed from another context) resets the in-memory items without
//! re-persisting; the already-cleared store is the source of truth.
//!
//! No operation here can fail. A corrupt persisted cart is logged and
//! treated as empty rather than surfaced; it must never block the UI.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use sokocamp_core::{Price, ProductId, VendorId};

use crate::bus::Event;
use crate::catalog::CatalogProduct;
use crate::i18n::MessageKey;
use crate::notify::{NoticeLevel, Notifier};
use crate::storage::{KeyValueStore, keys};

/// One product-and-quantity pairing inside the cart.
///
/// Product fields are copied at add time, so a later vendor edit does not
/// mutate an already-carted line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    /// Always >= 1; a quantity reaching zero removes the line.
    pub quantity: u32,
}

impl CartLineItem {
    fn from_product(product: &CatalogProduct, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            images: product.images.clone(),
            category: product.category.clone(),
            vendor_id: Some(product.vendor_id.clone()),
            vendor_name: Some(product.vendor_name.clone()),
            quantity,
        }
    }

    /// Line subtotal (`price * quantity`).
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

struct CartState {
    items: Vec<CartLineItem>,
    is_open: bool,
}

/// The cart container. Cheaply cloneable; all clones share state.
#[derive(Clone)]
pub struct CartContainer {
    inner: Arc<CartInner>,
}

struct CartInner {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CartState>,
}

impl CartContainer {
    /// Create a container, rehydrating the persisted cart.
    ///
    /// A missing or corrupt persisted blob yields an empty cart; the parse
    /// failure is logged, never propagated.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        let items = store
            .get(keys::CART)
            .map(|blob| match serde_json::from_str::<Vec<CartLineItem>>(&blob) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("discarding corrupt persisted cart: {e}");
                    Vec::new()
                }
            })
            .unwrap_or_default();

        Self {
            inner: Arc::new(CartInner {
                store,
                notifier,
                state: Mutex::new(CartState {
                    items,
                    is_open: false,
                }),
            }),
        }
    }

    /// Add a product to the cart.
    ///
    /// Merges into an existing line for the same product id by incrementing
    /// its quantity; otherwise appends a new line. Stock is not checked at
    /// this layer.
    pub fn add_item(&self, product: &CatalogProduct, quantity: u32) {
        let key = self.with_items(|items| {
            if let Some(line) = items
                .iter_mut()
                .find(|line| line.product_id == product.id)
            {
                line.quantity = line.quantity.saturating_add(quantity);
                MessageKey::QuantityUpdated
            } else {
                items.push(CartLineItem::from_product(product, quantity.max(1)));
                MessageKey::AddedToCart
            }
        });
        self.inner.notifier.notify(NoticeLevel::Success, key);
    }

    /// Remove the line for `product_id`. No-op (not an error) when absent.
    pub fn remove_item(&self, product_id: &ProductId) {
        self.with_items(|items| {
            items.retain(|line| &line.product_id != product_id);
        });
        self.inner
            .notifier
            .notify(NoticeLevel::Success, MessageKey::RemovedFromCart);
    }

    /// Set the line's quantity to an exact value.
    ///
    /// A quantity of zero (or less, at call sites doing arithmetic)
    /// delegates to [`Self::remove_item`].
    pub fn update_quantity(&self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id);
            return;
        }

        self.with_items(|items| {
            if let Some(line) = items.iter_mut().find(|line| &line.product_id == product_id) {
                line.quantity = quantity;
            }
        });
    }

    /// Empty the cart.
    pub fn clear(&self) {
        self.with_items(Vec::clear);
        self.inner
            .notifier
            .notify(NoticeLevel::Success, MessageKey::CartCleared);
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.read(|state| state.items.iter().map(|line| line.quantity).sum())
    }

    /// Sum of `price * quantity` over all lines; zero for an empty cart.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.read(|state| state.items.iter().map(CartLineItem::subtotal).sum())
    }

    /// Snapshot of the current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.read(|state| state.items.clone())
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read(|state| state.items.is_empty())
    }

    /// Show the cart sidebar. Visibility is never persisted.
    pub fn open(&self) {
        if let Ok(mut state) = self.inner.state.lock() {
            state.is_open = true;
        }
    }

    /// Hide the cart sidebar.
    pub fn close(&self) {
        if let Ok(mut state) = self.inner.state.lock() {
            state.is_open = false;
        }
    }

    /// Whether the cart sidebar is visible.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.read(|state| state.is_open)
    }

    /// React to a bus event.
    ///
    /// On [`Event::CartInvalidated`] the in-memory items reset to empty
    /// WITHOUT re-persisting. Idempotent: repeated invalidations keep the
    /// cart empty.
    pub fn handle_event(&self, event: &Event) {
        if matches!(event, Event::CartInvalidated)
            && let Ok(mut state) = self.inner.state.lock()
        {
            state.items.clear();
        }
    }

    /// Drive [`Self::handle_event`] from a bus subscription until the bus
    /// closes. Spawn this once per container.
    pub async fn listen(&self, mut rx: tokio::sync::broadcast::Receiver<Event>) {
        loop {
            match rx.recv().await {
                Ok(event) => self.handle_event(&event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "cart listener lagged behind the bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Run a mutation over the item list, then mirror the full list into
    /// the durable store. Every item mutation funnels through here so the
    /// persisted blob always deserializes to the in-memory list.
    fn with_items<T>(&self, f: impl FnOnce(&mut Vec<CartLineItem>) -> T) -> T {
        let (result, blob) = {
            let mut state = match self.inner.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            let result = f(&mut state.items);
            (result, serde_json::to_string(&state.items))
        };

        match blob {
            Ok(blob) => self.inner.store.set(keys::CART, &blob),
            Err(e) => tracing::error!("failed to serialize cart for persistence: {e}"),
        }
        result
    }

    fn read<T>(&self, f: impl FnOnce(&CartState) -> T) -> T {
        match self.inner.state.lock() {
            Ok(state) => f(&state),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }
}
