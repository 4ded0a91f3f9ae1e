//! Integration test harness for SokoCamp.
//!
//! Provides an in-memory [`MockBackend`] implementing the document/auth
//! seam, a [`RecordingNotifier`] capturing user-visible notices, and
//! record fixtures. The tests in `tests/` wire real containers over these
//! fakes and drive whole flows: login, browse, cart, checkout.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use sokocamp_core::{OrderId, OrderStatus, Price, ProductId, Role, UserId, VendorId, VendorStatus};
use sokocamp_marketplace::backend::{
    Backend, BackendError, ProductRecord, ProfileRecord, VendorRecord,
};
use sokocamp_marketplace::checkout::{CustomerInfo, Order};
use sokocamp_marketplace::i18n::MessageKey;
use sokocamp_marketplace::notify::{NoticeLevel, Notifier};
use sokocamp_marketplace::session::AuthUser;

// =============================================================================
// Mock Backend
// =============================================================================

/// In-memory document/auth backend.
///
/// Configure with the builder methods, then hand to the containers behind
/// an `Arc`. Failure flags make the corresponding call return a transport
/// error.
#[derive(Default)]
pub struct MockBackend {
    products: Vec<ProductRecord>,
    vendors: Mutex<HashMap<VendorId, VendorRecord>>,
    profile: Option<ProfileRecord>,
    fail_products: bool,
    fail_profile: bool,
    fail_orders: bool,
    orders: Mutex<Vec<Order>>,
    sign_outs: AtomicUsize,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_products(mut self, products: Vec<ProductRecord>) -> Self {
        self.products = products;
        self
    }

    #[must_use]
    pub fn with_vendor(self, vendor: VendorRecord) -> Self {
        match self.vendors.lock() {
            Ok(mut vendors) => {
                vendors.insert(vendor.id.clone(), vendor);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(vendor.id.clone(), vendor);
            }
        }
        self
    }

    /// Pre-load order documents, as if placed in an earlier session.
    #[must_use]
    pub fn with_orders(self, preset: Vec<Order>) -> Self {
        match self.orders.lock() {
            Ok(mut orders) => orders.extend(preset),
            Err(poisoned) => poisoned.into_inner().extend(preset),
        }
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: ProfileRecord) -> Self {
        self.profile = Some(profile);
        self
    }

    #[must_use]
    pub const fn failing_products(mut self) -> Self {
        self.fail_products = true;
        self
    }

    #[must_use]
    pub const fn failing_profile(mut self) -> Self {
        self.fail_profile = true;
        self
    }

    #[must_use]
    pub const fn failing_orders(mut self) -> Self {
        self.fail_orders = true;
        self
    }

    /// Orders submitted so far, in submission order.
    #[must_use]
    pub fn submitted_orders(&self) -> Vec<Order> {
        match self.orders.lock() {
            Ok(orders) => orders.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of `sign_out` calls observed.
    #[must_use]
    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    /// Current status of a stored vendor document.
    #[must_use]
    pub fn vendor_status(&self, id: &VendorId) -> Option<VendorStatus> {
        match self.vendors.lock() {
            Ok(vendors) => vendors.get(id).map(|v| v.status),
            Err(poisoned) => poisoned.into_inner().get(id).map(|v| v.status),
        }
    }
}

impl Backend for MockBackend {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, BackendError> {
        if self.fail_products {
            return Err(BackendError::Transport("products unavailable".to_owned()));
        }
        Ok(self.products.clone())
    }

    async fn fetch_vendor(&self, id: &VendorId) -> Result<VendorRecord, BackendError> {
        let vendor = match self.vendors.lock() {
            Ok(vendors) => vendors.get(id).cloned(),
            Err(poisoned) => poisoned.into_inner().get(id).cloned(),
        };
        vendor.ok_or_else(|| BackendError::NotFound {
            collection: "vendors".to_owned(),
            id: id.to_string(),
        })
    }

    async fn fetch_profile(&self, id: &UserId) -> Result<ProfileRecord, BackendError> {
        if self.fail_profile {
            return Err(BackendError::Transport("profile unavailable".to_owned()));
        }
        self.profile
            .clone()
            .ok_or_else(|| BackendError::NotFound {
                collection: "users".to_owned(),
                id: id.to_string(),
            })
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn submit_order(&self, order: &Order) -> Result<(), BackendError> {
        if self.fail_orders {
            return Err(BackendError::Rejected("order write denied".to_owned()));
        }
        match self.orders.lock() {
            Ok(mut orders) => orders.push(order.clone()),
            Err(mut poisoned) => poisoned.get_mut().push(order.clone()),
        }
        Ok(())
    }

    async fn fetch_orders(&self, customer_email: &str) -> Result<Vec<Order>, BackendError> {
        if self.fail_orders {
            return Err(BackendError::Transport("orders unavailable".to_owned()));
        }
        let email = customer_email.to_lowercase();
        Ok(self
            .submitted_orders()
            .into_iter()
            .filter(|order| order.customer.email.to_lowercase() == email)
            .collect())
    }

    async fn update_vendor_status(
        &self,
        id: &VendorId,
        status: VendorStatus,
    ) -> Result<(), BackendError> {
        let mut vendors = match self.vendors.lock() {
            Ok(vendors) => vendors,
            Err(poisoned) => poisoned.into_inner(),
        };
        let vendor = vendors.get_mut(id).ok_or_else(|| BackendError::NotFound {
            collection: "vendors".to_owned(),
            id: id.to_string(),
        })?;
        vendor.status = status;
        Ok(())
    }
}

// =============================================================================
// Recording Notifier
// =============================================================================

/// Notifier that records every notice for assertions.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<(NoticeLevel, MessageKey)>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices recorded so far, in delivery order.
    #[must_use]
    pub fn notices(&self) -> Vec<(NoticeLevel, MessageKey)> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, key: MessageKey) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((level, key));
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A product document fixture.
#[must_use]
pub fn product(id: &str, name: &str, category: &str, price: i64, vendor: &str) -> ProductRecord {
    ProductRecord {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: String::new(),
        price: Price::from_shillings(price),
        original_price: None,
        stock: 10,
        category: Some(category.to_owned()),
        images: vec![format!("/images/{id}.jpg")],
        rating: None,
        vendor_id: VendorId::new(vendor),
        created_at: None,
    }
}

/// The same product with a creation timestamp.
#[must_use]
pub fn product_created_at(
    id: &str,
    name: &str,
    category: &str,
    price: i64,
    vendor: &str,
    created_at: DateTime<Utc>,
) -> ProductRecord {
    let mut record = product(id, name, category, price, vendor);
    record.created_at = Some(created_at);
    record
}

/// A verified vendor document fixture.
#[must_use]
pub fn verified_vendor(id: &str, business_name: &str) -> VendorRecord {
    VendorRecord {
        id: VendorId::new(id),
        business_name: business_name.to_owned(),
        profile_image: Some(format!("/avatars/{id}.jpg")),
        status: VendorStatus::Verified,
    }
}

/// A vendor document fixture awaiting admin review.
#[must_use]
pub fn pending_vendor(id: &str, business_name: &str) -> VendorRecord {
    VendorRecord {
        id: VendorId::new(id),
        business_name: business_name.to_owned(),
        profile_image: None,
        status: VendorStatus::Pending,
    }
}

/// An order document fixture for a given customer email.
#[must_use]
pub fn order(
    id: &str,
    email: &str,
    status: OrderStatus,
    created_at: DateTime<Utc>,
) -> Order {
    Order {
        id: OrderId::new(id),
        customer: CustomerInfo {
            name: "Neema".to_owned(),
            phone: "+255 712 000 111".to_owned(),
            email: email.to_owned(),
            address: "Hall 3, Room 12".to_owned(),
            details: None,
        },
        items: Vec::new(),
        total: Price::from_shillings(5_000),
        status,
        created_at,
    }
}

/// A profile document fixture.
#[must_use]
pub fn profile(name: &str, role: Role) -> ProfileRecord {
    ProfileRecord {
        name: name.to_owned(),
        role,
        favorites: Vec::new(),
    }
}

/// An authenticated identity fixture.
#[must_use]
pub fn auth_user(uid: &str) -> AuthUser {
    AuthUser {
        uid: UserId::new(uid),
        email: None,
    }
}
