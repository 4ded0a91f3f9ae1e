//! Document backend seam.
//!
//! The marketplace delegates all persistence, querying, and auth to a
//! managed document backend. This module defines the records that backend
//! returns and the trait the containers call through; production wires an
//! SDK client here, tests wire an in-memory mock. Queries are by collection
//! and document id only; multi-field filtering happens client-side in
//! [`crate::catalog`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sokocamp_core::{Price, ProductId, Role, UserId, VendorId, VendorStatus};

use crate::checkout::Order;
use crate::session::Profile;

/// Errors from the document backend boundary.
///
/// Everything here is transient or a missing document; callers log and
/// degrade rather than propagate a hard failure to the UI.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network or transport failure reaching the backend.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend rejected the request (auth, quota, permissions).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// An expected document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document id.
        id: String,
    },
}

/// A product document as stored by a vendor.
///
/// Display fields joined from the vendor document (name, avatar, verified
/// flag) are NOT stored here; the catalog loader derives them at fetch
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub rating: Option<rust_decimal::Decimal>,
    pub vendor_id: VendorId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A vendor document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorRecord {
    pub id: VendorId,
    pub business_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub status: VendorStatus,
}

/// A user profile document, fetched after authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub favorites: Vec<ProductId>,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            name: record.name,
            role: record.role,
            favorites: record.favorites.into_iter().collect(),
        }
    }
}

/// The document/auth backend the containers call through.
///
/// Implementations perform the actual SDK calls; none of these methods are
/// retried or cancelled here. A later-resolving stale fetch overwriting a
/// newer one is an accepted race (loads are idempotent).
pub trait Backend: Send + Sync + 'static {
    /// Fetch the entire product collection, unbounded.
    fn fetch_products(
        &self,
    ) -> impl Future<Output = Result<Vec<ProductRecord>, BackendError>> + Send;

    /// Fetch a single vendor document.
    fn fetch_vendor(
        &self,
        id: &VendorId,
    ) -> impl Future<Output = Result<VendorRecord, BackendError>> + Send;

    /// Fetch the profile document for an authenticated user.
    fn fetch_profile(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<ProfileRecord, BackendError>> + Send;

    /// Sign the current identity out of the auth provider.
    fn sign_out(&self) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Create an order document.
    fn submit_order(&self, order: &Order)
    -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Fetch the orders placed by a customer, matched on email
    /// case-insensitively.
    fn fetch_orders(
        &self,
        customer_email: &str,
    ) -> impl Future<Output = Result<Vec<Order>, BackendError>> + Send;

    /// Overwrite a vendor document's verification status.
    fn update_vendor_status(
        &self,
        id: &VendorId,
        status: VendorStatus,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_record_defaults_on_sparse_document() {
        // Vendors save documents from a form; most optional fields can be
        // absent and must deserialize to defaults.
        let json = r#"{
            "id": "prod-1",
            "name": "Desk Lamp",
            "price": "5000",
            "vendor_id": "vend-1"
        }"#;

        let record: ProductRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.description, "");
        assert_eq!(record.stock, 0);
        assert_eq!(record.category, None);
        assert!(record.images.is_empty());
        assert_eq!(record.created_at, None);
    }

    #[test]
    fn test_profile_record_into_profile() {
        let record = ProfileRecord {
            name: "Asha".to_owned(),
            role: Role::Vendor,
            favorites: vec![ProductId::new("p1"), ProductId::new("p1")],
        };

        let profile = Profile::from(record);
        assert_eq!(profile.role, Role::Vendor);
        // Favorites are a set; duplicates collapse.
        assert_eq!(profile.favorites.len(), 1);
    }

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound {
            collection: "vendors".to_owned(),
            id: "vend-9".to_owned(),
        };
        assert_eq!(err.to_string(), "document not found: vendors/vend-9");
    }
}
