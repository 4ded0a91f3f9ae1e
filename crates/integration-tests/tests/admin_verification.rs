//! Admin vendor verification through the backend seam and catalog join.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use sokocamp_core::{Role, VendorId, VendorStatus};
use sokocamp_integration_tests::{
    MockBackend, RecordingNotifier, auth_user, pending_vendor, product, profile,
};
use sokocamp_marketplace::admin::AdminError;
use sokocamp_marketplace::config::MarketplaceConfig;
use sokocamp_marketplace::state::AppState;
use sokocamp_marketplace::storage::MemoryStore;

fn test_config() -> MarketplaceConfig {
    MarketplaceConfig {
        support_phone: "+255 775 769 177".to_owned(),
        support_email: "sokocamp@gmail.com".to_owned(),
        page_size: 12,
        gemini: None,
    }
}

fn app(backend: MockBackend) -> (AppState<MockBackend>, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    let app = AppState::with_notifier(
        test_config(),
        backend.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingNotifier::new()),
    );
    (app, backend)
}

fn marketplace_with_pending_vendor(role: Role) -> MockBackend {
    MockBackend::new()
        .with_products(vec![product("p1", "Desk Lamp", "home", 5_000, "vend-1")])
        .with_vendor(pending_vendor("vend-1", "Asha Supplies"))
        .with_profile(profile("Juma", role))
}

#[tokio::test]
async fn test_admin_verification_reaches_the_catalog_join() {
    let (app, backend) = app(marketplace_with_pending_vendor(Role::Admin));
    app.session().handle_auth_change(Some(auth_user("u1"))).await;

    app.catalog().load_all().await;
    assert!(!app.catalog().snapshot()[0].is_verified);

    app.admin().verify_vendor(&VendorId::new("vend-1")).await.unwrap();
    assert_eq!(
        backend.vendor_status(&VendorId::new("vend-1")),
        Some(VendorStatus::Verified)
    );

    // The join cache was invalidated; the next load shows the badge.
    app.catalog().load_all().await;
    assert!(app.catalog().snapshot()[0].is_verified);
}

#[tokio::test]
async fn test_customer_session_cannot_verify() {
    let (app, backend) = app(marketplace_with_pending_vendor(Role::Customer));
    app.session().handle_auth_change(Some(auth_user("u1"))).await;

    let result = app.admin().verify_vendor(&VendorId::new("vend-1")).await;
    assert!(matches!(result, Err(AdminError::NotAuthorized)));
    assert_eq!(
        backend.vendor_status(&VendorId::new("vend-1")),
        Some(VendorStatus::Pending)
    );
}

#[tokio::test]
async fn test_verification_requires_a_signed_in_session() {
    let (app, backend) = app(marketplace_with_pending_vendor(Role::Admin));

    let result = app.admin().verify_vendor(&VendorId::new("vend-1")).await;
    assert!(matches!(result, Err(AdminError::NotAuthorized)));
    assert_eq!(
        backend.vendor_status(&VendorId::new("vend-1")),
        Some(VendorStatus::Pending)
    );
}

#[tokio::test]
async fn test_missing_vendor_surfaces_backend_error() {
    let (app, _) = app(marketplace_with_pending_vendor(Role::Admin));
    app.session().handle_auth_change(Some(auth_user("u1"))).await;

    let result = app.admin().verify_vendor(&VendorId::new("ghost")).await;
    assert!(matches!(result, Err(AdminError::Backend(_))));
}
