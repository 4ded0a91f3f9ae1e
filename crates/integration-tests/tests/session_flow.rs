//! Login, role flags, and sign-out invalidation across containers.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use sokocamp_core::Role;
use sokocamp_integration_tests::{
    MockBackend, RecordingNotifier, auth_user, product, profile, verified_vendor,
};
use sokocamp_marketplace::cart::CartContainer;
use sokocamp_marketplace::config::MarketplaceConfig;
use sokocamp_marketplace::session::SessionState;
use sokocamp_marketplace::state::AppState;
use sokocamp_marketplace::storage::{KeyValueStore, MemoryStore, keys};

fn test_config() -> MarketplaceConfig {
    MarketplaceConfig {
        support_phone: "255775769177".to_owned(),
        support_email: "sokocamp@gmail.com".to_owned(),
        page_size: 12,
        gemini: None,
    }
}

fn app(backend: MockBackend) -> AppState<MockBackend> {
    AppState::with_notifier(
        test_config(),
        Arc::new(backend),
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingNotifier::new()),
    )
}

/// Wait for the spawned cart listener to observe the invalidation.
async fn wait_until_empty(cart: &CartContainer) {
    for _ in 0..100 {
        if cart.is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("cart never emptied");
}

#[tokio::test]
async fn test_login_reaches_authenticated_with_role_flags() {
    let app = app(MockBackend::new().with_profile(profile("Asha", Role::Vendor)));

    app.session().handle_auth_change(Some(auth_user("u1"))).await;

    assert_eq!(app.session().state(), SessionState::Authenticated);
    assert!(app.session().is_vendor());
    assert!(!app.session().is_admin());
    assert_eq!(app.session().profile().unwrap().name, "Asha");
}

#[tokio::test]
async fn test_profile_fetch_failure_forces_sign_out() {
    let backend = Arc::new(
        MockBackend::new()
            .with_profile(profile("Asha", Role::Vendor))
            .failing_profile(),
    );
    let app = AppState::with_notifier(
        test_config(),
        backend.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(RecordingNotifier::new()),
    );

    app.session().handle_auth_change(Some(auth_user("u1"))).await;

    assert_eq!(app.session().state(), SessionState::Unauthenticated);
    assert_eq!(app.session().auth_user(), None);
    assert!(!app.session().is_vendor());
    // The corrective sign-out reached the auth provider.
    assert_eq!(backend.sign_out_count(), 1);
}

#[tokio::test]
async fn test_logout_clears_cart_in_every_context() {
    sokocamp_marketplace::telemetry::init_tracing();

    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let backend = Arc::new(
        MockBackend::new()
            .with_products(vec![product("p1", "Desk Lamp", "home", 5_000, "vend-1")])
            .with_vendor(verified_vendor("vend-1", "Asha Supplies"))
            .with_profile(profile("Neema", Role::Customer)),
    );
    let app = AppState::with_notifier(
        test_config(),
        backend,
        store.clone(),
        Arc::new(RecordingNotifier::new()),
    );

    app.catalog().load_all().await;
    let snapshot = app.catalog().snapshot();
    app.cart().add_item(&snapshot[0], 2);
    assert!(store.get(keys::CART).is_some());

    app.session().handle_auth_change(Some(auth_user("u1"))).await;
    app.session().logout().await;

    // Teardown removed the persisted cart and broadcast the invalidation;
    // the spawned listener resets the in-memory cart.
    assert_eq!(store.get(keys::CART), None);
    wait_until_empty(app.cart()).await;
}

#[tokio::test]
async fn test_null_identity_from_auth_stream_tears_down() {
    let app = app(MockBackend::new().with_profile(profile("Asha", Role::Admin)));

    app.session().handle_auth_change(Some(auth_user("u1"))).await;
    assert!(app.session().is_admin());

    app.session().handle_auth_change(None).await;
    assert_eq!(app.session().state(), SessionState::Unauthenticated);
    assert!(!app.session().is_admin());
}
