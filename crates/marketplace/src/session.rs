//! Session/identity container.
//!
//! Bridges the auth provider's state-change stream into role-aware flags
//! and guarantees the cart is never left associated with a previous user.
//!
//! State machine: `Unauthenticated -> AuthenticatingProfile ->
//! Authenticated`. A failed profile fetch forces a sign-out (the
//! authenticated-but-profile-less state is never observable) and settles
//! back in `Unauthenticated`; the same teardown runs on explicit logout and
//! on a null identity from the auth stream. Teardown clears the persisted
//! cart and publishes [`Event::CartInvalidated`] so every open context
//! resets.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::instrument;

use sokocamp_core::{Email, ProductId, Role, UserId};

use crate::backend::Backend;
use crate::bus::{Event, EventBus};
use crate::storage::{KeyValueStore, keys};

/// The external identity handle emitted by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: Option<Email>,
}

/// The user profile document, fetched after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub role: Role,
    pub favorites: HashSet<ProductId>,
}

/// Observable session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No identity; role flags are all false.
    #[default]
    Unauthenticated,
    /// Identity received, profile fetch in flight.
    AuthenticatingProfile,
    /// Identity and profile both present.
    Authenticated,
}

struct SessionSnapshot {
    auth_user: Option<AuthUser>,
    profile: Option<Profile>,
    state: SessionState,
}

/// The session container. Cheaply cloneable; all clones share state.
pub struct SessionContainer<B> {
    inner: Arc<SessionInner<B>>,
}

impl<B> Clone for SessionContainer<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionInner<B> {
    backend: Arc<B>,
    store: Arc<dyn KeyValueStore>,
    bus: EventBus,
    snapshot: Mutex<SessionSnapshot>,
}

impl<B: Backend> SessionContainer<B> {
    /// Create an unauthenticated container.
    #[must_use]
    pub fn new(backend: Arc<B>, store: Arc<dyn KeyValueStore>, bus: EventBus) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                backend,
                store,
                bus,
                snapshot: Mutex::new(SessionSnapshot {
                    auth_user: None,
                    profile: None,
                    state: SessionState::Unauthenticated,
                }),
            }),
        }
    }

    /// React to one event from the auth provider's identity stream.
    ///
    /// A non-null identity starts the profile fetch; if that fetch fails,
    /// the container forces a sign-out and clears the persisted cart so no
    /// inconsistent authenticated-but-profile-less state survives. A null
    /// identity tears the session down the same way.
    #[instrument(skip(self, user), fields(authenticated = user.is_some()))]
    pub async fn handle_auth_change(&self, user: Option<AuthUser>) {
        let Some(user) = user else {
            tracing::debug!("auth stream emitted null identity");
            self.teardown();
            return;
        };

        let uid = user.uid.clone();
        self.write(|snapshot| {
            snapshot.auth_user = Some(user);
            snapshot.profile = None;
            snapshot.state = SessionState::AuthenticatingProfile;
        });

        match self.inner.backend.fetch_profile(&uid).await {
            Ok(record) => {
                self.write(|snapshot| {
                    snapshot.profile = Some(record.into());
                    snapshot.state = SessionState::Authenticated;
                });
            }
            Err(e) => {
                // Corrective sign-out; the session must not stay
                // half-authenticated.
                tracing::warn!(user = %uid, "profile fetch failed, forcing sign-out: {e}");
                if let Err(e) = self.inner.backend.sign_out().await {
                    tracing::warn!("sign-out after profile failure also failed: {e}");
                }
                self.teardown();
            }
        }
    }

    /// Explicitly sign the user out.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.inner.backend.sign_out().await {
            tracing::warn!("sign-out call failed: {e}");
        }
        self.teardown();
    }

    /// Clear identity and profile, clear the persisted cart, and broadcast
    /// the invalidation. Always settles in `Unauthenticated`.
    fn teardown(&self) {
        self.write(|snapshot| {
            snapshot.auth_user = None;
            snapshot.profile = None;
            snapshot.state = SessionState::Unauthenticated;
        });
        self.inner.store.remove(keys::CART);
        self.inner.bus.publish(Event::CartInvalidated);
    }

    /// Current state machine position.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.read(|snapshot| snapshot.state)
    }

    /// The authenticated identity, if any.
    #[must_use]
    pub fn auth_user(&self) -> Option<AuthUser> {
        self.read(|snapshot| snapshot.auth_user.clone())
    }

    /// The fetched profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        self.read(|snapshot| snapshot.profile.clone())
    }

    /// Whether the signed-in user is a vendor. False whenever the profile
    /// is absent.
    #[must_use]
    pub fn is_vendor(&self) -> bool {
        self.has_role(Role::Vendor)
    }

    /// Whether the signed-in user is an admin. False whenever the profile
    /// is absent.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    fn has_role(&self, role: Role) -> bool {
        self.read(|snapshot| {
            snapshot.auth_user.is_some()
                && snapshot.profile.as_ref().is_some_and(|p| p.role == role)
        })
    }

    fn read<T>(&self, f: impl FnOnce(&SessionSnapshot) -> T) -> T {
        match self.inner.snapshot.lock() {
            Ok(snapshot) => f(&snapshot),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write(&self, f: impl FnOnce(&mut SessionSnapshot)) {
        match self.inner.snapshot.lock() {
            Ok(mut snapshot) => f(&mut snapshot),
            Err(mut poisoned) => f(poisoned.get_mut()),
        }
    }
}
