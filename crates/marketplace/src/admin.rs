//! Admin vendor verification.
//!
//! Admins review newly registered vendors and flip them to verified. The
//! write goes through the backend seam and the catalog's vendor join cache
//! is invalidated so the verified badge shows up on the next reload. The
//! role check happens here as well as server-side; the container must
//! never issue the write for a non-admin session.

use std::sync::Arc;

use tracing::instrument;

use sokocamp_core::{VendorId, VendorStatus};

use crate::backend::{Backend, BackendError};
use crate::catalog::CatalogService;
use crate::session::SessionContainer;

/// Failures of the admin surface.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// The current session does not carry the admin role.
    #[error("not authorized: admin role required")]
    NotAuthorized,

    /// The vendor status write failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Admin operations, gated on the session's role.
///
/// Cheaply cloneable; all clones share the backend and session handles.
#[derive(Clone)]
pub struct AdminService<B> {
    inner: Arc<AdminInner<B>>,
}

struct AdminInner<B> {
    backend: Arc<B>,
    session: SessionContainer<B>,
    catalog: CatalogService<B>,
}

impl<B: Backend> AdminService<B> {
    /// Create an admin service over the shared session and catalog.
    #[must_use]
    pub fn new(
        backend: Arc<B>,
        session: SessionContainer<B>,
        catalog: CatalogService<B>,
    ) -> Self {
        Self {
            inner: Arc::new(AdminInner {
                backend,
                session,
                catalog,
            }),
        }
    }

    /// Mark a vendor as verified.
    ///
    /// Requires an authenticated admin session. On success the vendor's
    /// join-cache entry is dropped so the verified badge appears on the
    /// next catalog load.
    ///
    /// # Errors
    ///
    /// [`AdminError::NotAuthorized`] when the session is not an admin;
    /// otherwise the backend write failure.
    #[instrument(skip(self))]
    pub async fn verify_vendor(&self, id: &VendorId) -> Result<(), AdminError> {
        if !self.inner.session.is_admin() {
            return Err(AdminError::NotAuthorized);
        }

        self.inner
            .backend
            .update_vendor_status(id, VendorStatus::Verified)
            .await?;
        self.inner.catalog.invalidate_vendor(id).await;
        tracing::info!(vendor = %id, "vendor verified");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::backend::{ProductRecord, ProfileRecord, VendorRecord};
    use crate::bus::EventBus;
    use crate::checkout::Order;
    use crate::session::AuthUser;
    use crate::storage::MemoryStore;
    use sokocamp_core::{Role, UserId};

    struct FakeBackend {
        role: Role,
        status_writes: Mutex<Vec<(VendorId, VendorStatus)>>,
    }

    impl FakeBackend {
        fn new(role: Role) -> Self {
            Self {
                role,
                status_writes: Mutex::new(Vec::new()),
            }
        }
    }

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

        async fn fetch_profile(&self, _id: &UserId) -> Result<ProfileRecord, BackendError> {
            Ok(ProfileRecord {
                name: "Juma".to_owned(),
                role: self.role,
                favorites: Vec::new(),
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
            id: &VendorId,
            status: VendorStatus,
        ) -> Result<(), BackendError> {
            self.status_writes
                .lock()
                .unwrap()
                .push((id.clone(), status));
            Ok(())
        }
    }

    fn service(
        role: Role,
    ) -> (
        Arc<FakeBackend>,
        AdminService<FakeBackend>,
        SessionContainer<FakeBackend>,
    ) {
        let backend = Arc::new(FakeBackend::new(role));
        let session = SessionContainer::new(
            backend.clone(),
            Arc::new(MemoryStore::new()),
            EventBus::new(),
        );
        let catalog = CatalogService::new(backend.clone());
        let admin = AdminService::new(backend.clone(), session.clone(), catalog);
        (backend, admin, session)
    }

    async fn sign_in<B: Backend>(session: &SessionContainer<B>) {
        session
            .handle_auth_change(Some(AuthUser {
                uid: UserId::new("user-1"),
                email: None,
            }))
            .await;
    }

    #[tokio::test]
    async fn test_admin_can_verify_vendor() {
        let (backend, admin, session) = service(Role::Admin);
        sign_in(&session).await;

        admin.verify_vendor(&VendorId::new("vend-1")).await.unwrap();

        let writes = backend.status_writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, VendorId::new("vend-1"));
        assert_eq!(writes[0].1, VendorStatus::Verified);
    }

    #[tokio::test]
    async fn test_non_admin_is_rejected_before_any_write() {
        let (backend, admin, session) = service(Role::Vendor);
        sign_in(&session).await;

        let err = admin.verify_vendor(&VendorId::new("vend-1")).await;
        assert!(matches!(err, Err(AdminError::NotAuthorized)));
        assert!(backend.status_writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signed_out_session_is_rejected() {
        let (backend, admin, _session) = service(Role::Admin);

        let err = admin.verify_vendor(&VendorId::new("vend-1")).await;
        assert!(matches!(err, Err(AdminError::NotAuthorized)));
        assert!(backend.status_writes.lock().unwrap().is_empty());
    }
}
