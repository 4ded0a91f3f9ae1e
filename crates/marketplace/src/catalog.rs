//! Catalog loader and filter/sort/paginate pipeline.
//!
//! The product collection is fetched whole, enriched with vendor display
//! fields, and held as an in-memory snapshot; every multi-field filter,
//! sort, and pagination window is derived client-side from that snapshot.
//! The backend is only ever asked for flat collections and single
//! documents.
//!
//! Pagination is a cumulative window: "load more" grows the visible prefix
//! of the filtered/sorted result rather than replacing it. Changing the
//! search term, category, or sort key re-derives from scratch and resets
//! the window to page one, so stale deeper pages are never shown against a
//! new query.

use std::cmp::Reverse;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use moka::future::Cache;
use rust_decimal::Decimal;
use tracing::instrument;

use sokocamp_core::{Price, ProductId, VendorId, VendorStatus};

use crate::backend::{Backend, ProductRecord, VendorRecord};

/// Vendor display name used when the vendor document is missing.
const FALLBACK_VENDOR_NAME: &str = "Vendor";
/// Avatar used when the vendor has no profile image.
const FALLBACK_VENDOR_IMAGE: &str = "/default-avatar.png";

/// Vendor documents change rarely; cache the join inputs across reloads.
const VENDOR_CACHE_CAPACITY: u64 = 1_000;

/// A product enriched with vendor display fields, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub original_price: Option<Price>,
    pub stock: u32,
    pub category: Option<String>,
    pub images: Vec<String>,
    pub rating: Option<Decimal>,
    pub vendor_id: VendorId,
    pub created_at: Option<DateTime<Utc>>,
    // Joined from the vendor document at fetch time, not stored with the
    // product.
    pub vendor_name: String,
    pub vendor_profile_image: String,
    pub is_verified: bool,
}

impl CatalogProduct {
    fn join(record: ProductRecord, vendor: Option<&VendorRecord>) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            price: record.price,
            original_price: record.original_price,
            stock: record.stock,
            category: record.category,
            images: record.images,
            rating: record.rating,
            vendor_id: record.vendor_id,
            created_at: record.created_at,
            vendor_name: vendor
                .map_or_else(|| FALLBACK_VENDOR_NAME.to_owned(), |v| v.business_name.clone()),
            vendor_profile_image: vendor
                .and_then(|v| v.profile_image.clone())
                .unwrap_or_else(|| FALLBACK_VENDOR_IMAGE.to_owned()),
            is_verified: vendor.is_some_and(|v| v.status == VendorStatus::Verified),
        }
    }

    #[cfg(test)]
    pub(crate) fn test_fixture(id: &str, price: i64) -> Self {
        Self {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_shillings(price),
            original_price: None,
            stock: 10,
            category: None,
            images: Vec::new(),
            rating: None,
            vendor_id: VendorId::new("vend-1"),
            created_at: None,
            vendor_name: FALLBACK_VENDOR_NAME.to_owned(),
            vendor_profile_image: FALLBACK_VENDOR_IMAGE.to_owned(),
            is_verified: false,
        }
    }
}

/// Comparator key for the sort stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Descending by creation timestamp; missing timestamps sort as epoch.
    #[default]
    Newest,
    /// Ascending by price; missing price treated as zero.
    PriceLow,
    /// Descending by price; missing price treated as zero.
    PriceHigh,
    /// Descending by rating; missing rating treated as zero.
    Rating,
}

impl SortKey {
    /// Parse the sort selector value used by the UI.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "newest" => Some(Self::Newest),
            "price-low" => Some(Self::PriceLow),
            "price-high" => Some(Self::PriceHigh),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }
}

/// Keep products whose name OR description contains `search_term`
/// (case-insensitive) AND whose category matches `category` exactly
/// (case-insensitive). An empty term or category matches everything on
/// that dimension.
#[must_use]
pub fn filter_products(
    snapshot: &[CatalogProduct],
    search_term: &str,
    category: &str,
) -> Vec<CatalogProduct> {
    let term = search_term.to_lowercase();
    let category = category.to_lowercase();

    snapshot
        .iter()
        .filter(|product| {
            let matches_search = term.is_empty()
                || product.name.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term);
            let matches_category = category.is_empty()
                || product
                    .category
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase() == category);
            matches_search && matches_category
        })
        .cloned()
        .collect()
}

/// Sort a filtered result. Stable: ties preserve prior relative order.
#[must_use]
pub fn sort_products(mut filtered: Vec<CatalogProduct>, key: SortKey) -> Vec<CatalogProduct> {
    match key {
        SortKey::Newest => filtered.sort_by_key(|p| {
            Reverse(p.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
        }),
        SortKey::PriceLow => filtered.sort_by_key(|p| p.price),
        SortKey::PriceHigh => filtered.sort_by_key(|p| Reverse(p.price)),
        SortKey::Rating => {
            filtered.sort_by_key(|p| Reverse(p.rating.unwrap_or(Decimal::ZERO)));
        }
    }
    filtered
}

/// Cumulative pagination window: the first `page * page_size` items.
#[must_use]
pub fn window(sorted: &[CatalogProduct], page_size: usize, page: usize) -> Vec<CatalogProduct> {
    let visible = page.saturating_mul(page_size);
    sorted.iter().take(visible).cloned().collect()
}

/// Loads the catalog snapshot and joins vendor display fields.
///
/// Cheaply cloneable; all clones share the snapshot.
pub struct CatalogService<B> {
    inner: Arc<CatalogInner<B>>,
}

impl<B> Clone for CatalogService<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CatalogInner<B> {
    backend: Arc<B>,
    vendors: Cache<VendorId, VendorRecord>,
    snapshot: Mutex<Vec<CatalogProduct>>,
}

impl<B: Backend> CatalogService<B> {
    /// Create a service with an empty snapshot.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                backend,
                vendors: Cache::new(VENDOR_CACHE_CAPACITY),
                snapshot: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Fetch the entire product collection and swap the snapshot.
    ///
    /// Failures are logged and leave the prior snapshot (or empty) in
    /// place; availability is preferred over correctness-under-failure.
    /// Loads are idempotent and may be re-issued without coordination.
    #[instrument(skip(self))]
    pub async fn load_all(&self) {
        let records = match self.inner.backend.fetch_products().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("failed to load product catalog: {e}");
                return;
            }
        };

        let mut joined = Vec::with_capacity(records.len());
        for record in records {
            let vendor = self.vendor(&record.vendor_id).await;
            joined.push(CatalogProduct::join(record, vendor.as_ref()));
        }

        tracing::debug!(products = joined.len(), "catalog snapshot refreshed");
        if let Ok(mut snapshot) = self.inner.snapshot.lock() {
            *snapshot = joined;
        }
    }

    /// Look up a vendor document through the join cache.
    ///
    /// A missing or unreachable vendor yields `None`; the join falls back
    /// to placeholder display fields rather than dropping the product.
    async fn vendor(&self, id: &VendorId) -> Option<VendorRecord> {
        let backend = Arc::clone(&self.inner.backend);
        let vendor_id = id.clone();
        self.inner
            .vendors
            .try_get_with(id.clone(), async move { backend.fetch_vendor(&vendor_id).await })
            .await
            .map_err(|e| tracing::warn!(vendor = %id, "vendor join lookup failed: {e}"))
            .ok()
    }

    /// Clone of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CatalogProduct> {
        self.inner
            .snapshot
            .lock()
            .map(|snapshot| snapshot.clone())
            .unwrap_or_default()
    }

    /// Start a listing over the current snapshot.
    #[must_use]
    pub fn listing(&self, page_size: usize) -> ProductListing {
        ProductListing::new(self.snapshot(), page_size)
    }

    /// Drop a vendor from the join cache. The next `load_all` re-fetches
    /// the vendor document, so status changes show up in the join.
    pub async fn invalidate_vendor(&self, id: &VendorId) {
        self.inner.vendors.invalidate(id).await;
    }
}

/// Query state over a catalog snapshot: search, category, sort, and the
/// cumulative pagination window.
#[derive(Debug, Clone)]
pub struct ProductListing {
    snapshot: Vec<CatalogProduct>,
    search_term: String,
    category: String,
    sort: SortKey,
    page: usize,
    page_size: usize,
}

impl ProductListing {
    /// Create a listing showing the first page of the unfiltered snapshot.
    #[must_use]
    pub fn new(snapshot: Vec<CatalogProduct>, page_size: usize) -> Self {
        Self {
            snapshot,
            search_term: String::new(),
            category: String::new(),
            sort: SortKey::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Change the search term. Resets the window to page one.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page = 1;
    }

    /// Change the category filter. Resets the window to page one.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.page = 1;
    }

    /// Change the sort key. The listing re-derives in full, so the window
    /// also resets; a window computed against a previous ordering is never
    /// shown.
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.page = 1;
    }

    /// Grow the visible window by one page.
    pub fn load_more(&mut self) {
        self.page += 1;
    }

    /// The currently visible items: filter, sort, then the cumulative
    /// window, re-derived on every call.
    #[must_use]
    pub fn visible(&self) -> Vec<CatalogProduct> {
        let filtered = filter_products(&self.snapshot, &self.search_term, &self.category);
        let sorted = sort_products(filtered, self.sort);
        window(&sorted, self.page_size, self.page)
    }

    /// Total number of items matching the current filter, across all pages.
    #[must_use]
    pub fn total_matches(&self) -> usize {
        filter_products(&self.snapshot, &self.search_term, &self.category).len()
    }

    /// Whether another `load_more` would reveal more items.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page.saturating_mul(self.page_size) < self.total_matches()
    }
}
