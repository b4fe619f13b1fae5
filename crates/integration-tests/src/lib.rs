//! Integration test support for the Stride cart.
//!
//! Provides in-memory fakes of the cart's collaborators so the store can be
//! exercised end to end without a catalog server or filesystem:
//!
//! - [`FakeCatalog`] - scripted product records and stock levels, with call
//!   counting and a switchable upstream-failure mode
//! - [`FailingStorage`] - storage whose writes can be made to fail, for
//!   persist-then-commit tests
//!
//! # Example
//!
//! ```rust,ignore
//! let catalog = Arc::new(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 5));
//! let storage = Arc::new(MemoryStorage::new());
//! let notifier = Arc::new(MemoryNotifier::new());
//! let store = CartStore::new(catalog, storage, notifier)?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use stride_cart::{
    CartStorage, CatalogError, CatalogProduct, MemoryStorage, ProductCatalog, StockLevel,
    StorageError,
};
use stride_core::{CurrencyCode, Price, ProductId};

/// Build a catalog record with a USD price given in cents.
#[must_use]
pub fn catalog_product(id: i64, title: &str, price_cents: i64) -> CatalogProduct {
    CatalogProduct {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Price::from_cents(price_cents, CurrencyCode::USD),
        image_url: format!("https://cdn.stride.example/shoes/{id}.jpg"),
    }
}

/// In-memory catalog with scripted products and stock levels.
#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<ProductId, CatalogProduct>>,
    stock: Mutex<HashMap<ProductId, u32>>,
    failing: AtomicBool,
    product_calls: AtomicUsize,
    stock_calls: AtomicUsize,
}

impl FakeCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product with the given stock level (builder style).
    #[must_use]
    pub fn with_product(self, id: i64, title: &str, price_cents: i64, stock: u32) -> Self {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ProductId::new(id), catalog_product(id, title, price_cents));
        self.stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ProductId::new(id), stock);
        self
    }

    /// Replace a product's stock level.
    pub fn set_stock(&self, id: i64, amount: u32) {
        self.stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(ProductId::new(id), amount);
    }

    /// Make every subsequent lookup fail, simulating an unreachable catalog.
    pub fn fail_upstream(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Number of product-record lookups served (including failures).
    #[must_use]
    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    /// Number of stock lookups served (including failures).
    #[must_use]
    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    fn check_up(&self) -> Result<(), CatalogError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::Decode(
                "scripted upstream failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        self.check_up()?;
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    async fn stock(&self, id: ProductId) -> Result<StockLevel, CatalogError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        self.check_up()?;
        self.stock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
            .map(|amount| StockLevel { id, amount })
            .ok_or(CatalogError::NotFound(id))
    }
}

/// Storage wrapper whose writes can be made to fail.
///
/// Reads always pass through, so a store can load existing state and then
/// hit a write failure mid-operation.
#[derive(Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
}

impl FailingStorage {
    /// Create a storage that behaves normally until told otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, simulating a full or disabled disk.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

impl CartStorage for FailingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("scripted write failure"),
            });
        }
        self.inner.set(key, value)
    }
}
