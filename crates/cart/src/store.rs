//! Cart state container.
//!
//! [`CartStore`] holds the authoritative list of `{product, quantity}`
//! entries for the current session. Each mutation runs as an atomic
//! read-validate-persist-commit transaction: the candidate list is written to
//! storage first and replaces the in-memory list only once the write
//! succeeds, so the persisted blob and the in-memory cart never diverge.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};

use stride_core::{Price, ProductId};

use crate::catalog::{CatalogProduct, ProductCatalog};
use crate::error::CartError;
use crate::notify::Notifier;
use crate::storage::CartStorage;

/// Fixed storage key for the serialized cart blob.
pub const CART_STORAGE_KEY: &str = "stride:cart";

/// User-facing message for quantity-versus-stock violations.
const MSG_OUT_OF_STOCK: &str = "Requested quantity is out of stock";

/// A product entry in the cart: catalog display fields plus the quantity
/// currently held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display title, as fetched when the entry was added.
    pub title: String,
    /// Unit price, as fetched when the entry was added.
    pub price: Price,
    /// Product image URL.
    pub image_url: String,
    /// Quantity in the cart (always >= 1).
    pub amount: u32,
}

impl CartItem {
    /// Build an entry from a catalog record.
    #[must_use]
    pub fn new(product: CatalogProduct, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image_url: product.image_url,
            amount,
        }
    }
}

/// Shared, cheaply cloneable cart handle.
///
/// Construct one per session at the composition root, injecting the catalog,
/// storage, and notifier seams, then clone the handle wherever cart access is
/// needed. Mutations are serialized internally by a single-writer lock, so
/// interleaved calls from separate tasks cannot lose updates.
///
/// Every failed operation surfaces exactly one message through the injected
/// [`Notifier`] before returning. The returned [`CartError`] is for the
/// composition root (exit codes, logs) and needs no further display.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    catalog: Arc<dyn ProductCatalog>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
    /// Committed cart state, readable without awaiting.
    items: RwLock<Vec<CartItem>>,
    /// Serializes the read-validate-persist-commit sequence.
    write_lock: tokio::sync::Mutex<()>,
}

impl CartStore {
    /// Create a store, loading the persisted cart if one exists.
    ///
    /// An absent blob yields an empty cart. A blob that fails to decode also
    /// yields an empty cart (with a warning) rather than refusing to start.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the storage backend cannot be read.
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CartError> {
        let items = match storage.get(CART_STORAGE_KEY)? {
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "stored cart blob failed to decode, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                catalog,
                storage,
                notifier,
                items: RwLock::new(items),
                write_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// Snapshot of the current cart contents, in insertion order.
    ///
    /// A clone, not a live reference; mutating it has no effect on the store.
    #[must_use]
    pub fn cart(&self) -> Vec<CartItem> {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Add one unit of a product to the cart.
    ///
    /// Increments the entry's quantity if the product is already present,
    /// otherwise fetches the product record and appends an entry with
    /// quantity 1. The candidate quantity is validated against live stock
    /// first; on any failure nothing is mutated or persisted.
    ///
    /// # Errors
    ///
    /// `StockExceeded` if the candidate quantity is not in stock, `Catalog`
    /// if a lookup fails, `Storage`/`Encode` if persistence fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let _guard = self.inner.write_lock.lock().await;

        let result = self.try_add(product_id).await;
        if let Err(e) = &result {
            self.report(e, "Error adding product");
        }
        result
    }

    /// Remove a product's entry from the cart.
    ///
    /// Requires no catalog lookup; removal never fails due to stock.
    ///
    /// # Errors
    ///
    /// `ProductNotFound` if no entry matches, `Storage`/`Encode` if
    /// persistence fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        let _guard = self.inner.write_lock.lock().await;

        let result = self.try_remove(product_id);
        if let Err(e) = &result {
            self.report(e, "Error removing product");
        }
        result
    }

    /// Set a product's quantity to exactly `amount`.
    ///
    /// `amount` must be at least 1 and within live stock, and the entry must
    /// already exist - quantity updates never create entries, that is
    /// [`add_product`](Self::add_product)'s job.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` if `amount < 1`, `StockExceeded` if not in stock,
    /// `ProductNotFound` if no entry matches, `Catalog` if the stock lookup
    /// fails, `Storage`/`Encode` if persistence fails.
    #[instrument(skip(self), fields(product_id = %product_id, amount))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: u32,
    ) -> Result<(), CartError> {
        let _guard = self.inner.write_lock.lock().await;

        let result = self.try_update(product_id, amount).await;
        if let Err(e) = &result {
            self.report(e, "Error updating product quantity");
        }
        result
    }

    async fn try_add(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut candidate = self.cart();
        let position = candidate.iter().position(|item| item.id == product_id);
        let requested = position
            .and_then(|idx| candidate.get(idx))
            .map_or(1, |item| item.amount.saturating_add(1));

        let stock = self.inner.catalog.stock(product_id).await?;
        if requested > stock.amount {
            return Err(CartError::StockExceeded {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        if let Some(item) = position.and_then(|idx| candidate.get_mut(idx)) {
            item.amount = requested;
        } else {
            let product = self.inner.catalog.product(product_id).await?;
            candidate.push(CartItem::new(product, 1));
        }

        self.commit(candidate)
    }

    fn try_remove(&self, product_id: ProductId) -> Result<(), CartError> {
        let mut candidate = self.cart();
        let before = candidate.len();
        candidate.retain(|item| item.id != product_id);
        if candidate.len() == before {
            return Err(CartError::ProductNotFound(product_id));
        }

        self.commit(candidate)
    }

    async fn try_update(&self, product_id: ProductId, amount: u32) -> Result<(), CartError> {
        if amount == 0 {
            return Err(CartError::InvalidAmount(amount));
        }

        let stock = self.inner.catalog.stock(product_id).await?;
        if amount > stock.amount {
            return Err(CartError::StockExceeded {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        let mut candidate = self.cart();
        let Some(item) = candidate.iter_mut().find(|item| item.id == product_id) else {
            return Err(CartError::ProductNotFound(product_id));
        };
        item.amount = amount;

        self.commit(candidate)
    }

    /// Persist the candidate list, then make it the committed state.
    ///
    /// Storage is written first; a failed write leaves both the blob and the
    /// in-memory list at the old value.
    fn commit(&self, candidate: Vec<CartItem>) -> Result<(), CartError> {
        let blob = serde_json::to_string(&candidate)?;
        self.inner.storage.set(CART_STORAGE_KEY, &blob)?;

        *self
            .inner
            .items
            .write()
            .unwrap_or_else(PoisonError::into_inner) = candidate;
        Ok(())
    }

    /// Surface exactly one user-facing message for a failed operation.
    ///
    /// Stock violations get their own message; everything else collapses to
    /// the per-operation fallback, with the detail kept in the log.
    fn report(&self, error: &CartError, fallback: &str) {
        match error {
            CartError::StockExceeded { .. }
            | CartError::ProductNotFound(_)
            | CartError::InvalidAmount(_) => {
                warn!(error = %error, "cart operation rejected");
            }
            CartError::Catalog(_) | CartError::Encode(_) | CartError::Storage(_) => {
                error!(error = %error, "cart operation failed");
            }
        }

        let message = match error {
            CartError::StockExceeded { .. } => MSG_OUT_OF_STOCK,
            _ => fallback,
        };
        self.inner.notifier.error(message);
    }
}
