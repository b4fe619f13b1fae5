//! Cart operation errors.
//!
//! Every failed operation maps to exactly one of these variants. The store
//! converts the variant into a single user-visible notification at the
//! operation boundary; the error itself is returned for the composition root
//! (exit codes, logs) and carries no obligation to display anything further.

use thiserror::Error;

use stride_core::ProductId;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Errors produced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds the upstream stock level.
    #[error("stock exceeded for product {product_id}: requested {requested}, available {available}")]
    StockExceeded {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// No cart entry exists for this product.
    #[error("product {0} is not in the cart")]
    ProductNotFound(ProductId),

    /// Target quantity is below the minimum of 1.
    #[error("invalid quantity: {0}")]
    InvalidAmount(u32),

    /// Catalog lookup failed (transport, not-found, decode).
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Serializing the cart for persistence failed.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Persistence read or write failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
