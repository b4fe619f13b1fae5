//! Stride Cart - catalog-validated shopping cart state container.
//!
//! [`store::CartStore`] holds the authoritative list of `{product, quantity}`
//! entries for the current session. Every mutation is validated against live
//! stock levels from the product catalog and persisted to a durable key-value
//! store before it is committed in memory, so the persisted blob and the
//! in-memory list never diverge.
//!
//! # Architecture
//!
//! The store's collaborators sit behind trait seams and are injected at the
//! composition root - no hidden global state:
//!
//! - [`catalog::ProductCatalog`] - read-only product/stock lookups
//!   ([`catalog::CatalogClient`] is the HTTP implementation)
//! - [`storage::CartStorage`] - synchronous single-key blob storage
//!   ([`storage::FileStorage`] for durable runs, [`storage::MemoryStorage`]
//!   for tests)
//! - [`notify::Notifier`] - the transient user-visible error channel
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stride_cart::{CartConfig, CartStore, CatalogClient, FileStorage, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let catalog = CatalogClient::new(&config.catalog_url, config.http_timeout)?;
//! let storage = FileStorage::new(&config.storage_dir)?;
//! let store = CartStore::new(Arc::new(catalog), Arc::new(storage), Arc::new(TracingNotifier))?;
//!
//! store.add_product(ProductId::new(1)).await?;
//! println!("{} item(s) in cart", store.cart().len());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use catalog::{CatalogClient, CatalogError, CatalogProduct, ProductCatalog, StockLevel};
pub use config::{CartConfig, ConfigError};
pub use error::CartError;
pub use notify::{MemoryNotifier, Notifier, TracingNotifier};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CART_STORAGE_KEY, CartItem, CartStore};
