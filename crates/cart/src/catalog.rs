//! Product catalog client.
//!
//! The cart validates every mutation against this read-only service: product
//! records supply display fields, stock levels gate quantity changes.
//! Product records are cached via `moka` (5-minute TTL); stock levels always
//! bypass the cache so a mutation never validates against stale data.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use stride_core::{Price, ProductId};

/// TTL for cached product records.
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Maximum number of cached product records.
const PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Errors that can occur when querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} from {url}")]
    Api { status: u16, url: String },

    /// No product or stock record exists for this identifier.
    #[error("not found: product {0}")]
    NotFound(ProductId),

    /// Failed to decode a response body.
    #[error("decode error: {0}")]
    Decode(String),
}

/// A product record as served by the catalog.
///
/// Carries no quantity - the cart owns that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Product image URL.
    pub image_url: String,
}

/// Upstream stock level for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// Catalog identifier this level belongs to.
    pub id: ProductId,
    /// Units available upstream.
    pub amount: u32,
}

/// Read-only product/stock lookups the cart validates against.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch the full product record.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, missing record, or a
    /// body that fails to decode.
    async fn product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError>;

    /// Fetch the current stock level.
    ///
    /// Implementations must not serve stale data; quantity validation relies
    /// on this being live.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, missing record, or a
    /// body that fails to decode.
    async fn stock(&self, id: ProductId) -> Result<StockLevel, CatalogError>;
}

/// HTTP catalog client.
///
/// Speaks JSON against `GET {base}/products/{id}` and `GET {base}/stock/{id}`.
/// Cheaply cloneable; clones share the product cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    /// Base URL with any trailing slash trimmed.
    base: String,
    products: Cache<ProductId, CatalogProduct>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client fails to build.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base: base_url.as_str().trim_end_matches('/').to_string(),
                products,
            }),
        })
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        id: ProductId,
    ) -> Result<T, CatalogError> {
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        if !status.is_success() {
            return Err(CatalogError::Api {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ProductCatalog for CatalogClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("cache hit for product");
            return Ok(product);
        }

        let url = format!("{}/products/{id}", self.inner.base);
        let product: CatalogProduct = self.get_json(url, id).await?;

        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<StockLevel, CatalogError> {
        // Never cached: quantity checks must see live data.
        let url = format!("{}/stock/{id}", self.inner.base);
        self.get_json(url, id).await
    }
}
