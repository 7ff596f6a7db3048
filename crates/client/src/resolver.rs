//! Product resolution: turning a bare product id into full detail.

use std::time::Duration;

use async_trait::async_trait;
use fashion_store_core::{Product, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::api::ApiClient;
use crate::error::StoreError;

/// Looks up product detail by id.
///
/// Used only to hydrate display fields; prices obtained this way are never
/// used to price an order.
#[async_trait]
pub trait ProductResolver: Send + Sync {
    /// # Errors
    ///
    /// `NotFound` when the product does not exist, `Unavailable` on transport
    /// failure.
    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError>;
}

/// Resolver backed by `GET /products/{id}`, cached for 5 minutes.
#[derive(Clone)]
pub struct HttpResolver {
    api: ApiClient,
    cache: Cache<ProductId, Product>,
}

impl HttpResolver {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        Self { api, cache }
    }
}

#[async_trait]
impl ProductResolver for HttpResolver {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        if let Some(product) = self.cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product = self.api.product(id).await?;
        self.cache.insert(id, product.clone()).await;
        Ok(product)
    }
}
