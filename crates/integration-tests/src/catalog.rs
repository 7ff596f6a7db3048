//! In-memory product catalog, usable as the client's resolver.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fashion_store_client::{ProductResolver, StoreError};
use fashion_store_core::{Product, ProductId};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

/// Products by id, with switches for simulating lookup failures.
#[derive(Debug, Default)]
pub struct Catalog {
    products: RwLock<HashMap<ProductId, Product>>,
    /// Lookups of these ids report `Unavailable`.
    failing: RwLock<HashSet<ProductId>>,
    lookups: AtomicUsize,
}

impl Catalog {
    #[must_use]
    pub fn with(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().map(|p| (p.id, p)).collect()),
            ..Self::default()
        }
    }

    /// Current row for `id`, active or not.
    pub async fn get(&self, id: ProductId) -> Option<Product> {
        self.products.read().await.get(&id).cloned()
    }

    /// Current row for `id` if it is listed.
    pub async fn get_active(&self, id: ProductId) -> Option<Product> {
        self.get(id).await.filter(|p| p.is_active)
    }

    pub async fn set_price(&self, id: ProductId, price: Decimal) {
        if let Some(product) = self.products.write().await.get_mut(&id) {
            product.price = price;
        }
    }

    pub async fn deactivate(&self, id: ProductId) {
        if let Some(product) = self.products.write().await.get_mut(&id) {
            product.is_active = false;
        }
    }

    pub async fn fail(&self, id: ProductId) {
        self.failing.write().await.insert(id);
    }

    pub async fn recover(&self, id: ProductId) {
        self.failing.write().await.remove(&id);
    }

    /// Number of resolver lookups served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductResolver for Catalog {
    async fn get_product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().await.contains(&id) {
            return Err(StoreError::Unavailable(format!("lookup of product {id} timed out")));
        }
        self.get(id)
            .await
            .ok_or_else(|| StoreError::NotFound(format!("product {id} not found")))
    }
}
