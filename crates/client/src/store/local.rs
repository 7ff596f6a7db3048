//! Guest state kept in the local key/value store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use fashion_store_core::{Cart, LineId, Product, ProductId, ProductRef, Wishlist};
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::{CartLineRequest, CartStore, WishlistStore, ensure_orderable};
use crate::error::StoreError;
use crate::resolver::ProductResolver;
use crate::storage::{CART_KEY, KeyValueStore, WISHLIST_KEY, load_json, save_json};

/// Cart and wishlist for a visitor who is not signed in.
///
/// Every operation is a read-modify-write of one key, performed under an
/// internal lock so that concurrent callers cannot lose each other's updates.
pub struct LocalStore {
    kv: Arc<dyn KeyValueStore>,
    resolver: Arc<dyn ProductResolver>,
    write: Mutex<()>,
}

impl LocalStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, resolver: Arc<dyn ProductResolver>) -> Self {
        Self {
            kv,
            resolver,
            write: Mutex::new(()),
        }
    }

    async fn read_cart(&self) -> Result<Cart, StoreError> {
        Ok(load_json::<Cart>(self.kv.as_ref(), CART_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn write_cart(&self, cart: &Cart) -> Result<(), StoreError> {
        Ok(save_json(self.kv.as_ref(), CART_KEY, cart).await?)
    }

    async fn read_wishlist(&self) -> Result<Wishlist, StoreError> {
        Ok(load_json::<Wishlist>(self.kv.as_ref(), WISHLIST_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn write_wishlist(&self, wishlist: &Wishlist) -> Result<(), StoreError> {
        Ok(save_json(self.kv.as_ref(), WISHLIST_KEY, wishlist).await?)
    }

    /// Use the hint when it describes the requested product, else ask the
    /// resolver.
    async fn resolve(&self, id: ProductId, hint: Option<Product>) -> Result<Product, StoreError> {
        match hint {
            Some(product) if product.id == id => Ok(product),
            _ => self.resolver.get_product(id).await,
        }
    }

    /// Resolve every unresolved reference concurrently. A lookup that fails
    /// leaves its reference unresolved and does not affect the others.
    ///
    /// Returns whether anything was newly resolved.
    async fn hydrate<'a, I>(&self, refs: I) -> bool
    where
        I: IntoIterator<Item = &'a mut ProductRef>,
    {
        let pending: Vec<&mut ProductRef> = refs.into_iter().filter(|r| !r.is_resolved()).collect();
        if pending.is_empty() {
            return false;
        }

        let ids: Vec<ProductId> = pending.iter().map(|r| r.id()).collect();
        let results = join_all(ids.iter().map(|id| self.resolver.get_product(*id))).await;

        let mut changed = false;
        for ((slot, id), result) in pending.into_iter().zip(ids).zip(results) {
            match result {
                Ok(product) => {
                    *slot = ProductRef::Resolved(product);
                    changed = true;
                }
                Err(e) => {
                    warn!(product_id = %id, error = %e, "Could not hydrate stored product");
                }
            }
        }
        changed
    }
}

#[async_trait]
impl CartStore for LocalStore {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Cart, StoreError> {
        let _guard = self.write.lock().await;
        let mut cart = self.read_cart().await?;
        if self
            .hydrate(cart.items.iter_mut().map(|item| &mut item.product))
            .await
        {
            debug!("Persisting newly hydrated cart");
            self.write_cart(&cart).await?;
        }
        Ok(cart)
    }

    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    async fn add(&self, request: CartLineRequest) -> Result<Cart, StoreError> {
        request.validate()?;
        let _guard = self.write.lock().await;

        let product = self.resolve(request.product_id, request.hint.clone()).await?;
        ensure_orderable(&product, &request.size, &request.color)?;

        let mut cart = self.read_cart().await?;
        cart.add_line(request.into_line(product.into()), LineId::generate)?;
        self.write_cart(&cart).await?;
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn update_quantity(&self, item: LineId, quantity: i64) -> Result<Cart, StoreError> {
        let _guard = self.write.lock().await;
        let mut cart = self.read_cart().await?;
        cart.update_quantity(item, quantity)?;
        self.write_cart(&cart).await?;
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn remove(&self, item: LineId) -> Result<Cart, StoreError> {
        let _guard = self.write.lock().await;
        let mut cart = self.read_cart().await?;
        if !cart.remove_line(item) {
            return Err(StoreError::NotFound(format!("cart item {item} not found")));
        }
        self.write_cart(&cart).await?;
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<Cart, StoreError> {
        let _guard = self.write.lock().await;
        let cart = Cart::default();
        self.write_cart(&cart).await?;
        Ok(cart)
    }
}

#[async_trait]
impl WishlistStore for LocalStore {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Wishlist, StoreError> {
        let _guard = self.write.lock().await;
        let mut wishlist = self.read_wishlist().await?;
        if self
            .hydrate(wishlist.items.iter_mut().map(|item| &mut item.product))
            .await
        {
            debug!("Persisting newly hydrated wishlist");
            self.write_wishlist(&wishlist).await?;
        }
        Ok(wishlist)
    }

    #[instrument(skip(self, hint))]
    async fn add(&self, product_id: ProductId, hint: Option<Product>) -> Result<Wishlist, StoreError> {
        let _guard = self.write.lock().await;
        let mut wishlist = self.read_wishlist().await?;
        if wishlist.contains(product_id) {
            return Err(StoreError::Conflict(format!(
                "product {product_id} is already in the wishlist"
            )));
        }

        let product = self.resolve(product_id, hint).await?;
        if !product.is_active {
            return Err(StoreError::NotFound(format!("product {product_id} not found")));
        }

        wishlist.add(product.into(), LineId::generate(), Utc::now())?;
        self.write_wishlist(&wishlist).await?;
        Ok(wishlist)
    }

    #[instrument(skip(self))]
    async fn remove(&self, product_id: ProductId) -> Result<Wishlist, StoreError> {
        let _guard = self.write.lock().await;
        let mut wishlist = self.read_wishlist().await?;
        if wishlist.remove(product_id) {
            self.write_wishlist(&wishlist).await?;
        }
        Ok(wishlist)
    }
}
