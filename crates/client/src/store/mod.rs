//! Storage strategies for the cart, wishlist and orders.
//!
//! Engines only ever talk to these traits. Which implementation sits behind
//! them is decided by the session from the current identity:
//!
//! - [`LocalStore`] - guest state in the local key/value store, hydrated
//!   through a [`ProductResolver`](crate::resolver::ProductResolver)
//! - [`RemoteStore`] - the signed-in user's documents on the server

mod local;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use fashion_store_core::wire::PlaceOrderRequest;
use fashion_store_core::{
    Cart, Color, LineId, NewCartLine, Order, OrderId, Product, ProductId, ProductRef, Size, Wishlist,
};

pub use local::LocalStore;
pub use remote::RemoteStore;

use crate::error::StoreError;

/// A request to add a product variant to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: Size,
    pub color: Color,
    /// Previously fetched detail for `product_id`. Guest stores persist it
    /// instead of calling the resolver; remote stores ignore it.
    pub hint: Option<Product>,
}

impl CartLineRequest {
    /// Check quantity, size and colour without touching any store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` describing the first problem.
    pub fn validate(&self) -> Result<(), StoreError> {
        NewCartLine {
            product: self.product_id.into(),
            quantity: self.quantity,
            size: self.size.clone(),
            color: self.color.clone(),
        }
        .validate()
        .map_err(StoreError::from)
    }

    pub(crate) fn into_line(self, product: ProductRef) -> NewCartLine {
        NewCartLine {
            product,
            quantity: self.quantity,
            size: self.size,
            color: self.color,
        }
    }
}

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Current cart. An absent cart is an empty cart.
    async fn load(&self) -> Result<Cart, StoreError>;

    /// Add a line, merging into an existing `(product, size, colour)` line.
    async fn add(&self, request: CartLineRequest) -> Result<Cart, StoreError>;

    /// Set a line's quantity; `<= 0` removes the line.
    async fn update_quantity(&self, item: LineId, quantity: i64) -> Result<Cart, StoreError>;

    /// Remove a line. Signals `NotFound` when the line does not exist.
    async fn remove(&self, item: LineId) -> Result<Cart, StoreError>;

    async fn clear(&self) -> Result<Cart, StoreError>;
}

#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Current wishlist. An absent wishlist is an empty wishlist.
    async fn load(&self) -> Result<Wishlist, StoreError>;

    /// Add a product. Signals `Conflict` when it is already a member.
    async fn add(&self, product_id: ProductId, hint: Option<Product>) -> Result<Wishlist, StoreError>;

    /// Remove a product. Removing a non-member succeeds unchanged.
    async fn remove(&self, product_id: ProductId) -> Result<Wishlist, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn place(&self, request: &PlaceOrderRequest) -> Result<Order, StoreError>;
    async fn list(&self) -> Result<Vec<Order>, StoreError>;
    async fn get(&self, id: OrderId) -> Result<Order, StoreError>;
}

/// The store set an identity addresses.
#[derive(Clone)]
pub struct Stores {
    pub cart: Arc<dyn CartStore>,
    pub wishlist: Arc<dyn WishlistStore>,
    /// Guests cannot place orders.
    pub orders: Option<Arc<dyn OrderStore>>,
}

impl Stores {
    /// Guest store set: cart and wishlist from one local store, no orders.
    #[must_use]
    pub fn guest(local: Arc<LocalStore>) -> Self {
        Self {
            cart: local.clone(),
            wishlist: local,
            orders: None,
        }
    }

    /// Signed-in store set: everything goes to the server.
    #[must_use]
    pub fn remote(remote: Arc<RemoteStore>) -> Self {
        Self {
            cart: remote.clone(),
            wishlist: remote.clone(),
            orders: Some(remote),
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("orders", &self.orders.is_some())
            .finish_non_exhaustive()
    }
}

/// Whether a resolved product may be put in a cart in this size and colour.
///
/// Inactive products are reported as missing. Products that declare no
/// sizes (or colours) accept any.
pub(crate) fn ensure_orderable(product: &Product, size: &Size, color: &Color) -> Result<(), StoreError> {
    if !product.is_active {
        return Err(StoreError::NotFound(format!("product {} not found", product.id)));
    }
    if !product.offers_size(size) {
        return Err(StoreError::Validation(format!(
            "size {size} is not available for {}",
            product.name
        )));
    }
    if !product.offers_color(color) {
        return Err(StoreError::Validation(format!(
            "color {} is not available for {}",
            color.name, product.name
        )));
    }
    Ok(())
}
