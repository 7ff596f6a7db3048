//! The signed-in user's cart, wishlist and orders, held by the server.

use async_trait::async_trait;
use fashion_store_core::wire::{AddToCartRequest, PlaceOrderRequest};
use fashion_store_core::{Cart, LineId, Order, OrderId, Product, ProductId, Wishlist};
use secrecy::SecretString;

use super::{CartLineRequest, CartStore, OrderStore, WishlistStore};
use crate::api::ApiClient;
use crate::error::StoreError;

/// Store addressing the storefront API with a bearer token.
///
/// The server is the source of truth: product hints are never sent, merge
/// and delete-on-zero rules are applied server side, and every call returns
/// the document as the server persisted it.
pub struct RemoteStore {
    api: ApiClient,
    token: SecretString,
}

impl RemoteStore {
    #[must_use]
    pub const fn new(api: ApiClient, token: SecretString) -> Self {
        Self { api, token }
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("api", &self.api)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl CartStore for RemoteStore {
    async fn load(&self) -> Result<Cart, StoreError> {
        self.api.cart(&self.token).await
    }

    async fn add(&self, request: CartLineRequest) -> Result<Cart, StoreError> {
        let body = AddToCartRequest {
            product_id: request.product_id,
            quantity: request.quantity,
            size: request.size,
            color: request.color,
        };
        self.api.add_to_cart(&self.token, &body).await
    }

    async fn update_quantity(&self, item: LineId, quantity: i64) -> Result<Cart, StoreError> {
        self.api.update_cart_item(&self.token, item, quantity).await
    }

    async fn remove(&self, item: LineId) -> Result<Cart, StoreError> {
        self.api.remove_cart_item(&self.token, item).await
    }

    async fn clear(&self) -> Result<Cart, StoreError> {
        self.api.clear_cart(&self.token).await
    }
}

#[async_trait]
impl WishlistStore for RemoteStore {
    async fn load(&self) -> Result<Wishlist, StoreError> {
        self.api.wishlist(&self.token).await
    }

    async fn add(&self, product_id: ProductId, _hint: Option<Product>) -> Result<Wishlist, StoreError> {
        self.api.add_to_wishlist(&self.token, product_id).await
    }

    async fn remove(&self, product_id: ProductId) -> Result<Wishlist, StoreError> {
        self.api.remove_from_wishlist(&self.token, product_id).await
    }
}

#[async_trait]
impl OrderStore for RemoteStore {
    async fn place(&self, request: &PlaceOrderRequest) -> Result<Order, StoreError> {
        self.api.place_order(&self.token, request).await
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        self.api.orders(&self.token).await
    }

    async fn get(&self, id: OrderId) -> Result<Order, StoreError> {
        self.api.order(&self.token, id).await
    }
}
