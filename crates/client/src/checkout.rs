//! Order placement and history.

use std::sync::Arc;

use fashion_store_core::wire::PlaceOrderRequest;
use fashion_store_core::{Order, OrderId, PaymentMethod, ShippingAddress};
use tracing::{info, instrument};

use crate::engine::CartEngine;
use crate::error::StoreError;
use crate::session::Session;
use crate::store::OrderStore;

/// Turns the current cart into an order.
///
/// The server prices the order from its own product rows and empties the
/// cart; nothing the client has cached is trusted for the amounts.
pub struct Checkout {
    session: Session,
    cart: Arc<CartEngine>,
}

impl Checkout {
    #[must_use]
    pub const fn new(session: Session, cart: Arc<CartEngine>) -> Self {
        Self { session, cart }
    }

    /// # Errors
    ///
    /// `Validation` for an empty cart or an incomplete address,
    /// `Unauthorized` for guests, otherwise whatever the server reports.
    #[instrument(skip(self, shipping_address))]
    pub async fn place_order(
        &self,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Result<Order, StoreError> {
        let cart = self.cart.get_cart().await?;
        if cart.is_empty() {
            return Err(StoreError::Validation("cart is empty".to_string()));
        }
        shipping_address.validate()?;

        let ctx = self.session.context().await;
        let orders = orders_of(ctx.stores.orders)?;

        let request = PlaceOrderRequest {
            shipping_address,
            payment_method,
        };
        match orders.place(&request).await {
            Ok(order) => {
                info!(order_id = %order.id, total = %order.total_price, "Order placed");
                self.cart.mark_cleared().await;
                Ok(order)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.session.expire(ctx.epoch).await;
                }
                Err(e)
            }
        }
    }

    /// The signed-in user's orders.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for guests, otherwise whatever the server reports.
    pub async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let ctx = self.session.context().await;
        orders_of(ctx.stores.orders)?.list().await
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown order or one belonging to someone else.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, StoreError> {
        let ctx = self.session.context().await;
        orders_of(ctx.stores.orders)?.get(id).await
    }
}

fn orders_of(store: Option<Arc<dyn OrderStore>>) -> Result<Arc<dyn OrderStore>, StoreError> {
    store.ok_or_else(|| StoreError::Unauthorized("sign in to place and view orders".to_string()))
}
