//! Checkout and order history.
//!
//! Orders are priced from the product rows at the time of checkout. The
//! cart document is read under a row lock, so the order and the emptied
//! cart commit together or not at all.

use fashion_store_core::wire::PlaceOrderRequest;
use fashion_store_core::{Cart, Order, OrderId, OrderLine, UserProfile, UserRole, price_lines};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use super::CartServiceError;
use super::catalog::active_products;
use crate::db::RepositoryError;
use crate::db::documents::{self, DocumentKind};
use crate::db::orders::{self, NewOrder, OrderRepository};
use crate::db::products::ProductRepository;

pub struct OrderService<'a> {
    pool: &'a PgPool,
    products: ProductRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            products: ProductRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Turn the user's cart into an order and empty the cart.
    ///
    /// # Errors
    ///
    /// `EmptyCart` for an empty cart, `Invalid` for an incomplete address,
    /// `ProductNotFound` if a line's product is gone or inactive.
    #[instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn place(&self, user: &UserProfile, request: PlaceOrderRequest) -> Result<Order, CartServiceError> {
        request.shipping_address.validate()?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let current = documents::load_for_update::<Cart>(&mut tx, user.id, DocumentKind::Cart).await?;
        let cart = current.value;
        if cart.is_empty() {
            return Err(CartServiceError::EmptyCart);
        }

        let ids = cart.items.iter().map(|item| item.product.id()).collect();
        let catalog = active_products(&self.products, ids).await?;
        let lines = cart
            .items
            .iter()
            .map(|item| {
                let id = item.product.id();
                catalog
                    .get(&id)
                    .map(|product| OrderLine::priced(item, product))
                    .ok_or(CartServiceError::ProductNotFound(id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let order = orders::insert(
            &mut *tx,
            NewOrder {
                user_id: user.id,
                items: &lines,
                shipping_address: &request.shipping_address,
                payment_method: request.payment_method,
                totals: price_lines(&lines),
            },
        )
        .await?;

        let cleared = documents::compare_and_swap(
            &mut *tx,
            user.id,
            DocumentKind::Cart,
            &Cart::default(),
            current.version,
        )
        .await?;
        if cleared.is_none() {
            warn!("Cart changed during checkout despite the row lock");
            return Err(CartServiceError::Contention);
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        info!(order_id = %order.id, total = %order.total_price, lines = order.items.len(), "Order placed");
        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError` on database failure.
    pub async fn list(&self, user: &UserProfile) -> Result<Vec<Order>, RepositoryError> {
        self.orders.list_for_user(user.id).await
    }

    /// An order the user may read: their own, or any for an admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on database failure.
    pub async fn get(&self, user: &UserProfile, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = self.orders.get(id).await?;
        Ok(order.filter(|o| o.user_id == user.id || user.role == UserRole::Admin))
    }
}
