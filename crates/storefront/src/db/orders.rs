//! Order repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;

use fashion_store_core::{
    Order, OrderId, OrderLine, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress, Totals,
    UserId,
};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    items: Json<Vec<OrderLine>>,
    shipping_address: Json<ShippingAddress>,
    payment_method: String,
    payment_status: String,
    status: String,
    items_price: Decimal,
    shipping_price: Decimal,
    tax_price: Decimal,
    total_price: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let corrupt = |e: fashion_store_core::UnknownVariant| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
        };
        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            payment_method: row.payment_method.parse::<PaymentMethod>().map_err(corrupt)?,
            payment_status: row.payment_status.parse::<PaymentStatus>().map_err(corrupt)?,
            status: row.status.parse::<OrderStatus>().map_err(corrupt)?,
            items: row.items.0,
            shipping_address: row.shipping_address.0,
            items_price: row.items_price,
            shipping_price: row.shipping_price,
            tax_price: row.tax_price,
            total_price: row.total_price,
            created_at: row.created_at,
        })
    }
}

/// Everything needed to record an order.
pub struct NewOrder<'o> {
    pub user_id: UserId,
    pub items: &'o [OrderLine],
    pub shipping_address: &'o ShippingAddress,
    pub payment_method: PaymentMethod,
    pub totals: Totals,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, items, shipping_address, payment_method, payment_status,
                   status, items_price, shipping_price, tax_price, total_price, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, items, shipping_address, payment_method, payment_status,
                   status, items_price, shipping_price, tax_price, total_price, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Every order, newest first, optionally capped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self, limit: Option<i64>) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, items, shipping_address, payment_method, payment_status,
                   status, items_price, shipping_price, tax_price, total_price, created_at
            FROM orders
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Order count and revenue. Cancelled orders count as orders but earn
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<(i64, Decimal), RepositoryError> {
        let totals: (i64, Decimal) = sqlx::query_as(
            r"
            SELECT COUNT(*),
                   COALESCE(SUM(total_price) FILTER (WHERE status <> $1), 0)
            FROM orders
            ",
        )
        .bind(OrderStatus::Cancelled.as_str())
        .fetch_one(self.pool)
        .await?;
        Ok(totals)
    }

    /// Move an order to `next` if its current status allows it. The row is
    /// locked so two admins cannot race each other past a final state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown order and
    /// `RepositoryError::Conflict` if the order is already final.
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: OrderId, next: OrderStatus) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: String = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let current = current
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(format!("order {id}: {e}")))?;
        if !current.can_become(next) {
            return Err(RepositoryError::Conflict(format!(
                "order is already {current} and cannot become {next}"
            )));
        }

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            UPDATE orders
            SET status = $2
            WHERE id = $1
            RETURNING id, user_id, items, shipping_address, payment_method, payment_status,
                      status, items_price, shipping_price, tax_price, total_price, created_at
            ",
        )
        .bind(id)
        .bind(next.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Order::try_from(row)
    }
}

/// Record an order. Usable from the checkout transaction.
pub(crate) async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    order: NewOrder<'_>,
) -> Result<Order, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(
        r"
        INSERT INTO orders (user_id, items, shipping_address, payment_method, payment_status,
                            status, items_price, shipping_price, tax_price, total_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, user_id, items, shipping_address, payment_method, payment_status,
                  status, items_price, shipping_price, tax_price, total_price, created_at
        ",
    )
    .bind(order.user_id)
    .bind(Json(order.items))
    .bind(Json(order.shipping_address))
    .bind(order.payment_method.as_str())
    .bind(order.payment_method.initial_status().as_str())
    .bind(OrderStatus::default().as_str())
    .bind(order.totals.subtotal)
    .bind(order.totals.shipping)
    .bind(order.totals.tax)
    .bind(order.totals.total)
    .fetch_one(executor)
    .await?;

    Order::try_from(row)
}
