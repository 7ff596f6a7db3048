//! Back-office queries that span several tables.

use fashion_store_core::AdminStats;
use sqlx::PgPool;
use tracing::instrument;

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;

/// Orders shown on the dashboard.
pub const RECENT_ORDERS: i64 = 10;

pub struct AdminService<'a> {
    users: UserRepository<'a>,
    products: ProductRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            products: ProductRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Dashboard counters and the newest orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<AdminStats, RepositoryError> {
        let (total_users, total_products, (total_orders, total_revenue), recent_orders) = tokio::try_join!(
            self.users.count_customers(),
            self.products.count_active(),
            self.orders.totals(),
            self.orders.list_all(Some(RECENT_ORDERS)),
        )?;

        Ok(AdminStats {
            total_users,
            total_products,
            total_orders,
            total_revenue,
            recent_orders,
        })
    }
}
