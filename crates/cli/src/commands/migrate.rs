//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! `crates/storefront/migrations/`, applied in filename order.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::CommandError;

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the connection fails, or a
/// migration fails to apply.
pub async fn storefront() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(database_url.expose_secret())
        .await
        .map_err(CommandError::from)?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
