//! Bearer token maintenance.

use fashion_store_storefront::db::{self, tokens::TokenRepository};

use super::CommandError;

/// Delete every API token past its expiry.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn prune() -> Result<(), CommandError> {
    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let removed = TokenRepository::new(&pool).delete_expired().await?;
    tracing::info!(removed, "Expired tokens pruned");
    Ok(())
}
