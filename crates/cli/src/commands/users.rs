//! Account role management.

use fashion_store_core::{Email, UserRole};
use fashion_store_storefront::db::{self, RepositoryError, users::UserRepository};
use tracing::info;

use super::CommandError;

/// Give an existing account the admin role (or take it away).
///
/// # Errors
///
/// Returns an error if the email does not parse, no account has it, or the
/// database is unreachable.
pub async fn set_role(email: &str, role: UserRole) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;
    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let user = UserRepository::new(&pool)
        .set_role(&email, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::InvalidArgument(format!("no account for {email}")),
            other => other.into(),
        })?;

    info!(user_id = %user.id, email = %user.email, role = user.role.as_str(), "Role updated");
    Ok(())
}
