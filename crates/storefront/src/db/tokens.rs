//! API token repository.
//!
//! Only the SHA-256 digest of a token is ever stored; the raw value exists
//! solely in the client's hands.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fashion_store_core::{UserId, UserProfile};

use super::RepositoryError;
use super::users::UserRow;

/// Repository for bearer token storage.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a newly issued token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        digest: &[u8],
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO api_tokens (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(digest)
            .bind(user_id)
            .bind(expires_at)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// The owner of an unexpired token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_user(&self, digest: &[u8]) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT u.id, u.name, u.email, u.phone, u.role
            FROM api_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND t.expires_at > now()
            ",
        )
        .bind(digest)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserProfile::try_from).transpose()
    }

    /// Revoke a token. Revoking an unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, digest: &[u8]) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE token_hash = $1")
            .bind(digest)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop expired tokens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE expires_at <= now()")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
