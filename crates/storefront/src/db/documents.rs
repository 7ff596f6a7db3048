//! Per-user cart and wishlist documents.
//!
//! Each user has at most one document of each kind. Every write is a
//! compare-and-swap on the `version` column, so two requests that read the
//! same version cannot both succeed.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::{PgConnection, PgExecutor, PgPool};
use tracing::instrument;

use fashion_store_core::UserId;

use super::RepositoryError;

/// Which list a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Cart,
    Wishlist,
}

impl DocumentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
        }
    }
}

/// A document as read, with the version a later write must match.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

/// Repository for list documents.
pub struct DocumentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DocumentRepository<'a> {
    /// Create a new document repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Read a document, creating an empty one at version 0 if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored JSON does not
    /// decode, `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn load<T>(&self, user: UserId, kind: DocumentKind) -> Result<Versioned<T>, RepositoryError>
    where
        T: DeserializeOwned,
    {
        ensure(self.pool, user, kind).await?;
        select(self.pool, user, kind, false).await
    }

    /// Replace a document if it is still at `expected` version.
    ///
    /// Returns the new version, or `None` if someone else wrote first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self, value))]
    pub async fn store<T>(
        &self,
        user: UserId,
        kind: DocumentKind,
        value: &T,
        expected: i64,
    ) -> Result<Option<i64>, RepositoryError>
    where
        T: Serialize + Sync,
    {
        compare_and_swap(self.pool, user, kind, value, expected).await
    }
}

/// Read a document inside a transaction, holding its row lock until commit.
pub(crate) async fn load_for_update<T>(
    conn: &mut PgConnection,
    user: UserId,
    kind: DocumentKind,
) -> Result<Versioned<T>, RepositoryError>
where
    T: DeserializeOwned,
{
    ensure(&mut *conn, user, kind).await?;
    select(&mut *conn, user, kind, true).await
}

/// Compare-and-swap write usable from a transaction.
pub(crate) async fn compare_and_swap<'e, T>(
    executor: impl PgExecutor<'e>,
    user: UserId,
    kind: DocumentKind,
    value: &T,
    expected: i64,
) -> Result<Option<i64>, RepositoryError>
where
    T: Serialize + Sync,
{
    let document = serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("{} document: {e}", kind.as_str())))?;

    let version: Option<i64> = sqlx::query_scalar(
        r"
        UPDATE list_documents
        SET document = $3, version = version + 1, updated_at = now()
        WHERE user_id = $1 AND kind = $2 AND version = $4
        RETURNING version
        ",
    )
    .bind(user)
    .bind(kind.as_str())
    .bind(document)
    .bind(expected)
    .fetch_optional(executor)
    .await?;

    Ok(version)
}

async fn ensure<'e>(
    executor: impl PgExecutor<'e>,
    user: UserId,
    kind: DocumentKind,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO list_documents (user_id, kind, document, version)
        VALUES ($1, $2, '{}'::jsonb, 0)
        ON CONFLICT (user_id, kind) DO NOTHING
        ",
    )
    .bind(user)
    .bind(kind.as_str())
    .execute(executor)
    .await?;
    Ok(())
}

async fn select<'e, T>(
    executor: impl PgExecutor<'e>,
    user: UserId,
    kind: DocumentKind,
    lock: bool,
) -> Result<Versioned<T>, RepositoryError>
where
    T: DeserializeOwned,
{
    let sql = if lock {
        "SELECT document, version FROM list_documents WHERE user_id = $1 AND kind = $2 FOR UPDATE"
    } else {
        "SELECT document, version FROM list_documents WHERE user_id = $1 AND kind = $2"
    };

    let (document, version): (serde_json::Value, i64) = sqlx::query_as(sql)
        .bind(user)
        .bind(kind.as_str())
        .fetch_optional(executor)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    let value = serde_json::from_value(document).map_err(|e| {
        RepositoryError::DataCorruption(format!("{} document of user {user}: {e}", kind.as_str()))
    })?;
    Ok(Versioned { value, version })
}
