//! Contact message repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use fashion_store_core::{ContactMessage, ContactMessageId, ContactStatus, Email, NewContactMessage};

use super::RepositoryError;

/// How many messages the back office lists at once.
pub const LIST_LIMIT: i64 = 100;

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    message: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for ContactMessage {
    type Error = RepositoryError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let corrupt = |what: String| RepositoryError::DataCorruption(format!("contact message {}: {what}", row.id));
        Ok(Self {
            id: ContactMessageId::new(row.id),
            email: Email::parse(&row.email).map_err(|e| corrupt(e.to_string()))?,
            status: row.status.parse::<ContactStatus>().map_err(|e| corrupt(e.to_string()))?,
            name: row.name,
            phone: row.phone,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip_all)]
    pub async fn create(&self, message: &NewContactMessage) -> Result<ContactMessage, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            INSERT INTO contact_messages (name, email, phone, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, message, status, created_at
            ",
        )
        .bind(&message.name)
        .bind(message.email.as_str())
        .bind(message.phone.as_deref())
        .bind(&message.message)
        .fetch_one(self.pool)
        .await?;

        ContactMessage::try_from(row)
    }

    /// The newest [`LIST_LIMIT`] messages.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            r"
            SELECT id, name, email, phone, message, status, created_at
            FROM contact_messages
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ContactMessage::try_from).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown message.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: ContactMessageId,
        status: ContactStatus,
    ) -> Result<ContactMessage, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r"
            UPDATE contact_messages
            SET status = $2
            WHERE id = $1
            RETURNING id, name, email, phone, message, status, created_at
            ",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        ContactMessage::try_from(row)
    }
}
