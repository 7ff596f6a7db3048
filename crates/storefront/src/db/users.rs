//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use fashion_store_core::{CustomerSummary, Email, ProfileUpdate, UserId, UserProfile, UserRole};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
pub(super) struct UserRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = row.role.parse::<UserRole>().map_err(|e| {
            RepositoryError::DataCorruption(format!("user {}: {e}", row.id))
        })?;
        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            role,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    #[sqlx(flatten)]
    user: UserRow,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for CustomerSummary {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let profile = UserProfile::try_from(row.user)?;
        Ok(Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, name, email, phone, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(UserProfile::try_from).transpose()
    }

    /// Get a user together with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(UserProfile, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(
            "SELECT id, name, email, phone, role, password_hash FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((UserProfile::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Create a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        name: &str,
        email: &Email,
        phone: Option<&str>,
        password_hash: &str,
    ) -> Result<UserProfile, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, role
            ",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(phone)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "email already exists"))?;

        UserProfile::try_from(row)
    }

    /// Change the name and phone of an account. A blank phone clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account is gone.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = CASE WHEN $3::text IS NULL THEN phone ELSE NULLIF($3, '') END,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, phone, role
            ",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.phone.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        UserProfile::try_from(row)
    }

    /// Customer accounts, newest first. Admins are not listed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_customers(&self) -> Result<Vec<CustomerSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, name, email, phone, role, created_at
            FROM users
            WHERE role = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(UserRole::Customer.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CustomerSummary::try_from).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_customers(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(UserRole::Customer.as_str())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Grant or revoke the admin role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this email.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn set_role(&self, email: &Email, role: UserRole) -> Result<UserProfile, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET role = $2, updated_at = now()
            WHERE email = $1
            RETURNING id, name, email, phone, role
            ",
        )
        .bind(email.as_str())
        .bind(role.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        UserProfile::try_from(row)
    }
}
