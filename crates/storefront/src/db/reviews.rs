//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use fashion_store_core::{
    ProductId, RatingSummary, Review, ReviewDraft, ReviewId, UserId, UserProfile,
};

use super::RepositoryError;
use super::products;

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    user_id: i32,
    name: String,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).map_err(|_| {
            RepositoryError::DataCorruption(format!("review {}: rating {}", row.id, row.rating))
        })?;
        Ok(Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            rating,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(&self, product: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT id, product_id, user_id, name, rating, comment, created_at
            FROM reviews
            WHERE product_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(product)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Add a review and refresh the product's rating aggregate in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the
    /// product, `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self, author, draft), fields(user_id = %author.id))]
    pub async fn create(
        &self,
        product: ProductId,
        author: &UserProfile,
        draft: &ReviewDraft,
    ) -> Result<(Review, RatingSummary), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Row lock keeps concurrent reviews from computing stale aggregates.
        let locked: Option<i32> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            INSERT INTO reviews (product_id, user_id, name, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, user_id, name, rating, comment, created_at
            ",
        )
        .bind(product)
        .bind(author.id)
        .bind(&author.name)
        .bind(i16::from(draft.rating))
        .bind(&draft.comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::on_unique_violation(e, "product already reviewed"))?;

        let summary = refresh_rating(&mut tx, product).await?;

        tx.commit().await?;
        Ok((Review::try_from(row)?, summary))
    }

    /// Remove one review and refresh the product's rating aggregate in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist or
    /// has no review with this id.
    #[instrument(skip(self))]
    pub async fn delete(&self, product: ProductId, review: ReviewId) -> Result<RatingSummary, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i32> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND product_id = $2")
            .bind(review)
            .bind(product)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let summary = refresh_rating(&mut tx, product).await?;

        tx.commit().await?;
        Ok(summary)
    }
}

/// Recompute a product's aggregate from its remaining reviews and store it.
/// The caller holds the product row lock.
async fn refresh_rating(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product: ProductId,
) -> Result<RatingSummary, RepositoryError> {
    let ratings: Vec<i16> = sqlx::query_scalar("SELECT rating FROM reviews WHERE product_id = $1")
        .bind(product)
        .fetch_all(&mut **tx)
        .await?;
    let summary = RatingSummary::from_ratings(ratings.into_iter().filter_map(|r| u8::try_from(r).ok()));
    products::set_rating(&mut **tx, product, summary).await?;
    Ok(summary)
}
