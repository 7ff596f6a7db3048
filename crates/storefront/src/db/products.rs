//! Product repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use fashion_store_core::{Category, Color, Product, ProductId, RatingSummary, Size};

use super::RepositoryError;

/// Filters for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub featured: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    original_price: Decimal,
    category: String,
    brand: String,
    images: Vec<String>,
    colors: Json<Vec<Color>>,
    sizes: Json<Vec<Size>>,
    stock: i32,
    rating: Decimal,
    num_reviews: i32,
    featured: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category = row.category.parse::<Category>().map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;
        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            category,
            brand: row.brand,
            images: row.images,
            colors: row.colors.0,
            sizes: row.sizes.0,
            stock: row.stock,
            rating: row.rating,
            num_reviews: row.num_reviews,
            featured: row.featured,
            is_active: row.is_active,
            created_at: Some(row.created_at),
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Repository for catalog queries.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A product by id, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, original_price, category, brand,
                   images, colors, sizes, stock, rating, num_reviews, featured,
                   is_active, created_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Several products at once, in no particular order. Unknown ids are
    /// simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, original_price, category, brand,
                   images, colors, sizes, stock, rating, num_reviews, featured,
                   is_active, created_at
            FROM products
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        into_products(rows)
    }

    /// One page of active products, newest first, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ProductFilter) -> Result<(Vec<Product>, i64), RepositoryError> {
        let category = filter.category.map(|c| c.as_str());

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, original_price, category, brand,
                   images, colors, sizes, stock, rating, num_reviews, featured,
                   is_active, created_at
            FROM products
            WHERE is_active
              AND ($1::text IS NULL OR category = $1)
              AND ($2::bool IS NULL OR featured = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            ",
        )
        .bind(category)
        .bind(filter.featured)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM products
            WHERE is_active
              AND ($1::text IS NULL OR category = $1)
              AND ($2::bool IS NULL OR featured = $2)
            ",
        )
        .bind(category)
        .bind(filter.featured)
        .fetch_one(self.pool)
        .await?;

        Ok((into_products(rows)?, total))
    }

    /// Active products whose name, brand, category or description contains
    /// `needle`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn search(&self, needle: &str, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(needle));
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, original_price, category, brand,
                   images, colors, sizes, stock, rating, num_reviews, featured,
                   is_active, created_at
            FROM products
            WHERE is_active
              AND (name ILIKE $1 OR brand ILIKE $1 OR category ILIKE $1 OR description ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        into_products(rows)
    }

    /// Insert a catalog entry. The id, rating and timestamps of `product`
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn insert(&self, product: &Product) -> Result<ProductId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (name, description, price, original_price, category, brand,
                                  images, colors, sizes, stock, featured, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.category.as_str())
        .bind(&product.brand)
        .bind(&product.images)
        .bind(Json(&product.colors))
        .bind(Json(&product.sizes))
        .bind(product.stock)
        .bind(product.featured)
        .bind(product.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(ProductId::new(id))
    }

    /// Overwrite the editable columns of an existing product. The review
    /// aggregate and `is_active` are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn update(&self, product: &Product) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name = $2, description = $3, price = $4, original_price = $5, category = $6,
                brand = $7, images = $8, colors = $9, sizes = $10, stock = $11, featured = $12
            WHERE id = $1
            RETURNING id, name, description, price, original_price, category, brand,
                      images, colors, sizes, stock, rating, num_reviews, featured,
                      is_active, created_at
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.category.as_str())
        .bind(&product.brand)
        .bind(&product.images)
        .bind(Json(&product.colors))
        .bind(Json(&product.sizes))
        .bind(product.stock)
        .bind(product.featured)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Product::try_from(row)
    }

    /// Take a product off sale. Carts, wishlists and past orders keep
    /// referring to it; it just stops resolving as active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE products SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Remove the whole catalog along with its reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM products").execute(self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Write the review aggregate onto the product row.
pub(crate) async fn set_rating<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: ProductId,
    summary: RatingSummary,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE products SET rating = $2, num_reviews = $3 WHERE id = $1")
        .bind(id)
        .bind(summary.rating)
        .bind(summary.num_reviews)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("denim"), "denim");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
