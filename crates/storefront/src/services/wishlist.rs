//! Account wishlists.

use chrono::Utc;
use fashion_store_core::{LineId, ProductId, ProductRef, UserId, Wishlist};
use sqlx::PgPool;
use tracing::{debug, instrument};

use super::catalog::{hydrate_wishlist, require_active};
use super::{CartServiceError, load_document, update_document};
use crate::db::products::ProductRepository;

pub struct WishlistService<'a> {
    pool: &'a PgPool,
    products: ProductRepository<'a>,
    user: UserId,
}

impl<'a> WishlistService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, user: UserId) -> Self {
        Self {
            pool,
            products: ProductRepository::new(pool),
            user,
        }
    }

    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` on database failure.
    pub async fn get(&self) -> Result<Wishlist, CartServiceError> {
        let mut wishlist: Wishlist = load_document(self.pool, self.user).await?;
        hydrate_wishlist(&self.products, &mut wishlist).await?;
        Ok(wishlist)
    }

    /// # Errors
    ///
    /// `AlreadyInWishlist` if the product is a member, `ProductNotFound` if
    /// it is unknown or inactive.
    #[instrument(skip(self), fields(user_id = %self.user))]
    pub async fn add(&self, product_id: ProductId) -> Result<Wishlist, CartServiceError> {
        require_active(&self.products, product_id).await?;

        let (mut wishlist, ()) = update_document(self.pool, self.user, |wishlist: &mut Wishlist| {
            Ok(wishlist.add(ProductRef::from(product_id), LineId::generate(), Utc::now())?)
        })
        .await?;

        hydrate_wishlist(&self.products, &mut wishlist).await?;
        Ok(wishlist)
    }

    /// Removing a product that is not a member succeeds without writing.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` on database failure.
    #[instrument(skip(self), fields(user_id = %self.user))]
    pub async fn remove(&self, product_id: ProductId) -> Result<Wishlist, CartServiceError> {
        let mut current: Wishlist = load_document(self.pool, self.user).await?;
        if !current.contains(product_id) {
            debug!(%product_id, "Not in wishlist");
            hydrate_wishlist(&self.products, &mut current).await?;
            return Ok(current);
        }

        let (mut wishlist, _) = update_document(self.pool, self.user, |wishlist: &mut Wishlist| {
            Ok(wishlist.remove(product_id))
        })
        .await?;

        hydrate_wishlist(&self.products, &mut wishlist).await?;
        Ok(wishlist)
    }
}
